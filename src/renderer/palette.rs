//! Team color remapping.

use std::borrow::Cow;

pub type Palette = [[u8; 3]; 256];

/// Palette indices recolored per owner
pub const PLAYER_COLOR_START: usize = 8;
const PLAYER_COLOR_COUNT: usize = 8;

/// Owners with a team color; higher owners draw with the plain palette
pub const PLAYER_COLOR_OWNERS: usize = 12;

/// Brightest to darkest shade of each owner's team color
const PLAYER_COLORS: [[[u8; 3]; PLAYER_COLOR_COUNT]; PLAYER_COLOR_OWNERS] = [
    // Red
    [[244, 4, 4], [215, 4, 4], [185, 3, 3], [156, 3, 3], [129, 2, 2], [105, 2, 2], [81, 1, 1], [59, 1, 1]],
    // Blue
    [[12, 72, 204], [11, 63, 180], [9, 55, 155], [8, 46, 131], [6, 38, 108], [5, 31, 88], [4, 24, 67], [3, 17, 49]],
    // Teal
    [[44, 180, 148], [39, 158, 130], [33, 137, 112], [28, 115, 95], [23, 95, 78], [19, 77, 64], [15, 59, 49], [11, 43, 36]],
    // Purple
    [[136, 64, 156], [120, 56, 137], [103, 49, 119], [87, 41, 100], [72, 34, 83], [58, 28, 67], [45, 21, 51], [33, 15, 37]],
    // Orange
    [[248, 140, 20], [218, 123, 18], [188, 106, 15], [159, 90, 13], [131, 74, 11], [107, 60, 9], [82, 46, 7], [60, 34, 5]],
    // Brown
    [[112, 48, 20], [99, 42, 18], [85, 36, 15], [72, 31, 13], [59, 25, 11], [48, 21, 9], [37, 16, 7], [27, 12, 5]],
    // White
    [[204, 224, 208], [180, 197, 183], [155, 170, 158], [131, 143, 133], [108, 119, 110], [88, 96, 89], [67, 74, 69], [49, 54, 50]],
    // Yellow
    [[252, 252, 56], [222, 222, 49], [192, 192, 43], [161, 161, 36], [134, 134, 30], [108, 108, 24], [83, 83, 18], [60, 60, 13]],
    // Green
    [[8, 128, 8], [7, 113, 7], [6, 97, 6], [5, 82, 5], [4, 68, 4], [3, 55, 3], [3, 42, 3], [2, 31, 2]],
    // Pale yellow
    [[252, 252, 124], [222, 222, 109], [192, 192, 94], [161, 161, 79], [134, 134, 66], [108, 108, 53], [83, 83, 41], [60, 60, 30]],
    // Tan
    [[236, 196, 176], [208, 172, 155], [179, 149, 134], [151, 125, 113], [125, 104, 93], [101, 84, 76], [78, 65, 58], [57, 47, 42]],
    // Azure
    [[64, 104, 212], [56, 92, 187], [49, 79, 161], [41, 67, 136], [34, 55, 112], [28, 45, 91], [21, 34, 70], [15, 25, 51]],
];

/// `base` with the team color range replaced for `owner`
pub fn player_palette(base: &Palette, owner: u8) -> Cow<'_, Palette> {
    let Some(colors) = PLAYER_COLORS.get(owner as usize) else {
        return Cow::Borrowed(base);
    };
    let mut palette = *base;
    palette[PLAYER_COLOR_START..PLAYER_COLOR_START + PLAYER_COLOR_COUNT].copy_from_slice(colors);
    Cow::Owned(palette)
}
