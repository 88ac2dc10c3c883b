//! Terrain pass: map tiles drawn from downscaled megatile images.

use tracing::trace;

use super::Canvas;
use crate::assets::tileset::{Tileset, MEGATILE_PIXELS};
use crate::codec::u16_at;

/// Smallest power of two pixels-per-tile at which the whole map covers the
/// output, capped at full resolution
pub fn pixels_per_tile(width: u32, height: u32, map_width: u16, map_height: u16) -> u32 {
    let mut ppt = 1;
    while ppt < MEGATILE_PIXELS
        && (ppt * (map_width as u32) < width || ppt * (map_height as u32) < height)
    {
        ppt *= 2;
    }
    ppt
}

/// Fill `canvas` with terrain. `tiles` is the raw `MTXM` data; tiles beyond
/// it draw as tile 0.
pub(crate) fn draw(
    canvas: &mut Canvas,
    tileset: &Tileset,
    tiles: &[u8],
    map_width: u16,
    map_height: u16,
    ppt: u32,
) {
    let map_width = map_width as u64;
    let map_height = map_height as u64;
    let scaled_width = map_width * ppt as u64;
    let scaled_height = map_height * ppt as u64;
    let ppt = ppt as u64;

    for y in 0..canvas.height {
        let sy = y as u64 * scaled_height / canvas.height as u64;
        let (tile_y, py) = (sy / ppt, sy % ppt);
        for x in 0..canvas.width {
            let sx = x as u64 * scaled_width / canvas.width as u64;
            let (tile_x, px) = (sx / ppt, sx % ppt);
            let index = (tile_y * map_width + tile_x) as usize;
            let tile = u16_at(tiles, index * 2);
            let megatile = tileset.megatile_for_tile(tile);
            let image = tileset.scaled(megatile, ppt as u32);
            let offset = ((py * ppt + px) * 3) as usize;
            canvas.put(x, y, [image[offset], image[offset + 1], image[offset + 2]]);
        }
    }
    trace!(ppt, "terrain drawn");
}
