//! Placed units (`UNIT`) and doodad sprites (`THG2`).

use tracing::debug;

use crate::codec::{u16_at, u32_at, u8_at};

pub const UNIT_TYPE_COUNT: u16 = 228;
pub const SPRITE_TYPE_COUNT: u16 = 517;

pub const MINERAL_FIELD_1: u16 = 176;
pub const MINERAL_FIELD_2: u16 = 177;
pub const MINERAL_FIELD_3: u16 = 178;
pub const VESPENE_GEYSER: u16 = 188;
pub const START_LOCATION: u16 = 214;

pub const NEUTRAL_PLAYER: u8 = 11;

const UNIT_RECORD_SIZE: usize = 36;
const THG2_RECORD_SIZE: usize = 10;

const THG2_PURE_SPRITE: u16 = 0x1000;
const THG2_DISABLED: u16 = 0x8000;

/// Pixels per tile side
pub const TILE_PIXELS: u32 = 32;

pub fn is_resource(unit_id: u16) -> bool {
    matches!(unit_id, MINERAL_FIELD_1 | MINERAL_FIELD_2 | MINERAL_FIELD_3 | VESPENE_GEYSER)
}

pub fn is_critter(unit_id: u16) -> bool {
    // Rhynadon, Bengalaas, Scantid, Kakaru, Ragnasaur, Ursadon
    matches!(unit_id, 89 | 90 | 93 | 94 | 95 | 96)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unit {
    /// Center, in map pixels
    pub x: u16,
    pub y: u16,
    pub unit_id: u16,
    pub player: u8,
    /// Only set for resource units
    pub resource_amount: Option<u32>,
    /// Placed through `THG2` as a unit drawn like a doodad
    pub is_sprite: bool,
    pub disabled: bool,
}

/// Pure decoration, owned by nobody
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sprite {
    pub x: u16,
    pub y: u16,
    pub sprite_id: u16,
    pub disabled: bool,
}

/// Pixel bounds of the map, used to drop entities placed outside of it
#[derive(Debug, Clone, Copy)]
pub(crate) struct MapBounds {
    pub width: u32,
    pub height: u32,
}

impl MapBounds {
    pub fn from_tiles(width: u16, height: u16) -> Self {
        Self { width: width as u32 * TILE_PIXELS, height: height as u32 * TILE_PIXELS }
    }

    fn contains(&self, x: u16, y: u16) -> bool {
        (x as u32) < self.width && (y as u32) < self.height
    }
}

/// Parse `UNIT` in 36-byte strides; a partial trailing record is ignored
pub(crate) fn parse_units(data: &[u8], bounds: MapBounds, out: &mut Vec<Unit>) {
    for record in data.chunks_exact(UNIT_RECORD_SIZE) {
        let unit_id = u16_at(record, 8);
        let x = u16_at(record, 4);
        let y = u16_at(record, 6);
        if unit_id >= UNIT_TYPE_COUNT || !bounds.contains(x, y) {
            debug!(unit_id, x, y, "dropping invalid unit");
            continue;
        }
        out.push(Unit {
            x,
            y,
            unit_id,
            player: u8_at(record, 16),
            resource_amount: is_resource(unit_id).then(|| u32_at(record, 20)),
            is_sprite: false,
            disabled: false,
        });
    }
}

/// Parse `THG2` in 10-byte strides, splitting doodad units from pure sprites
pub(crate) fn parse_thg2(
    data: &[u8],
    bounds: MapBounds,
    units: &mut Vec<Unit>,
    sprites: &mut Vec<Sprite>,
) {
    for record in data.chunks_exact(THG2_RECORD_SIZE) {
        let id = u16_at(record, 0);
        let x = u16_at(record, 2);
        let y = u16_at(record, 4);
        let flags = u16_at(record, 8);
        let disabled = flags & THG2_DISABLED != 0;
        if !bounds.contains(x, y) {
            debug!(id, x, y, "dropping out-of-bounds sprite");
            continue;
        }
        if flags & THG2_PURE_SPRITE != 0 {
            if id >= SPRITE_TYPE_COUNT {
                debug!(sprite_id = id, "dropping invalid sprite");
                continue;
            }
            sprites.push(Sprite { x, y, sprite_id: id, disabled });
        } else {
            if id >= UNIT_TYPE_COUNT {
                debug!(unit_id = id, "dropping invalid sprite unit");
                continue;
            }
            units.push(Unit {
                x,
                y,
                unit_id: id,
                player: u8_at(record, 6),
                resource_amount: None,
                is_sprite: true,
                disabled,
            });
        }
    }
}
