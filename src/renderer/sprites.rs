//! Sprite and unit pass, drawn over the terrain.

use tracing::trace;

use super::palette::{player_palette, Palette};
use super::{Canvas, RenderOptions};
use crate::assets::{AssetCache, Grp};
use crate::chk::units::{
    is_critter, is_resource, MINERAL_FIELD_1, MINERAL_FIELD_2, MINERAL_FIELD_3, NEUTRAL_PLAYER,
    START_LOCATION, TILE_PIXELS, VESPENE_GEYSER,
};
use crate::chk::{Chk, Sprite, Unit};
use crate::error::Result;

/// Whether a unit is drawn at all under `options`
pub(crate) fn unit_visible(unit: &Unit, options: RenderOptions) -> bool {
    if unit.unit_id == START_LOCATION {
        return options.start_locations;
    }
    !options.melee
        || (unit.player == NEUTRAL_PLAYER
            && (is_resource(unit.unit_id) || is_critter(unit.unit_id) || unit.is_sprite))
}

/// Frame used to draw a unit; mineral fields shrink as they are mined out
/// and geysers have one frame per tileset
pub(crate) fn unit_frame(unit: &Unit, tileset: u8) -> u16 {
    match unit.unit_id {
        MINERAL_FIELD_1 | MINERAL_FIELD_2 | MINERAL_FIELD_3 => match unit.resource_amount.unwrap_or(0) {
            750.. => 0,
            500.. => 1,
            250.. => 2,
            _ => 3,
        },
        VESPENE_GEYSER => tileset as u16,
        _ => 0,
    }
}

/// Map pixel to output pixel scale
#[derive(Debug, Clone, Copy)]
struct Scale {
    x: f64,
    y: f64,
}

pub(crate) async fn draw(
    canvas: &mut Canvas,
    chk: &Chk<'_>,
    assets: &AssetCache,
    palette: &Palette,
    options: RenderOptions,
) -> Result<()> {
    let (map_width, map_height) = chk.size();
    let scale = Scale {
        x: canvas.width as f64 / (map_width as u32 * TILE_PIXELS) as f64,
        y: canvas.height as f64 / (map_height as u32 * TILE_PIXELS) as f64,
    };

    let sprites: &[Sprite] = chk.sprites();
    for sprite in sprites {
        let grp = assets.sprite(sprite.sprite_id).await?;
        draw_graphic(canvas, &grp, 0, sprite.x, sprite.y, palette, scale)?;
    }

    // Doodad units first, then regular placed units
    let (doodads, placed): (Vec<&Unit>, Vec<&Unit>) = chk.units().iter().partition(|u| u.is_sprite);
    let mut drawn = 0;
    for unit in doodads.into_iter().chain(placed) {
        if !unit_visible(unit, options) {
            continue;
        }
        let grp = assets.unit(unit.unit_id).await?;
        let colors = player_palette(palette, unit.player);
        let frame = unit_frame(unit, chk.tileset());
        draw_graphic(canvas, &grp, frame, unit.x, unit.y, &colors, scale)?;
        drawn += 1;
    }
    trace!(sprites = sprites.len(), units = drawn, "sprites drawn");
    Ok(())
}

/// Draw `frame` of `grp` centered on map pixel (x, y), nearest-neighbor scaled
fn draw_graphic(
    canvas: &mut Canvas,
    grp: &Grp,
    frame: u16,
    x: u16,
    y: u16,
    palette: &Palette,
    scale: Scale,
) -> Result<()> {
    let Some(frame) = grp.frame(frame).or_else(|| grp.frame(0)) else {
        return Ok(());
    };
    if frame.width == 0 || frame.height == 0 {
        return Ok(());
    }
    let pixels = frame.pixels()?;

    // Frame rectangle in map pixels
    let left = x as f64 - (grp.width() / 2) as f64 + frame.x_offset as f64;
    let top = y as f64 - (grp.height() / 2) as f64 + frame.y_offset as f64;
    let (fw, fh) = (frame.width as usize, frame.height as usize);

    let dx0 = (left * scale.x).floor().max(0.0) as i64;
    let dy0 = (top * scale.y).floor().max(0.0) as i64;
    let dx1 = (((left + fw as f64) * scale.x).ceil() as i64).min(canvas.width as i64);
    let dy1 = (((top + fh as f64) * scale.y).ceil() as i64).min(canvas.height as i64);

    for dy in dy0..dy1 {
        let sy = ((dy as f64 + 0.5) / scale.y - top).floor();
        if sy < 0.0 || sy >= fh as f64 {
            continue;
        }
        for dx in dx0..dx1 {
            let sx = ((dx as f64 + 0.5) / scale.x - left).floor();
            if sx < 0.0 || sx >= fw as f64 {
                continue;
            }
            if let Some(index) = pixels[sy as usize * fw + sx as usize] {
                canvas.put(dx as u32, dy as u32, palette[index as usize]);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(unit_id: u16, player: u8, is_sprite: bool) -> Unit {
        Unit { x: 0, y: 0, unit_id, player, resource_amount: None, is_sprite, disabled: false }
    }

    #[test]
    fn test_melee_filter() {
        let melee = RenderOptions::new().melee(true);
        assert!(unit_visible(&unit(START_LOCATION, 3, false), melee));
        assert!(unit_visible(&unit(MINERAL_FIELD_2, NEUTRAL_PLAYER, false), melee));
        assert!(unit_visible(&unit(90, NEUTRAL_PLAYER, false), melee));
        assert!(unit_visible(&unit(5, NEUTRAL_PLAYER, true), melee));
        assert!(!unit_visible(&unit(5, NEUTRAL_PLAYER, false), melee));
        assert!(!unit_visible(&unit(MINERAL_FIELD_2, 0, false), melee));
        assert!(!unit_visible(&unit(0, 0, false), melee));

        let ums = RenderOptions::new();
        assert!(unit_visible(&unit(0, 0, false), ums));
    }

    #[test]
    fn test_start_location_filter() {
        let hidden = RenderOptions::new().start_locations(false);
        assert!(!unit_visible(&unit(START_LOCATION, 0, false), hidden));
        assert!(!unit_visible(&unit(START_LOCATION, 0, false), hidden.melee(true)));
        assert!(unit_visible(&unit(0, 0, false), hidden));
    }

    #[test]
    fn test_resource_frames() {
        let mut mineral = unit(MINERAL_FIELD_1, NEUTRAL_PLAYER, false);
        for (amount, frame) in [(1500, 0), (750, 0), (749, 1), (500, 1), (250, 2), (249, 3), (0, 3)] {
            mineral.resource_amount = Some(amount);
            assert_eq!(unit_frame(&mineral, 0), frame, "amount {}", amount);
        }
        let geyser = unit(VESPENE_GEYSER, NEUTRAL_PLAYER, false);
        assert_eq!(unit_frame(&geyser, 5), 5);
        assert_eq!(unit_frame(&unit(0, 0, false), 5), 0);
    }
}
