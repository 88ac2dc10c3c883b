//! Minimap rendering: terrain first, then sprites, then units.

pub mod palette;
pub mod sprites;
pub mod terrain;

use tracing::debug;

use crate::assets::AssetCache;
use crate::chk::Chk;
use crate::error::{Error, Result};

pub use terrain::pixels_per_tile;

/// What to draw on top of the terrain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Only draw what exists in a melee game: start locations and neutral
    /// resources, critters and doodads
    pub melee: bool,
    pub start_locations: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { melee: false, start_locations: true }
    }
}

impl RenderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn melee(mut self, melee: bool) -> Self {
        self.melee = melee;
        self
    }

    pub fn start_locations(mut self, start_locations: bool) -> Self {
        self.start_locations = start_locations;
        self
    }
}

/// RGB output buffer
#[derive(Debug)]
pub(crate) struct Canvas {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height, pixels: vec![0; width as usize * height as usize * 3] }
    }

    #[inline]
    pub fn put(&mut self, x: u32, y: u32, rgb: [u8; 3]) {
        let offset = (y as usize * self.width as usize + x as usize) * 3;
        self.pixels[offset..offset + 3].copy_from_slice(&rgb);
    }
}

/// Largest accepted output side
const MAX_IMAGE_SIDE: u32 = 16384;

/// Render `chk` as a `width` x `height` RGB image, 3 bytes per pixel, rows
/// top to bottom. Any asset failure fails the whole render.
pub async fn render(
    chk: &Chk<'_>,
    assets: &AssetCache,
    width: u32,
    height: u32,
    options: RenderOptions,
) -> Result<Vec<u8>> {
    let (map_width, map_height) = chk.size();
    if width == 0
        || height == 0
        || width > MAX_IMAGE_SIDE
        || height > MAX_IMAGE_SIDE
        || map_width == 0
        || map_height == 0
    {
        return Err(Error::InvalidImageSize { width, height });
    }

    let tileset = assets.tileset(chk.tileset() as u16).await?;
    let ppt = pixels_per_tile(width, height, map_width, map_height);
    debug!(
        width,
        height,
        ppt,
        tileset = chk.tileset_name(),
        units = chk.units().len(),
        sprites = chk.sprites().len(),
        "rendering minimap"
    );

    let mut canvas = Canvas::new(width, height);
    terrain::draw(&mut canvas, &tileset, chk.tiles(), map_width, map_height, ppt);
    sprites::draw(&mut canvas, chk, assets, tileset.palette(), options).await?;
    Ok(canvas.pixels)
}
