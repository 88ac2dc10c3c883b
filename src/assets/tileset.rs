//! Terrain graphics: tile groups, megatiles, minitiles and the palette.
//!
//! ```text
//! tile id -> cv5 group (id >> 4) -> megatile id (slot id & 0xf)
//! megatile -> 4x4 minitile refs (vx4 / vx4ex) -> 8x8 palette indices (vr4)
//! ```

use std::sync::OnceLock;

use bytes::Bytes;

use crate::codec::{u16_at, u32_at, u8_at};
use crate::error::{Error, Result};

const GROUP_SIZE: usize = 52;
const GROUP_MEGATILES_OFFSET: usize = 20;
const MINITILE_BYTES: usize = 64;
const PALETTE_ENTRIES: usize = 256;

/// Megatile side in pixels
pub const MEGATILE_PIXELS: u32 = 32;

/// Scaled caches exist for 1, 2, 4, 8, 16 and 32 pixels per tile
const SCALE_LEVELS: usize = 6;

/// Width of a minitile reference in the megatile file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MegatileFormat {
    /// `.vx4`, u16 references
    #[default]
    Standard,
    /// `.vx4ex`, u32 references
    Extended,
}

impl MegatileFormat {
    fn reference_size(self) -> usize {
        match self {
            Self::Standard => 2,
            Self::Extended => 4,
        }
    }
}

/// Raw tileset files as handed out by an asset provider
#[derive(Debug, Clone)]
pub struct TilesetFiles {
    pub cv5: Bytes,
    pub vx4: Bytes,
    pub vr4: Bytes,
    pub wpe: Bytes,
    pub megatile_format: MegatileFormat,
}

/// Downscaled RGB images of every megatile at one resolution, built on demand
#[derive(Debug)]
struct ScaledMegatiles {
    tiles: Vec<OnceLock<Vec<u8>>>,
}

/// A decoded tileset.
///
/// Scaled megatile images are computed the first time they are asked for and
/// kept for the lifetime of the tileset.
#[derive(Debug)]
pub struct Tileset {
    id: u16,
    files: TilesetFiles,
    palette: Box<[[u8; 3]; PALETTE_ENTRIES]>,
    megatile_count: usize,
    scaled: [OnceLock<ScaledMegatiles>; SCALE_LEVELS],
}

impl Tileset {
    pub fn new(id: u16, files: TilesetFiles) -> Result<Self> {
        if files.wpe.len() < PALETTE_ENTRIES * 4 {
            return Err(Error::InvalidTileset {
                id,
                reason: format!("palette has {} bytes, expected {}", files.wpe.len(), PALETTE_ENTRIES * 4),
            });
        }
        let megatile_bytes = 16 * files.megatile_format.reference_size();
        let megatile_count = files.vx4.len() / megatile_bytes;
        if megatile_count == 0 {
            return Err(Error::InvalidTileset { id, reason: "no megatiles".into() });
        }

        let mut palette = Box::new([[0u8; 3]; PALETTE_ENTRIES]);
        for (entry, rgbx) in palette.iter_mut().zip(files.wpe.chunks_exact(4)) {
            entry.copy_from_slice(&rgbx[..3]);
        }

        Ok(Self {
            id,
            files,
            palette,
            megatile_count,
            scaled: Default::default(),
        })
    }

    pub fn id(&self) -> u16 {
        self.id
    }

    pub fn palette(&self) -> &[[u8; 3]; PALETTE_ENTRIES] {
        &self.palette
    }

    pub fn megatile_count(&self) -> usize {
        self.megatile_count
    }

    /// Megatile drawn for a map tile id. Unknown groups and megatiles map to 0.
    pub fn megatile_for_tile(&self, tile: u16) -> u16 {
        let group = (tile >> 4) as usize;
        let slot = (tile & 0xf) as usize;
        let megatile = u16_at(&self.files.cv5, group * GROUP_SIZE + GROUP_MEGATILES_OFFSET + slot * 2);
        if (megatile as usize) < self.megatile_count {
            megatile
        } else {
            0
        }
    }

    /// Palette index of pixel (x, y) of a full-size megatile
    pub fn pixel(&self, megatile: u16, x: u32, y: u32) -> u8 {
        let minitile = ((y / 8) * 4 + x / 8) as usize;
        let reference = match self.files.megatile_format {
            MegatileFormat::Standard => {
                u16_at(&self.files.vx4, (megatile as usize * 16 + minitile) * 2) as u32
            }
            MegatileFormat::Extended => u32_at(&self.files.vx4, (megatile as usize * 16 + minitile) * 4),
        };
        let flipped = reference & 1 != 0;
        let vr4 = (reference >> 1) as usize;
        let px = if flipped { 7 - x % 8 } else { x % 8 };
        u8_at(&self.files.vr4, vr4 * MINITILE_BYTES + (y % 8 * 8 + px) as usize)
    }

    /// RGB image of a megatile at `ppt` x `ppt` pixels. `ppt` must be a power
    /// of two no larger than 32.
    pub fn scaled(&self, megatile: u16, ppt: u32) -> &[u8] {
        let level = (ppt.clamp(1, MEGATILE_PIXELS).trailing_zeros() as usize).min(SCALE_LEVELS - 1);
        let ppt = 1 << level;
        let cache = self.scaled[level].get_or_init(|| ScaledMegatiles {
            tiles: (0..self.megatile_count).map(|_| OnceLock::new()).collect(),
        });
        let index = if (megatile as usize) < self.megatile_count { megatile as usize } else { 0 };
        cache.tiles[index].get_or_init(|| self.downsample(index as u16, ppt))
    }

    /// Each output pixel is the average of the four corner samples of the
    /// source block it covers.
    fn downsample(&self, megatile: u16, ppt: u32) -> Vec<u8> {
        let step = MEGATILE_PIXELS / ppt;
        let mut out = Vec::with_capacity((ppt * ppt * 3) as usize);
        for y in 0..ppt {
            for x in 0..ppt {
                let (x0, y0) = (x * step, y * step);
                let (x1, y1) = (x0 + step - 1, y0 + step - 1);
                let mut sum = [0u32; 3];
                for (sx, sy) in [(x0, y0), (x1, y0), (x0, y1), (x1, y1)] {
                    let color = self.palette[self.pixel(megatile, sx, sy) as usize];
                    for (acc, c) in sum.iter_mut().zip(color) {
                        *acc += c as u32;
                    }
                }
                out.extend(sum.map(|c| (c / 4) as u8));
            }
        }
        out
    }
}
