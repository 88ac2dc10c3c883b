//! [`AssetProvider`] on top of path-based file reads.

use std::path::PathBuf;

use ahash::AHashMap;
use async_trait::async_trait;
use bytes::Bytes;
use tracing::{debug, trace};

use super::tileset::{MegatileFormat, TilesetFiles};
use super::{AssetProvider, BoxError};
use crate::chk::TILESET_NAMES;

/// Zero-frame GRP; ids without a registered graphic draw nothing
const EMPTY_GRP: &[u8] = &[0, 0];

/// Reads one game file by its archive-style path (`tileset\jungle.cv5`)
#[async_trait]
pub trait FileReader: Send + Sync {
    async fn read(&self, path: &str) -> Result<Bytes, BoxError>;
}

/// Reads files from an extracted game data directory
#[derive(Debug, Clone)]
pub struct DirectoryReader {
    root: PathBuf,
}

impl DirectoryReader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl FileReader for DirectoryReader {
    async fn read(&self, path: &str) -> Result<Bytes, BoxError> {
        let full = path.split('\\').fold(self.root.clone(), |acc, part| acc.join(part));
        trace!(path = %full.display(), "reading file");
        Ok(Bytes::from(tokio::fs::read(&full).await?))
    }
}

/// Resolves tilesets by name and unit/sprite graphics through registered paths
pub struct FileAccess<R> {
    reader: R,
    unit_graphics: AHashMap<u16, String>,
    sprite_graphics: AHashMap<u16, String>,
}

impl<R: FileReader> FileAccess<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, unit_graphics: AHashMap::new(), sprite_graphics: AHashMap::new() }
    }

    /// Draw unit type `id` with the GRP at `path`
    pub fn add_unit_graphic(&mut self, id: u16, path: impl Into<String>) -> &mut Self {
        self.unit_graphics.insert(id, path.into());
        self
    }

    /// Draw sprite type `id` with the GRP at `path`
    pub fn add_sprite_graphic(&mut self, id: u16, path: impl Into<String>) -> &mut Self {
        self.sprite_graphics.insert(id, path.into());
        self
    }

    async fn graphic(&self, paths: &AHashMap<u16, String>, id: u16) -> Result<Bytes, BoxError> {
        match paths.get(&id) {
            Some(path) => self.reader.read(path).await,
            None => {
                debug!(id, "no graphic registered");
                Ok(Bytes::from_static(EMPTY_GRP))
            }
        }
    }
}

#[async_trait]
impl<R: FileReader> AssetProvider for FileAccess<R> {
    async fn tileset(&self, id: u16) -> Result<TilesetFiles, BoxError> {
        let name = TILESET_NAMES
            .get(id as usize)
            .ok_or_else(|| format!("unknown tileset id {}", id))?;
        let path = format!("tileset\\{}", name);

        let (vx4, megatile_format) = match self.reader.read(&format!("{}.vx4ex", path)).await {
            Ok(data) => (data, MegatileFormat::Extended),
            Err(e) => {
                debug!(tileset = *name, error = %e, "no extended megatiles, using vx4");
                (self.reader.read(&format!("{}.vx4", path)).await?, MegatileFormat::Standard)
            }
        };
        Ok(TilesetFiles {
            cv5: self.reader.read(&format!("{}.cv5", path)).await?,
            vx4,
            vr4: self.reader.read(&format!("{}.vr4", path)).await?,
            wpe: self.reader.read(&format!("{}.wpe", path)).await?,
            megatile_format,
        })
    }

    async fn unit(&self, id: u16) -> Result<Bytes, BoxError> {
        self.graphic(&self.unit_graphics, id).await
    }

    async fn sprite(&self, id: u16) -> Result<Bytes, BoxError> {
        self.graphic(&self.sprite_graphics, id).await
    }
}
