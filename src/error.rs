use crate::assets::AssetError;
use crate::chk::SectionId;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("section \"{0}\" does not exist")]
    MissingSection(SectionId),

    #[error("unexpected end of data")]
    UnexpectedEof,

    #[error(transparent)]
    AssetFetch(#[from] AssetError),

    #[error("invalid tileset {id}: {reason}")]
    InvalidTileset { id: u16, reason: String },

    #[error("invalid graphic: {0}")]
    InvalidGraphic(String),

    #[error("invalid image size {width}x{height}")]
    InvalidImageSize { width: u32, height: u32 },
}

pub type Result<T> = std::result::Result<T, Error>;
