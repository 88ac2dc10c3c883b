//! StarCraft scenario (CHK) decoder and minimap renderer
//!
//! Parses the tagged sections of a scenario file into a [`Chk`] model
//! (strings, forces, units, sprites, triggers) and composites a scaled RGB
//! minimap from tileset and GRP graphics fetched through an [`AssetProvider`].

pub mod assets;
pub mod chk;
pub mod codec;
pub mod error;
pub mod renderer;
pub mod triggers;

#[cfg(test)]
mod fixtures;

pub use error::{Error, Result};
pub use chk::{
    Chk, ParseOptions, StringEncoding, StringTable,
    Force, Player, PlayerType, Race, Unit, Sprite,
    SectionId, SectionTable,
};
pub use assets::{
    AssetCache, AssetError, AssetProvider,
    FileAccess, FileReader, DirectoryReader, Grp, Tileset, TilesetFiles,
};
pub use triggers::{Trigger, Triggers, Condition, Action, ConditionType, ActionType};
pub use renderer::{render, RenderOptions};
