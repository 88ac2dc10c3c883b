pub mod reader;
#[cfg(test)]
pub mod writer;

pub use reader::{u16_at, u32_at, u8_at, BinaryReader};
#[cfg(test)]
pub use writer::BinaryWriter;
