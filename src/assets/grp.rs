//! GRP: run-length encoded, palette-indexed multi-frame graphics.

use bytes::Bytes;

use crate::codec::BinaryReader;
use crate::error::{Error, Result};

const HEADER_SIZE: usize = 6;
const FRAME_HEADER_SIZE: usize = 8;

const SKIP: u8 = 0x80;
const REPEAT: u8 = 0x40;

#[derive(Debug, Clone)]
pub struct Grp {
    data: Bytes,
    frame_count: u16,
    width: u16,
    height: u16,
}

impl Grp {
    /// Validate the header and frame table. Frame pixel data is decoded lazily.
    pub fn new(data: Bytes) -> Result<Self> {
        let mut reader = BinaryReader::new(&data);
        let frame_count = reader.read_u16_le().map_err(|_| Error::InvalidGraphic("empty file".into()))?;
        if frame_count == 0 {
            return Ok(Self { data, frame_count, width: 0, height: 0 });
        }
        let table_end = HEADER_SIZE + frame_count as usize * FRAME_HEADER_SIZE;
        if data.len() < table_end {
            return Err(Error::InvalidGraphic(format!(
                "{} frames need {} header bytes, have {}",
                frame_count,
                table_end,
                data.len()
            )));
        }
        let width = reader.read_u16_le()?;
        let height = reader.read_u16_le()?;
        Ok(Self { data, frame_count, width, height })
    }

    pub fn frame_count(&self) -> u16 {
        self.frame_count
    }

    /// Size of the full frame canvas
    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn frame(&self, index: u16) -> Option<Frame<'_>> {
        if index >= self.frame_count {
            return None;
        }
        let mut reader = BinaryReader::at(&self.data, HEADER_SIZE + index as usize * FRAME_HEADER_SIZE);
        let [x_offset, y_offset, width, height] = reader.read_array::<4>().ok()?;
        let offset = reader.read_u32_le().ok()? as usize;
        Some(Frame { data: &self.data, x_offset, y_offset, width, height, offset })
    }
}

/// One frame: a `width` x `height` image placed at (`x_offset`, `y_offset`)
/// inside the graphic's canvas
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    data: &'a [u8],
    pub x_offset: u8,
    pub y_offset: u8,
    pub width: u8,
    pub height: u8,
    offset: usize,
}

impl Frame<'_> {
    /// Palette indices in row-major order; `None` is transparent
    pub fn pixels(&self) -> Result<Vec<Option<u8>>> {
        let width = self.width as usize;
        let mut out = vec![None; width * self.height as usize];
        let mut lines = BinaryReader::at(self.data, self.offset);
        for row in out.chunks_mut(width.max(1)).take(self.height as usize) {
            let line = lines.read_u16_le()? as usize;
            decode_line(&mut BinaryReader::at(self.data, self.offset + line), row)?;
        }
        Ok(out)
    }
}

fn decode_line(reader: &mut BinaryReader<'_>, row: &mut [Option<u8>]) -> Result<()> {
    let mut x = 0;
    while x < row.len() {
        let control = reader.read_u8()?;
        if control & SKIP != 0 {
            x += (control & !SKIP) as usize;
        } else if control & REPEAT != 0 {
            let color = reader.read_u8()?;
            let end = (x + (control & !REPEAT) as usize).min(row.len());
            row[x..end].fill(Some(color));
            x = end;
        } else {
            let literal = reader.read_bytes(control as usize)?;
            let end = (x + literal.len()).min(row.len());
            for (px, &color) in row[x..end].iter_mut().zip(literal) {
                *px = Some(color);
            }
            x = end;
        }
    }
    Ok(())
}
