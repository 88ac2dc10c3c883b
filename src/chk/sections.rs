//! Tagged section table.
//!
//! A scenario is a flat sequence of `(tag, i32 length, payload)` records.
//! Only the tags this crate reads are kept; a tag that occurs more than once
//! is merged according to its [`MergeRule`].

use std::borrow::Cow;
use std::fmt;

use indexmap::map::Entry;
use indexmap::IndexMap;
use tracing::{debug, trace, warn};

use crate::codec::BinaryReader;
use crate::error::{Error, Result};

/// Four-byte section tag. Not necessarily printable.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SectionId(pub [u8; 4]);

impl SectionId {
    pub const MTXM: Self = Self(*b"MTXM");
    pub const STR: Self = Self(*b"STR ");
    pub const STRX: Self = Self(*b"STRx");
    pub const ERA: Self = Self(*b"ERA ");
    pub const FORC: Self = Self(*b"FORC");
    pub const OWNR: Self = Self(*b"OWNR");
    pub const SIDE: Self = Self(*b"SIDE");
    pub const SPRP: Self = Self(*b"SPRP");
    pub const DIM: Self = Self(*b"DIM ");
    pub const UNIT: Self = Self(*b"UNIT");
    pub const THG2: Self = Self(*b"THG2");
    pub const TRIG: Self = Self(*b"TRIG");
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            if b.is_ascii_graphic() || b == b' ' {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "\\x{:02x}", b)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SectionId(\"{}\")", self)
    }
}

/// How a repeated occurrence of a tag combines with what was read before
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeRule {
    /// New payload replaces the front; longer previous data keeps its tail
    PartialOverwrite,
    /// New payload replaces everything
    FullOverwrite,
    /// New payload is concatenated after the previous one
    Append,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionRule {
    pub merge: MergeRule,
    /// Occurrences shorter than this are ignored
    pub min_size: usize,
    /// Occurrences longer than this are cut off
    pub max_size: Option<usize>,
}

impl SectionRule {
    const fn new(merge: MergeRule, min_size: usize, max_size: Option<usize>) -> Self {
        Self { merge, min_size, max_size }
    }
}

/// Rule for a tag, or `None` if the tag is not read at all
pub fn section_rule(id: SectionId) -> Option<SectionRule> {
    use MergeRule::*;
    let rule = match id {
        SectionId::MTXM => SectionRule::new(PartialOverwrite, 0, None),
        SectionId::STR => SectionRule::new(PartialOverwrite, 2, None),
        SectionId::STRX => SectionRule::new(PartialOverwrite, 4, None),
        SectionId::ERA => SectionRule::new(FullOverwrite, 2, Some(2)),
        SectionId::FORC => SectionRule::new(FullOverwrite, 0, Some(20)),
        SectionId::OWNR => SectionRule::new(FullOverwrite, 12, Some(12)),
        SectionId::SIDE => SectionRule::new(FullOverwrite, 8, Some(8)),
        SectionId::SPRP => SectionRule::new(FullOverwrite, 4, Some(4)),
        SectionId::DIM => SectionRule::new(FullOverwrite, 4, Some(4)),
        SectionId::UNIT => SectionRule::new(Append, 0, None),
        SectionId::THG2 => SectionRule::new(Append, 0, None),
        SectionId::TRIG => SectionRule::new(Append, 0, None),
        _ => return None,
    };
    Some(rule)
}

/// Merged sections of one scenario buffer. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct SectionTable<'a> {
    sections: IndexMap<SectionId, Cow<'a, [u8]>>,
}

impl<'a> SectionTable<'a> {
    /// Walk the record stream. Never fails: unknown tags are skipped and a
    /// record running past the end of the buffer ends the walk.
    pub fn parse(buf: &'a [u8]) -> Self {
        let mut table = Self::default();
        let mut reader = BinaryReader::new(buf);

        while reader.remaining() >= 8 {
            let start = reader.position();
            let (id, length) = match (reader.read_array::<4>(), reader.read_i32_le()) {
                (Ok(tag), Ok(length)) => (SectionId(tag), length),
                _ => break,
            };
            let available = reader.remaining();
            // Negative lengths extend to the end of the buffer
            let declared = usize::try_from(length).unwrap_or(available);
            let truncated = declared > available;
            trace!(section = %id, offset = start, length, "section record");

            if let Some(rule) = section_rule(id) {
                let payload_len = declared.min(available);
                let accepted = rule.max_size.map_or(payload_len, |max| payload_len.min(max));
                if accepted >= rule.min_size {
                    let payload = &reader.remaining_slice()[..accepted];
                    table.merge(id, rule.merge, payload);
                } else {
                    debug!(section = %id, length, min_size = rule.min_size, "ignoring undersized section");
                }
            }

            if length < 0 {
                break;
            }
            if truncated {
                warn!(section = %id, length, available, "section runs past end of data");
                break;
            }
            reader.set_position(reader.position() + declared);
        }
        table
    }

    fn merge(&mut self, id: SectionId, rule: MergeRule, payload: &'a [u8]) {
        match self.sections.entry(id) {
            Entry::Vacant(entry) => {
                entry.insert(Cow::Borrowed(payload));
            }
            Entry::Occupied(mut entry) => {
                let previous = entry.get_mut();
                match rule {
                    MergeRule::PartialOverwrite => {
                        if previous.len() > payload.len() {
                            let mut merged = payload.to_vec();
                            merged.extend_from_slice(&previous[payload.len()..]);
                            *previous = Cow::Owned(merged);
                        } else {
                            *previous = Cow::Borrowed(payload);
                        }
                    }
                    MergeRule::FullOverwrite => *previous = Cow::Borrowed(payload),
                    MergeRule::Append => previous.to_mut().extend_from_slice(payload),
                }
            }
        }
    }

    pub fn get(&self, id: SectionId) -> Option<&[u8]> {
        self.sections.get(&id).map(|data| data.as_ref())
    }

    /// Required section lookup
    pub fn section(&self, id: SectionId) -> Result<&[u8]> {
        self.get(id).ok_or(Error::MissingSection(id))
    }

    pub fn contains(&self, id: SectionId) -> bool {
        self.sections.contains_key(&id)
    }

    /// Move a section's data out of the table, keeping the borrow when no merge copied it
    pub fn take(&mut self, id: SectionId) -> Option<Cow<'a, [u8]>> {
        self.sections.shift_remove(&id)
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Sections in order of first occurrence
    pub fn iter(&self) -> impl Iterator<Item = (SectionId, &[u8])> {
        self.sections.iter().map(|(id, data)| (*id, data.as_ref()))
    }
}
