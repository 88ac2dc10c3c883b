//! String table (`STR ` / `STRx`) and the per-scenario text encoding heuristic.

use std::borrow::Cow;
use std::fmt;

use encoding_rs::{EUC_KR, WINDOWS_1252};

use crate::codec::{u16_at, u32_at, BinaryReader};

/// Text encoding used to decode every string of a scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StringEncoding {
    /// Western single-byte code page 1252
    Cp1252,
    /// Korean double-byte code page 949
    Cp949,
    Utf8,
    /// Decided per string: UTF-8 if valid, else 949 if it looks Korean, else 1252
    Mixed,
}

impl StringEncoding {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cp1252 => "cp1252",
            Self::Cp949 => "cp949",
            Self::Utf8 => "utf8",
            Self::Mixed => "mixed",
        }
    }

    /// Decode one raw string
    pub fn decode(self, raw: &[u8]) -> String {
        match self {
            Self::Cp1252 => decode_1252(raw),
            Self::Cp949 => EUC_KR.decode_without_bom_handling(raw).0.into_owned(),
            Self::Utf8 => String::from_utf8_lossy(raw).into_owned(),
            Self::Mixed => match classify(raw) {
                Evidence::Ascii | Evidence::Utf8 => String::from_utf8_lossy(raw).into_owned(),
                Evidence::Korean => EUC_KR.decode_without_bom_handling(raw).0.into_owned(),
                Evidence::Western => decode_1252(raw),
            },
        }
    }
}

impl fmt::Display for StringEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn decode_1252(raw: &[u8]) -> String {
    WINDOWS_1252.decode_without_bom_handling(raw).0.into_owned()
}

/// What a single string says about the encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Evidence {
    /// Plain 7-bit text, decodes the same everywhere
    Ascii,
    /// Valid multi-byte UTF-8
    Utf8,
    /// Valid 949 containing KS X 1001 Hangul syllables, not valid UTF-8
    Korean,
    /// Neither; single-byte western text
    Western,
}

fn classify(raw: &[u8]) -> Evidence {
    if raw.is_ascii() {
        Evidence::Ascii
    } else if std::str::from_utf8(raw).is_ok() {
        Evidence::Utf8
    } else if looks_korean(raw) {
        Evidence::Korean
    } else {
        Evidence::Western
    }
}

/// Strictly valid in 949 and containing at least one Hangul syllable pair.
/// Western text rarely has two consecutive high bytes in these ranges.
fn looks_korean(raw: &[u8]) -> bool {
    if EUC_KR.decode_without_bom_handling_and_without_replacement(raw).is_none() {
        return false;
    }
    let mut hangul = false;
    let mut i = 0;
    while i < raw.len() {
        let lead = raw[i];
        if lead < 0x80 {
            i += 1;
            continue;
        }
        let trail = raw.get(i + 1).copied().unwrap_or(0);
        if (0xb0..=0xc8).contains(&lead) && (0xa1..=0xfe).contains(&trail) {
            hangul = true;
        }
        i += 2;
    }
    hangul
}

/// Pick the encoding for a scenario from all of its strings
pub fn detect_encoding<'s>(strings: impl IntoIterator<Item = &'s [u8]>) -> StringEncoding {
    let mut utf8 = false;
    let mut korean = false;
    let mut western = false;
    for raw in strings {
        match classify(raw) {
            Evidence::Ascii => (),
            Evidence::Utf8 => utf8 = true,
            Evidence::Korean => korean = true,
            Evidence::Western => western = true,
        }
    }
    match (utf8, korean, western) {
        (true, true, _) | (true, _, true) => StringEncoding::Mixed,
        (true, false, false) => StringEncoding::Utf8,
        (false, true, _) => StringEncoding::Cp949,
        (false, false, _) => StringEncoding::Cp1252,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OffsetWidth {
    /// `STR `: u16 count and offsets
    Short,
    /// `STRx`: u32 count and offsets
    Long,
}

/// Indexed string table. Indices are 1-based; 0 means "no string".
#[derive(Debug, Clone)]
pub struct StringTable<'a> {
    data: Cow<'a, [u8]>,
    count: usize,
    width: OffsetWidth,
    encoding: StringEncoding,
}

impl<'a> StringTable<'a> {
    /// Table from a `STR ` section, encoding chosen by heuristic
    pub fn new(data: Cow<'a, [u8]>) -> Self {
        Self::build(data, OffsetWidth::Short, None)
    }

    /// Table from a `STRx` section, encoding chosen by heuristic
    pub fn new_extended(data: Cow<'a, [u8]>) -> Self {
        Self::build(data, OffsetWidth::Long, None)
    }

    pub(crate) fn with_encoding(
        data: Cow<'a, [u8]>,
        extended: bool,
        encoding: Option<StringEncoding>,
    ) -> Self {
        let width = if extended { OffsetWidth::Long } else { OffsetWidth::Short };
        Self::build(data, width, encoding)
    }

    fn build(data: Cow<'a, [u8]>, width: OffsetWidth, encoding: Option<StringEncoding>) -> Self {
        let count = match width {
            OffsetWidth::Short if data.len() >= 2 => {
                (u16_at(&data, 0) as usize).min((data.len() - 2) / 2)
            }
            OffsetWidth::Long if data.len() >= 4 => {
                (u32_at(&data, 0) as usize).min((data.len() - 4) / 4)
            }
            _ => 0,
        };
        let mut table = Self { data, count, width, encoding: StringEncoding::Cp1252 };
        table.encoding = match encoding {
            Some(encoding) => encoding,
            None => detect_encoding((1..=table.count).map(|i| table.raw(i))),
        };
        table
    }

    /// Number of strings the table can address
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn encoding(&self) -> StringEncoding {
        self.encoding
    }

    /// Undecoded bytes of string `index`, empty for any invalid index
    pub fn raw(&self, index: usize) -> &[u8] {
        if index == 0 || index > self.count {
            return &[];
        }
        let offset = match self.width {
            OffsetWidth::Short => u16_at(&self.data, index * 2) as usize,
            OffsetWidth::Long => u32_at(&self.data, index * 4) as usize,
        };
        if offset >= self.data.len() {
            return &[];
        }
        BinaryReader::at(&self.data, offset).read_cstr()
    }

    /// Decoded string `index`; never fails
    pub fn get(&self, index: usize) -> String {
        self.encoding.decode(self.raw(index))
    }
}
