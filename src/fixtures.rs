//! Synthetic scenarios, tilesets, graphics and providers for unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use ahash::AHashMap;
use async_trait::async_trait;
use bytes::Bytes;

use crate::assets::{AssetProvider, BoxError, FileReader, MegatileFormat, TilesetFiles};
use crate::codec::BinaryWriter;
use crate::triggers::TRIGGER_SIZE;

/// `STR ` payload holding `strings` at indices 1..
pub fn string_section(strings: &[&[u8]]) -> Vec<u8> {
    let mut writer = BinaryWriter::new();
    writer.write_u16_le(strings.len() as u16);
    let mut offset = 2 + strings.len() * 2;
    for s in strings {
        writer.write_u16_le(offset as u16);
        offset += s.len() + 1;
    }
    for s in strings {
        writer.write_bytes(s);
        writer.write_u8(0);
    }
    writer.into_vec()
}

/// 36-byte `UNIT` record; resource units hold 1500
pub fn unit_record(x: u16, y: u16, unit_id: u16, player: u8) -> Vec<u8> {
    let mut writer = BinaryWriter::with_capacity(36);
    writer.write_u32_le(0);
    writer.write_u16_le(x);
    writer.write_u16_le(y);
    writer.write_u16_le(unit_id);
    writer.write_zeros(6);
    writer.write_u8(player);
    writer.write_zeros(3);
    writer.write_u32_le(1500);
    writer.write_zeros(12);
    writer.into_vec()
}

/// 10-byte `THG2` record
pub fn sprite_record(id: u16, x: u16, y: u16, player: u8, flags: u16) -> Vec<u8> {
    let mut writer = BinaryWriter::with_capacity(10);
    writer.write_u16_le(id);
    writer.write_u16_le(x);
    writer.write_u16_le(y);
    writer.write_u8(player);
    writer.write_u8(0);
    writer.write_u16_le(flags);
    writer.into_vec()
}

/// A minimal valid scenario: 8 human players in four forces on a 64x64 map
#[derive(Debug, Clone)]
pub struct ScenarioBuilder {
    strings: Vec<Vec<u8>>,
    era: u16,
    size: (u16, u16),
    force_assignments: [u8; 8],
    ownr: [u8; 12],
    units: Vec<u8>,
    thg2: Vec<u8>,
    without: Vec<[u8; 4]>,
    extra: Vec<([u8; 4], Vec<u8>)>,
}

impl ScenarioBuilder {
    pub fn new() -> Self {
        Self {
            strings: vec![b"Untitled Scenario.".to_vec(), b"Destroy all enemy buildings.".to_vec()],
            era: 0,
            size: (64, 64),
            force_assignments: [0, 0, 1, 1, 2, 2, 3, 3],
            ownr: [6, 6, 6, 6, 6, 6, 6, 6, 0, 0, 0, 0],
            units: Vec::new(),
            thg2: Vec::new(),
            without: Vec::new(),
            extra: Vec::new(),
        }
    }

    pub fn era(mut self, era: u16) -> Self {
        self.era = era;
        self
    }

    pub fn size(mut self, width: u16, height: u16) -> Self {
        self.size = (width, height);
        self
    }

    pub fn ownr(mut self, ownr: [u8; 12]) -> Self {
        self.ownr = ownr;
        self
    }

    pub fn force_assignments(mut self, assignments: [u8; 8]) -> Self {
        self.force_assignments = assignments;
        self
    }

    /// Replace the string table; index 1 is the title, 2 the description
    pub fn strings(mut self, strings: Vec<Vec<u8>>) -> Self {
        self.strings = strings;
        self
    }

    pub fn units(mut self, units: Vec<u8>) -> Self {
        self.units = units;
        self
    }

    pub fn thg2(mut self, thg2: Vec<u8>) -> Self {
        self.thg2 = thg2;
        self
    }

    /// Leave out a section
    pub fn without(mut self, tag: &[u8; 4]) -> Self {
        self.without.push(*tag);
        self
    }

    /// Append an extra record after the standard ones
    pub fn section(mut self, tag: &[u8; 4], payload: Vec<u8>) -> Self {
        self.extra.push((*tag, payload));
        self
    }

    pub fn string_data(&self) -> Vec<u8> {
        let strings: Vec<&[u8]> = self.strings.iter().map(|s| s.as_slice()).collect();
        string_section(&strings)
    }

    pub fn build(&self) -> Vec<u8> {
        let (width, height) = self.size;
        let mut forc = self.force_assignments.to_vec();
        forc.extend_from_slice(&[0; 8]);
        forc.extend_from_slice(&[15, 0, 0, 0]);

        let sections: Vec<([u8; 4], Vec<u8>)> = vec![
            (*b"STR ", self.string_data()),
            (*b"SPRP", vec![1, 0, 2, 0]),
            (*b"ERA ", self.era.to_le_bytes().to_vec()),
            (*b"DIM ", [width.to_le_bytes(), height.to_le_bytes()].concat()),
            (*b"FORC", forc),
            (*b"OWNR", self.ownr.to_vec()),
            (*b"SIDE", vec![5; 8]),
            (*b"MTXM", vec![0; width as usize * height as usize * 2]),
            (*b"UNIT", self.units.clone()),
            (*b"THG2", self.thg2.clone()),
        ];

        let mut writer = BinaryWriter::new();
        for (tag, payload) in sections.iter().chain(&self.extra) {
            if !self.without.contains(tag) {
                writer.write_section(tag, payload);
            }
        }
        writer.into_vec()
    }
}

/// One 2400-byte trigger record
#[derive(Debug, Clone)]
pub struct TriggerBuilder {
    data: Vec<u8>,
    conditions: usize,
    actions: usize,
}

impl TriggerBuilder {
    pub fn new() -> Self {
        Self { data: vec![0; TRIGGER_SIZE], conditions: 0, actions: 0 }
    }

    /// Fill the next condition slot; `fill` runs after the id is set
    pub fn condition(mut self, id: u8, fill: impl FnOnce(&mut [u8])) -> Self {
        let start = self.conditions * 20;
        let record = &mut self.data[start..start + 20];
        record[15] = id;
        fill(record);
        self.conditions += 1;
        self
    }

    pub fn action(mut self, id: u8, fill: impl FnOnce(&mut [u8])) -> Self {
        let start = 320 + self.actions * 32;
        let record = &mut self.data[start..start + 32];
        record[26] = id;
        fill(record);
        self.actions += 1;
        self
    }

    /// Run the trigger for player or group `id`
    pub fn player(mut self, id: usize) -> Self {
        self.data[2372 + id] = 1;
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.data
    }
}

/// Tileset whose every tile draws as palette index 1 = `rgb`. The other
/// palette entries are `[i, 0, 0]`.
pub fn uniform_tileset(rgb: [u8; 3]) -> TilesetFiles {
    TilesetBuilder::new().color(1, rgb).minitile(1).megatile([0; 16]).group(&[0; 16]).build()
}

#[derive(Debug, Clone)]
pub struct TilesetBuilder {
    palette: [[u8; 3]; 256],
    vr4: Vec<u8>,
    vx4: Vec<u8>,
    cv5: Vec<u8>,
}

impl TilesetBuilder {
    pub fn new() -> Self {
        let mut palette = [[0u8; 3]; 256];
        for (i, entry) in palette.iter_mut().enumerate() {
            entry[0] = i as u8;
        }
        Self { palette, vr4: Vec::new(), vx4: Vec::new(), cv5: Vec::new() }
    }

    pub fn color(mut self, index: u8, rgb: [u8; 3]) -> Self {
        self.palette[index as usize] = rgb;
        self
    }

    /// Append a minitile filled with one palette index
    pub fn minitile(self, index: u8) -> Self {
        self.minitile_pixels([index; 64])
    }

    pub fn minitile_pixels(mut self, pixels: [u8; 64]) -> Self {
        self.vr4.extend_from_slice(&pixels);
        self
    }

    /// Append a megatile of 16 minitile references (`vr4 id << 1 | flip`)
    pub fn megatile(mut self, refs: [u16; 16]) -> Self {
        for r in refs {
            self.vx4.extend_from_slice(&r.to_le_bytes());
        }
        self
    }

    /// Append a tile group with the given megatile ids
    pub fn group(mut self, megatiles: &[u16]) -> Self {
        let mut group = vec![0u8; 52];
        for (i, m) in megatiles.iter().take(16).enumerate() {
            group[20 + i * 2..22 + i * 2].copy_from_slice(&m.to_le_bytes());
        }
        self.cv5.extend(group);
        self
    }

    pub fn build(self) -> TilesetFiles {
        let wpe: Vec<u8> = self.palette.iter().flat_map(|&[r, g, b]| [r, g, b, 0]).collect();
        TilesetFiles {
            cv5: Bytes::from(self.cv5),
            vx4: Bytes::from(self.vx4),
            vr4: Bytes::from(self.vr4),
            wpe: Bytes::from(wpe),
            megatile_format: MegatileFormat::Standard,
        }
    }
}

/// Single-frame GRP of `width` pixels per row with the given encoded rows
pub fn grp_bytes(width: u8, rows: &[&[u8]]) -> Bytes {
    let height = rows.len();
    let frame_offset = 6 + 8;
    let mut writer = BinaryWriter::new();
    writer.write_u16_le(1);
    writer.write_u16_le(width as u16);
    writer.write_u16_le(height as u16);
    writer.write_u8(0);
    writer.write_u8(0);
    writer.write_u8(width);
    writer.write_u8(height as u8);
    writer.write_u32_le(frame_offset as u32);

    let mut line = height * 2;
    for row in rows {
        writer.write_u16_le(line as u16);
        line += row.len();
    }
    for row in rows {
        writer.write_bytes(row);
    }
    Bytes::from(writer.into_vec())
}

/// Single-frame GRP filled with one palette index
pub fn solid_grp(width: u8, height: u8, color: u8) -> Bytes {
    let mut row = Vec::new();
    let mut left = width;
    while left > 0 {
        let run = left.min(0x3f);
        row.extend_from_slice(&[0x40 | run, color]);
        left -= run;
    }
    let rows: Vec<&[u8]> = (0..height).map(|_| row.as_slice()).collect();
    grp_bytes(width, &rows)
}

/// In-memory [`AssetProvider`] counting every call
#[derive(Debug, Default)]
pub struct MemoryProvider {
    tilesets: AHashMap<u16, TilesetFiles>,
    units: AHashMap<u16, Bytes>,
    sprites: AHashMap<u16, Bytes>,
    calls: Arc<AtomicUsize>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tileset(mut self, id: u16, files: TilesetFiles) -> Self {
        self.tilesets.insert(id, files);
        self
    }

    pub fn with_unit(mut self, id: u16, grp: Bytes) -> Self {
        self.units.insert(id, grp);
        self
    }

    pub fn with_sprite(mut self, id: u16, grp: Bytes) -> Self {
        self.sprites.insert(id, grp);
        self
    }

    pub fn calls(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }

    async fn lookup<T: Clone>(&self, map: &AHashMap<u16, T>, id: u16) -> Result<T, BoxError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        // Let concurrent requests pile up on the in-flight fetch
        tokio::task::yield_now().await;
        map.get(&id).cloned().ok_or_else(|| format!("no asset {}", id).into())
    }
}

#[async_trait]
impl AssetProvider for MemoryProvider {
    async fn tileset(&self, id: u16) -> Result<TilesetFiles, BoxError> {
        self.lookup(&self.tilesets, id).await
    }

    async fn unit(&self, id: u16) -> Result<Bytes, BoxError> {
        self.lookup(&self.units, id).await
    }

    async fn sprite(&self, id: u16) -> Result<Bytes, BoxError> {
        self.lookup(&self.sprites, id).await
    }
}

/// In-memory [`FileReader`]
#[derive(Debug, Default)]
pub struct MemoryFiles {
    files: AHashMap<String, Bytes>,
}

impl MemoryFiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file(mut self, path: &str, data: Bytes) -> Self {
        self.files.insert(path.to_string(), data);
        self
    }
}

#[async_trait]
impl FileReader for MemoryFiles {
    async fn read(&self, path: &str) -> Result<Bytes, BoxError> {
        self.files.get(path).cloned().ok_or_else(|| format!("file not found: {}", path).into())
    }
}
