//! Scenario model built from a raw CHK buffer.

pub mod players;
pub mod sections;
pub mod strings;
pub mod units;

use std::borrow::Cow;

use tracing::debug;

use crate::assets::AssetCache;
use crate::codec::u16_at;
use crate::error::{Error, Result};
use crate::renderer::{self, RenderOptions};
use crate::triggers::{ActionType, ConditionType, Triggers};

pub use players::{Force, ForceFlags, Player, PlayerType, Race};
pub use sections::{MergeRule, SectionId, SectionRule, SectionTable};
pub use strings::{StringEncoding, StringTable};
pub use units::{Sprite, Unit};

use units::MapBounds;

pub const TILESET_NAMES: [&str; 8] =
    ["badlands", "platform", "install", "ashworld", "jungle", "desert", "ice", "twilight"];

/// Highest player id that has a death table entry
const EUD_PLAYER_LIMIT: u32 = 27;

/// Options for [`Chk::with_options`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseOptions {
    /// Decode strings with this encoding instead of detecting one
    pub encoding: Option<StringEncoding>,
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn encoding(mut self, encoding: StringEncoding) -> Self {
        self.encoding = Some(encoding);
        self
    }
}

/// A decoded scenario. Borrows from the input buffer where sections were not merged.
#[derive(Debug, Clone)]
pub struct Chk<'a> {
    title: String,
    description: String,
    size: (u16, u16),
    tileset: u8,
    forces: Vec<Force>,
    max_melee_players: u8,
    units: Vec<Unit>,
    sprites: Vec<Sprite>,
    strings: StringTable<'a>,
    tiles: Cow<'a, [u8]>,
    triggers: Cow<'a, [u8]>,
}

impl<'a> Chk<'a> {
    pub fn from_bytes(buf: &'a [u8]) -> Result<Self> {
        Self::with_options(buf, ParseOptions::default())
    }

    pub fn with_options(buf: &'a [u8], options: ParseOptions) -> Result<Self> {
        let mut sections = SectionTable::parse(buf);

        let strings = match sections.take(SectionId::STRX) {
            Some(data) => StringTable::with_encoding(data, true, options.encoding),
            None => {
                let data = sections.take(SectionId::STR).ok_or(Error::MissingSection(SectionId::STR))?;
                StringTable::with_encoding(data, false, options.encoding)
            }
        };

        let sprp = sections.section(SectionId::SPRP)?;
        let title = strings.get(u16_at(sprp, 0) as usize);
        let description = strings.get(u16_at(sprp, 2) as usize);

        let tileset = (u16_at(sections.section(SectionId::ERA)?, 0) & 0x7) as u8;
        let dim = sections.section(SectionId::DIM)?;
        let size = (u16_at(dim, 0), u16_at(dim, 2));

        let (forces, max_melee_players) = players::parse_players(
            sections.section(SectionId::FORC)?,
            sections.section(SectionId::OWNR)?,
            sections.section(SectionId::SIDE)?,
            &strings,
        );

        let bounds = MapBounds::from_tiles(size.0, size.1);
        let mut units = Vec::new();
        let mut sprites = Vec::new();
        units::parse_units(sections.section(SectionId::UNIT)?, bounds, &mut units);
        units::parse_thg2(sections.section(SectionId::THG2)?, bounds, &mut units, &mut sprites);

        let tiles = sections.take(SectionId::MTXM).ok_or(Error::MissingSection(SectionId::MTXM))?;
        let triggers = sections.take(SectionId::TRIG).unwrap_or_default();

        debug!(
            width = size.0,
            height = size.1,
            tileset,
            units = units.len(),
            sprites = sprites.len(),
            encoding = %strings.encoding(),
            "parsed scenario"
        );

        Ok(Self {
            title,
            description,
            size,
            tileset,
            forces,
            max_melee_players,
            units,
            sprites,
            strings,
            tiles,
            triggers,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// (width, height) in tiles
    pub fn size(&self) -> (u16, u16) {
        self.size
    }

    pub fn tileset(&self) -> u8 {
        self.tileset
    }

    pub fn tileset_name(&self) -> &'static str {
        TILESET_NAMES[self.tileset as usize]
    }

    /// Always exactly four forces
    pub fn forces(&self) -> &[Force] {
        &self.forces
    }

    /// Units from `UNIT`, followed by doodad units from `THG2`
    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    pub fn sprites(&self) -> &[Sprite] {
        &self.sprites
    }

    /// Player count for a game mode. UMS counts non-computer players in
    /// the four forces; melee counts every active slot.
    pub fn max_players(&self, ums: bool) -> u8 {
        if ums {
            self.forces
                .iter()
                .flat_map(|force| force.players.iter())
                .filter(|player| !player.computer)
                .count() as u8
        } else {
            self.max_melee_players
        }
    }

    pub fn encoding(&self) -> StringEncoding {
        self.strings.encoding()
    }

    pub fn strings(&self) -> &StringTable<'a> {
        &self.strings
    }

    /// Raw `MTXM` tile ids, u16 little-endian, row-major
    pub fn tiles(&self) -> &[u8] {
        &self.tiles
    }

    pub fn triggers(&self) -> Triggers<'_> {
        Triggers::new(&self.triggers, &self.strings)
    }

    /// Whether triggers read or write memory outside the death table
    pub fn is_eud_map(&self) -> bool {
        let out_of_table = |player: Option<u32>, unit_id: Option<u16>| {
            player.is_some_and(|p| p >= EUD_PLAYER_LIMIT)
                || unit_id.is_some_and(|u| u >= units::UNIT_TYPE_COUNT)
        };
        self.triggers().iter().any(|trigger| {
            let conditions = trigger.all_conditions().any(|condition| {
                if condition.kind() != Some(ConditionType::Deaths) {
                    return false;
                }
                let params = condition.params();
                out_of_table(params.player, params.unit_id)
            });
            conditions
                || trigger.all_actions().any(|action| {
                    if action.kind() != Some(ActionType::SetDeaths) {
                        return false;
                    }
                    let params = action.params();
                    out_of_table(params.player, params.unit_id)
                })
        })
    }

    /// Render a minimap of `width` x `height` RGB pixels
    pub async fn image(
        &self,
        assets: &AssetCache,
        width: u32,
        height: u32,
        options: RenderOptions,
    ) -> Result<Vec<u8>> {
        renderer::render(self, assets, width, height, options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{sprite_record, unit_record, ScenarioBuilder};

    #[test]
    fn test_simple_map() {
        let data = ScenarioBuilder::new().build();
        let chk = Chk::from_bytes(&data).unwrap();
        assert_eq!(chk.title(), "Untitled Scenario.");
        assert_eq!(chk.description(), "Destroy all enemy buildings.");
        assert_eq!(chk.size(), (64, 64));
        assert_eq!(chk.max_players(true), 8);
        assert_eq!(chk.max_players(false), 8);
        assert_eq!(chk.forces().len(), 4);
        assert_eq!(chk.forces()[0].flags.bits(), 15);
        assert_eq!(chk.encoding(), StringEncoding::Cp1252);
    }

    #[test]
    fn test_tileset_masked() {
        let data = ScenarioBuilder::new().era(0xfffc).build();
        let chk = Chk::from_bytes(&data).unwrap();
        assert_eq!(chk.tileset(), 4);
        assert_eq!(chk.tileset_name(), "jungle");
    }

    #[test]
    fn test_incomplete_forces() {
        let mut ownr = [0u8; 12];
        ownr[0] = 5;
        ownr[1] = 5;
        let data = ScenarioBuilder::new().ownr(ownr).force_assignments([0; 8]).build();
        let chk = Chk::from_bytes(&data).unwrap();
        assert_eq!(chk.forces()[0].players.len(), 2);
        assert_eq!(chk.max_players(false), 2);
        assert_eq!(chk.max_players(true), 0);
    }

    #[test]
    fn test_weird_forces() {
        let data = ScenarioBuilder::new().force_assignments([0, 1, 2, 3, 4, 5, 6, 7]).build();
        let chk = Chk::from_bytes(&data).unwrap();
        for (i, force) in chk.forces().iter().enumerate() {
            assert_eq!(force.players.len(), 1);
            assert_eq!(force.players[0].id as usize, i);
        }
        assert_eq!(chk.max_players(true), 4);
        assert_eq!(chk.max_players(false), 8);
    }

    #[test]
    fn test_max_players_bounds() {
        let ownr = [6, 5, 3, 6, 1, 7, 0, 6, 0, 0, 0, 0];
        let data = ScenarioBuilder::new().ownr(ownr).build();
        let chk = Chk::from_bytes(&data).unwrap();
        assert!(chk.max_players(false) as usize <= players::PLAYER_SLOTS);
        let humans = ownr[..8].iter().filter(|&&o| o == 6).count();
        assert_eq!(chk.max_players(true) as usize, humans);
        assert_eq!(chk.max_players(false), 5);
    }

    #[test]
    fn test_missing_section() {
        for tag in [b"SPRP", b"ERA ", b"DIM ", b"FORC", b"OWNR", b"SIDE", b"MTXM", b"UNIT", b"THG2"] {
            let data = ScenarioBuilder::new().without(tag).build();
            match Chk::from_bytes(&data) {
                Err(Error::MissingSection(id)) => assert_eq!(&id.0, tag),
                other => panic!("expected missing {:?}, got {:?}", SectionId(*tag), other.map(|_| ())),
            }
        }
        let data = ScenarioBuilder::new().without(b"STR ").build();
        assert!(matches!(Chk::from_bytes(&data), Err(Error::MissingSection(SectionId::STR))));
    }

    #[test]
    fn test_section_abuse() {
        // A later, shorter string section patches the front of the first one,
        // and a second DIM replaces the first.
        let base = ScenarioBuilder::new();
        let strings = base.string_data();
        let mut data = base.size(64, 64).build();
        let mut patch = strings.clone();
        patch.truncate(4);
        let mut writer = crate::codec::BinaryWriter::new();
        writer.write_section(b"STR ", &patch);
        writer.write_section(b"DIM ", &[128, 0, 128, 0]);
        data.extend(writer.into_vec());

        let chk = Chk::from_bytes(&data).unwrap();
        assert_eq!(chk.title(), "Untitled Scenario.");
        assert_eq!(chk.size(), (128, 128));
    }

    #[test]
    fn test_extended_strings_preferred() {
        let mut strx = crate::codec::BinaryWriter::new();
        strx.write_u32_le(2);
        strx.write_u32_le(12);
        strx.write_u32_le(19);
        strx.write_bytes(b"\x07Polyp\0");
        strx.write_bytes(b"harmless\0");
        let data = ScenarioBuilder::new().section(b"STRx", strx.into_vec()).build();
        let chk = Chk::from_bytes(&data).unwrap();
        assert_eq!(chk.title(), "\x07Polyp");
        assert_eq!(chk.description(), "harmless");
    }

    #[test]
    fn test_forced_encoding() {
        let data = ScenarioBuilder::new()
            .strings(vec!["\u{d6a8}\u{c9c4}".as_bytes().to_vec(), b"desc".to_vec()])
            .build();
        let chk = Chk::from_bytes(&data).unwrap();
        assert_eq!(chk.encoding(), StringEncoding::Utf8);
        assert_eq!(chk.title(), "효진");

        let chk = Chk::with_options(&data, ParseOptions::new().encoding(StringEncoding::Cp1252)).unwrap();
        assert_eq!(chk.encoding(), StringEncoding::Cp1252);
        assert_ne!(chk.title(), "효진");
    }

    #[test]
    fn test_units_and_sprites() {
        let mut unit = unit_record(100, 100, 0, 0);
        unit.extend(unit_record(200, 200, units::MINERAL_FIELD_1, 11));
        let mut thg2 = Vec::new();
        for i in 0..10u16 {
            thg2.extend(sprite_record(i, 10 + i, 10, 0, 0x1000));
        }
        thg2.extend(sprite_record(1, 10, 64 * 32, 0, 0x1000));
        thg2.extend(sprite_record(units::VESPENE_GEYSER, 300, 300, 11, 0));

        let data = ScenarioBuilder::new().units(unit).thg2(thg2).build();
        let chk = Chk::from_bytes(&data).unwrap();
        assert_eq!(chk.sprites().len(), 10);
        assert_eq!(chk.units().len(), 3);
        assert!(!chk.units()[1].is_sprite);
        assert!(chk.units()[2].is_sprite);
    }

    #[test]
    fn test_triggers_optional() {
        let data = ScenarioBuilder::new().build();
        let chk = Chk::from_bytes(&data).unwrap();
        assert_eq!(chk.triggers().len(), 0);
        assert!(!chk.is_eud_map());
    }

    #[test]
    fn test_eud_detection() {
        use crate::fixtures::TriggerBuilder;

        let normal = TriggerBuilder::new()
            .condition(ConditionType::Deaths as u8, |c| {
                c[4..8].copy_from_slice(&3u32.to_le_bytes());
                c[12..14].copy_from_slice(&10u16.to_le_bytes());
            })
            .build();
        let data = ScenarioBuilder::new().section(b"TRIG", normal.clone()).build();
        assert!(!Chk::from_bytes(&data).unwrap().is_eud_map());

        let eud = TriggerBuilder::new()
            .action(ActionType::SetDeaths as u8, |a| {
                a[16..20].copy_from_slice(&0x0058_a364u32.to_le_bytes());
                a[24..26].copy_from_slice(&0u16.to_le_bytes());
            })
            .build();
        let mut trig = normal;
        trig.extend(eud);
        let data = ScenarioBuilder::new().section(b"TRIG", trig).build();
        let chk = Chk::from_bytes(&data).unwrap();
        assert_eq!(chk.triggers().len(), 2);
        assert!(chk.is_eud_map());
    }
}
