//! Structural decoding of the `TRIG` section.
//!
//! A trigger is a fixed 2400-byte record: 16 condition slots of 20 bytes, then
//! 64 action slots of 32 bytes, then execution flags and the per-player bytes.
//! Nothing is copied; every view borrows the section data.

pub mod opcodes;
pub mod params;

use crate::chk::StringTable;
use crate::codec::u8_at;

pub use opcodes::{ActionFields, ActionType, ConditionFields, ConditionType};
pub use params::{
    ActionParams, ActionState, ActionSwitchState, AllianceStatus, Comparison, ConditionParams,
    ConditionSwitchState, Modifier, ResourceType, ScoreType, UnitOrder,
};

pub const TRIGGER_SIZE: usize = 2400;
const ACTIONS_OFFSET: usize = 320;
const PLAYERS_OFFSET: usize = 2372;
const PLAYER_COUNT: usize = 27;

const DISABLED: u8 = 0x2;
const ALWAYS_DISPLAY: u8 = 0x4;

/// Shape of one fixed-size sub-record array inside a trigger
#[derive(Debug)]
struct RecordLayout {
    size: usize,
    capacity: usize,
    id_offset: usize,
    flags_offset: usize,
}

const CONDITION_LAYOUT: RecordLayout =
    RecordLayout { size: 20, capacity: 16, id_offset: 15, flags_offset: 17 };
const ACTION_LAYOUT: RecordLayout =
    RecordLayout { size: 32, capacity: 64, id_offset: 26, flags_offset: 28 };

/// Walks condition or action slots.
///
/// Active-only cursors stop at the first empty slot and skip disabled ones;
/// `include_disabled` cursors yield every slot up to capacity.
#[derive(Debug, Clone)]
struct RecordCursor<'t> {
    data: &'t [u8],
    layout: &'static RecordLayout,
    index: usize,
    include_disabled: bool,
}

impl<'t> RecordCursor<'t> {
    fn new(data: &'t [u8], layout: &'static RecordLayout, include_disabled: bool) -> Self {
        Self { data, layout, index: 0, include_disabled }
    }
}

impl<'t> Iterator for RecordCursor<'t> {
    type Item = &'t [u8];

    fn next(&mut self) -> Option<&'t [u8]> {
        let layout = self.layout;
        while self.index < layout.capacity {
            let start = self.index * layout.size;
            let raw = self.data.get(start..start + layout.size)?;
            if !self.include_disabled && raw[layout.id_offset] == 0 {
                self.index = layout.capacity;
                return None;
            }
            self.index += 1;
            if !self.include_disabled && raw[layout.flags_offset] & DISABLED != 0 {
                continue;
            }
            return Some(raw);
        }
        None
    }
}

/// All triggers of a scenario
#[derive(Debug, Clone, Copy)]
pub struct Triggers<'t> {
    data: &'t [u8],
    strings: &'t StringTable<'t>,
}

impl<'t> Triggers<'t> {
    pub fn new(data: &'t [u8], strings: &'t StringTable<'t>) -> Self {
        Self { data, strings }
    }

    /// Complete records only; a partial trailing record is ignored
    pub fn len(&self) -> usize {
        self.data.len() / TRIGGER_SIZE
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> TriggerIter<'t> {
        self.iter_from(0)
    }

    /// Iterate starting at trigger `index`
    pub fn iter_from(&self, index: usize) -> TriggerIter<'t> {
        TriggerIter { triggers: *self, index }
    }
}

impl<'t> IntoIterator for Triggers<'t> {
    type Item = Trigger<'t>;
    type IntoIter = TriggerIter<'t>;

    fn into_iter(self) -> TriggerIter<'t> {
        self.iter()
    }
}

#[derive(Debug, Clone)]
pub struct TriggerIter<'t> {
    triggers: Triggers<'t>,
    index: usize,
}

impl<'t> Iterator for TriggerIter<'t> {
    type Item = Trigger<'t>;

    fn next(&mut self) -> Option<Trigger<'t>> {
        let start = self.index.checked_mul(TRIGGER_SIZE)?;
        let raw = self.triggers.data.get(start..start.checked_add(TRIGGER_SIZE)?)?;
        self.index += 1;
        Some(Trigger { raw, strings: self.triggers.strings })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.triggers.len().saturating_sub(self.index);
        (left, Some(left))
    }
}

impl ExactSizeIterator for TriggerIter<'_> {}

#[derive(Debug, Clone, Copy)]
pub struct Trigger<'t> {
    raw: &'t [u8],
    strings: &'t StringTable<'t>,
}

impl<'t> Trigger<'t> {
    /// Ids (0-26) of players and player groups the trigger runs for
    pub fn players(&self) -> Vec<u8> {
        (0..PLAYER_COUNT as u8)
            .filter(|&i| u8_at(self.raw, PLAYERS_OFFSET + i as usize) != 0)
            .collect()
    }

    /// Enabled conditions, up to the first empty slot
    pub fn conditions(&self) -> Conditions<'t> {
        Conditions(RecordCursor::new(self.raw, &CONDITION_LAYOUT, false))
    }

    /// Every condition slot, including empty and disabled ones
    pub fn all_conditions(&self) -> Conditions<'t> {
        Conditions(RecordCursor::new(self.raw, &CONDITION_LAYOUT, true))
    }

    /// Enabled actions, up to the first empty slot
    pub fn actions(&self) -> Actions<'t> {
        Actions {
            cursor: RecordCursor::new(&self.raw[ACTIONS_OFFSET..], &ACTION_LAYOUT, false),
            strings: self.strings,
        }
    }

    /// Every action slot, including empty and disabled ones
    pub fn all_actions(&self) -> Actions<'t> {
        Actions {
            cursor: RecordCursor::new(&self.raw[ACTIONS_OFFSET..], &ACTION_LAYOUT, true),
            strings: self.strings,
        }
    }

    pub fn raw(&self) -> &'t [u8] {
        self.raw
    }
}

#[derive(Debug, Clone)]
pub struct Conditions<'t>(RecordCursor<'t>);

impl<'t> Iterator for Conditions<'t> {
    type Item = Condition<'t>;

    fn next(&mut self) -> Option<Condition<'t>> {
        self.0.next().map(|raw| Condition { raw })
    }
}

#[derive(Debug, Clone)]
pub struct Actions<'t> {
    cursor: RecordCursor<'t>,
    strings: &'t StringTable<'t>,
}

impl<'t> Iterator for Actions<'t> {
    type Item = Action<'t>;

    fn next(&mut self) -> Option<Action<'t>> {
        let strings = self.strings;
        self.cursor.next().map(|raw| Action { raw, strings })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Condition<'t> {
    raw: &'t [u8],
}

impl<'t> Condition<'t> {
    pub fn id(&self) -> u8 {
        self.raw[CONDITION_LAYOUT.id_offset]
    }

    /// `None` for ids outside the known opcode range
    pub fn kind(&self) -> Option<ConditionType> {
        ConditionType::from_u8(self.id())
    }

    pub fn is_disabled(&self) -> bool {
        self.raw[CONDITION_LAYOUT.flags_offset] & DISABLED != 0
    }

    pub fn params(&self) -> ConditionParams {
        ConditionParams::decode(ConditionFields::for_id(self.id()), self.raw)
    }

    /// The 20-byte record
    pub fn raw(&self) -> &'t [u8] {
        self.raw
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Action<'t> {
    raw: &'t [u8],
    strings: &'t StringTable<'t>,
}

impl<'t> Action<'t> {
    pub fn id(&self) -> u8 {
        self.raw[ACTION_LAYOUT.id_offset]
    }

    pub fn kind(&self) -> Option<ActionType> {
        ActionType::from_u8(self.id())
    }

    pub fn is_disabled(&self) -> bool {
        self.raw[ACTION_LAYOUT.flags_offset] & DISABLED != 0
    }

    /// Text is shown even when subtitles are off
    pub fn always_display(&self) -> bool {
        self.raw[ACTION_LAYOUT.flags_offset] & ALWAYS_DISPLAY != 0
    }

    pub fn params(&self) -> ActionParams {
        ActionParams::decode(ActionFields::for_id(self.id()), self.raw, self.strings)
    }

    /// The 32-byte record
    pub fn raw(&self) -> &'t [u8] {
        self.raw
    }
}
