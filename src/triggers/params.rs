//! Typed condition/action parameters.
//!
//! Which fields are present depends only on the opcode (see [`ConditionFields`] and
//! [`ActionFields`]); every present field lives at a fixed offset of the record.

use std::fmt;

use byteorder::{BigEndian, ByteOrder};

use super::opcodes::{ActionFields, ConditionFields};
use crate::chk::StringTable;
use crate::codec::{u16_at, u32_at, u8_at};

macro_rules! param_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident = $raw:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant,)+
            /// Raw value with no known meaning
            Unknown(u32),
        }

        impl $name {
            pub fn from_raw(v: u32) -> Self {
                match v {
                    $($raw => Self::$variant,)+
                    v => Self::Unknown(v),
                }
            }

            pub fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($variant),)+
                    Self::Unknown(_) => "Unknown",
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

param_enum! {
    Comparison { AtLeast = 0, AtMost = 1, Exactly = 10 }
}

param_enum! {
    Modifier { Set = 7, Add = 8, Subtract = 9 }
}

param_enum! {
    UnitOrder { Move = 0, Patrol = 1, Attack = 2 }
}

param_enum! {
    AllianceStatus { Enemy = 0, Ally = 1, AlliedVictory = 2 }
}

param_enum! {
    /// Switch test used by the Switch condition
    ConditionSwitchState { Set = 2, Clear = 3 }
}

param_enum! {
    ActionSwitchState { Set = 4, Clear = 5, Toggle = 6, Randomize = 11 }
}

param_enum! {
    /// On/off state for doodads and invincibility
    ActionState { Set = 4, Clear = 5, Toggle = 6 }
}

param_enum! {
    ResourceType { Ore = 0, Gas = 1, OreAndGas = 2 }
}

param_enum! {
    ScoreType {
        Total = 0,
        Units = 1,
        Buildings = 2,
        UnitsAndBuildings = 3,
        Kills = 4,
        Razings = 5,
        KillsAndRazings = 6,
        Custom = 7,
    }
}

/// Stored 1-based; 0 ("no location") becomes -1
fn location(raw: &[u8], offset: usize) -> i32 {
    u8_at(raw, offset) as i32 - 1
}

/// Parameters of one condition. Fields the opcode does not use are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConditionParams {
    /// 0-based location index
    pub location: Option<i32>,
    pub player: Option<u32>,
    pub amount: Option<u32>,
    pub comparison: Option<Comparison>,
    pub unit_id: Option<u16>,
    pub switch_id: Option<u8>,
    pub switch_state: Option<ConditionSwitchState>,
    pub resource_type: Option<ResourceType>,
    pub score_type: Option<ScoreType>,
}

impl ConditionParams {
    pub(crate) fn decode(fields: ConditionFields, raw: &[u8]) -> Self {
        let has = |flag| fields.contains(flag);
        Self {
            location: has(ConditionFields::LOCATION).then(|| location(raw, 0)),
            player: has(ConditionFields::PLAYER).then(|| u32_at(raw, 4)),
            amount: has(ConditionFields::AMOUNT).then(|| u32_at(raw, 8)),
            comparison: has(ConditionFields::AMOUNT)
                .then(|| Comparison::from_raw(u8_at(raw, 14) as u32)),
            unit_id: has(ConditionFields::UNIT).then(|| u16_at(raw, 12)),
            switch_id: has(ConditionFields::SWITCH).then(|| u8_at(raw, 16)),
            switch_state: has(ConditionFields::SWITCH)
                .then(|| ConditionSwitchState::from_raw(u8_at(raw, 14) as u32)),
            resource_type: has(ConditionFields::RESOURCE)
                .then(|| ResourceType::from_raw(u8_at(raw, 16) as u32)),
            score_type: has(ConditionFields::SCORE)
                .then(|| ScoreType::from_raw(u8_at(raw, 16) as u32)),
        }
    }
}

/// Parameters of one action. Fields the opcode does not use are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionParams {
    /// 0-based location index
    pub location: Option<i32>,
    pub dest_location: Option<i32>,
    /// Location moved by Move Location
    pub moved_location: Option<i32>,
    pub player: Option<u32>,
    pub dest_player: Option<u32>,
    /// Milliseconds
    pub time: Option<u32>,
    pub modifier: Option<Modifier>,
    pub unit_id: Option<u16>,
    pub unit_order: Option<UnitOrder>,
    /// 0 means all units
    pub unit_amount: Option<u8>,
    pub alliance_status: Option<AllianceStatus>,
    pub switch_id: Option<u32>,
    pub switch_state: Option<ActionSwitchState>,
    pub resource_type: Option<ResourceType>,
    pub score_type: Option<ScoreType>,
    /// Four-character script id, e.g. `u32::from_be_bytes(*b"TMCu")`
    pub ai_script: Option<u32>,
    pub always_display: Option<bool>,
    pub text: Option<String>,
    pub sound_file: Option<String>,
    pub state: Option<ActionState>,
    pub amount: Option<u32>,
}

impl ActionParams {
    pub(crate) fn decode(fields: ActionFields, raw: &[u8], strings: &StringTable<'_>) -> Self {
        let has = |flag| fields.contains(flag);
        let amount = if has(ActionFields::COUNTDOWN_AMOUNT) {
            Some(u32_at(raw, 12))
        } else if has(ActionFields::AMOUNT) {
            Some(u32_at(raw, 20))
        } else {
            None
        };
        Self {
            location: has(ActionFields::LOCATION).then(|| location(raw, 0)),
            dest_location: has(ActionFields::DEST_LOCATION).then(|| location(raw, 20)),
            moved_location: has(ActionFields::MOVED_LOCATION).then(|| location(raw, 20)),
            player: has(ActionFields::PLAYER).then(|| u32_at(raw, 16)),
            dest_player: has(ActionFields::DEST_PLAYER).then(|| u32_at(raw, 20)),
            time: has(ActionFields::TIME).then(|| u32_at(raw, 12)),
            modifier: has(ActionFields::MODIFIER).then(|| Modifier::from_raw(u8_at(raw, 27) as u32)),
            unit_id: has(ActionFields::UNIT).then(|| u16_at(raw, 24)),
            unit_order: has(ActionFields::ORDER).then(|| UnitOrder::from_raw(u8_at(raw, 27) as u32)),
            unit_amount: has(ActionFields::UNIT_AMOUNT).then(|| u8_at(raw, 27)),
            alliance_status: has(ActionFields::ALLIANCE)
                .then(|| AllianceStatus::from_raw(u16_at(raw, 24) as u32)),
            switch_id: has(ActionFields::SWITCH).then(|| u32_at(raw, 20)),
            switch_state: has(ActionFields::SWITCH)
                .then(|| ActionSwitchState::from_raw(u8_at(raw, 27) as u32)),
            resource_type: has(ActionFields::RESOURCE)
                .then(|| ResourceType::from_raw(u16_at(raw, 24) as u32)),
            score_type: has(ActionFields::SCORE).then(|| ScoreType::from_raw(u16_at(raw, 24) as u32)),
            ai_script: has(ActionFields::AI_SCRIPT)
                .then(|| raw.get(20..24).map(BigEndian::read_u32).unwrap_or(0)),
            always_display: has(ActionFields::ALWAYS_DISPLAY).then(|| u8_at(raw, 28) & 0x4 != 0),
            text: has(ActionFields::TEXT).then(|| strings.get(u32_at(raw, 4) as usize)),
            sound_file: has(ActionFields::SOUND_FILE).then(|| strings.get(u32_at(raw, 8) as usize)),
            state: has(ActionFields::STATE).then(|| ActionState::from_raw(u8_at(raw, 27) as u32)),
            amount,
        }
    }
}
