//! Forces and player slots (`FORC`, `OWNR`, `SIDE`).

use bitflags::bitflags;

use super::strings::StringTable;
use crate::codec::{u16_at, u8_at};

pub const PLAYER_SLOTS: usize = 8;
pub const FORCE_COUNT: usize = 4;
const FORCE_SECTION_SIZE: usize = 20;

bitflags! {
    /// Per-force settings from `FORC`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ForceFlags: u8 {
        const RANDOM_START_LOCATIONS = 0x01;
        const ALLIED = 0x02;
        const ALLIED_VICTORY = 0x04;
        const SHARED_VISION = 0x08;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Race {
    Zerg,
    Terran,
    Protoss,
    Independent,
    Neutral,
    UserSelectable,
    Random,
    Inactive,
    Unknown(u8),
}

impl Race {
    pub fn from_u8(v: u8) -> Self {
        match v {
            0 => Self::Zerg,
            1 => Self::Terran,
            2 => Self::Protoss,
            3 => Self::Independent,
            4 => Self::Neutral,
            5 => Self::UserSelectable,
            6 => Self::Random,
            7 => Self::Inactive,
            v => Self::Unknown(v),
        }
    }

    pub fn to_u8(self) -> u8 {
        match self {
            Self::Zerg => 0,
            Self::Terran => 1,
            Self::Protoss => 2,
            Self::Independent => 3,
            Self::Neutral => 4,
            Self::UserSelectable => 5,
            Self::Random => 6,
            Self::Inactive => 7,
            Self::Unknown(v) => v,
        }
    }
}

/// Slot ownership from `OWNR`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerType {
    Inactive,
    /// Computer, as stored in saved games
    ComputerGame,
    /// Human, as stored in saved games
    HumanGame,
    Rescueable,
    Unused,
    Computer,
    Human,
    Neutral,
    Closed,
    Unknown(u8),
}

impl PlayerType {
    pub fn from_u8(v: u8) -> Self {
        match v {
            0 => Self::Inactive,
            1 => Self::ComputerGame,
            2 => Self::HumanGame,
            3 => Self::Rescueable,
            4 => Self::Unused,
            5 => Self::Computer,
            6 => Self::Human,
            7 => Self::Neutral,
            8 => Self::Closed,
            v => Self::Unknown(v),
        }
    }

    pub fn to_u8(self) -> u8 {
        match self {
            Self::Inactive => 0,
            Self::ComputerGame => 1,
            Self::HumanGame => 2,
            Self::Rescueable => 3,
            Self::Unused => 4,
            Self::Computer => 5,
            Self::Human => 6,
            Self::Neutral => 7,
            Self::Closed => 8,
            Self::Unknown(v) => v,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Inactive => "inactive",
            Self::ComputerGame | Self::Computer => "computer",
            Self::HumanGame | Self::Human => "human",
            Self::Rescueable => "rescueable",
            Self::Unused => "unused",
            Self::Neutral => "neutral",
            Self::Closed => "closed",
            Self::Unknown(_) => "unknown",
        }
    }

    /// Only rescueable, computer and human slots are playable in a scenario;
    /// saved-game and neutral owners are treated as empty.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Rescueable | Self::Computer | Self::Human)
    }

    pub fn is_computer(self) -> bool {
        !matches!(self, Self::Human | Self::HumanGame)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    /// Slot 0-7
    pub id: u8,
    pub race: Race,
    pub computer: bool,
    pub player_type: PlayerType,
}

impl Player {
    pub fn type_id(&self) -> u8 {
        self.player_type.to_u8()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Force {
    pub name: String,
    pub flags: ForceFlags,
    /// Active players assigned to this force, in slot order
    pub players: Vec<Player>,
}

/// Build the four forces and count active slots.
///
/// A `FORC` shorter than 20 bytes is zero-padded. Active players whose force
/// byte is 4 or above are counted but belong to no force.
pub(crate) fn parse_players(
    forc: &[u8],
    ownr: &[u8],
    side: &[u8],
    strings: &StringTable<'_>,
) -> (Vec<Force>, u8) {
    let mut padded = [0u8; FORCE_SECTION_SIZE];
    let len = forc.len().min(FORCE_SECTION_SIZE);
    padded[..len].copy_from_slice(&forc[..len]);

    let mut forces: Vec<Force> = (0..FORCE_COUNT)
        .map(|i| Force {
            name: strings.get(u16_at(&padded, 8 + i * 2) as usize),
            flags: ForceFlags::from_bits_retain(padded[16 + i]),
            players: Vec::new(),
        })
        .collect();

    let mut active = 0;
    for id in 0..PLAYER_SLOTS {
        let player_type = PlayerType::from_u8(u8_at(ownr, id));
        if !player_type.is_active() {
            continue;
        }
        active += 1;
        let player = Player {
            id: id as u8,
            race: Race::from_u8(u8_at(side, id)),
            computer: player_type.is_computer(),
            player_type,
        };
        if let Some(force) = forces.get_mut(padded[id] as usize) {
            force.players.push(player);
        }
    }
    (forces, active)
}
