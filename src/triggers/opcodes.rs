//! Condition/action opcodes and the per-opcode parameter masks.

use bitflags::bitflags;

/// Condition opcodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ConditionType {
    None = 0,
    CountdownTimer = 1,
    Command = 2,
    Bring = 3,
    Accumulate = 4,
    Kill = 5,
    CommandMost = 6,
    CommandMostAt = 7,
    MostKills = 8,
    HighestScore = 9,
    MostResources = 10,
    Switch = 11,
    ElapsedTime = 12,
    MissionBriefing = 13,
    Opponents = 14,
    Deaths = 15,
    CommandLeast = 16,
    CommandLeastAt = 17,
    LeastKills = 18,
    LowestScore = 19,
    LeastResources = 20,
    Score = 21,
    Always = 22,
    Never = 23,
}

impl ConditionType {
    const ALL: [Self; 24] = [
        Self::None,
        Self::CountdownTimer,
        Self::Command,
        Self::Bring,
        Self::Accumulate,
        Self::Kill,
        Self::CommandMost,
        Self::CommandMostAt,
        Self::MostKills,
        Self::HighestScore,
        Self::MostResources,
        Self::Switch,
        Self::ElapsedTime,
        Self::MissionBriefing,
        Self::Opponents,
        Self::Deaths,
        Self::CommandLeast,
        Self::CommandLeastAt,
        Self::LeastKills,
        Self::LowestScore,
        Self::LeastResources,
        Self::Score,
        Self::Always,
        Self::Never,
    ];

    pub fn from_u8(v: u8) -> Option<Self> {
        Self::ALL.get(v as usize).copied()
    }
}

/// Action opcodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ActionType {
    None = 0,
    Victory = 1,
    Defeat = 2,
    PreserveTrigger = 3,
    Wait = 4,
    Pause = 5,
    Unpause = 6,
    Transmission = 7,
    PlayWav = 8,
    DisplayText = 9,
    CenterView = 10,
    CreateUnitWithProperties = 11,
    SetMissionObjectives = 12,
    SetSwitch = 13,
    SetCountdownTimer = 14,
    RunAiScript = 15,
    RunAiScriptAtLocation = 16,
    LeaderboardControl = 17,
    LeaderboardControlAtLocation = 18,
    LeaderboardResources = 19,
    LeaderboardKills = 20,
    LeaderboardPoints = 21,
    KillUnit = 22,
    KillUnitAtLocation = 23,
    RemoveUnit = 24,
    RemoveUnitAtLocation = 25,
    SetResources = 26,
    SetScore = 27,
    MinimapPing = 28,
    TalkingPortrait = 29,
    MuteUnitSpeech = 30,
    UnmuteUnitSpeech = 31,
    LeaderboardComputers = 32,
    LeaderboardGoalControl = 33,
    LeaderboardGoalControlAtLocation = 34,
    LeaderboardGoalResources = 35,
    LeaderboardGoalKills = 36,
    LeaderboardGoalPoints = 37,
    MoveLocation = 38,
    MoveUnit = 39,
    LeaderboardGreed = 40,
    SetNextScenario = 41,
    SetDoodadState = 42,
    SetInvincibility = 43,
    CreateUnit = 44,
    SetDeaths = 45,
    IssueOrder = 46,
    Comment = 47,
    GiveUnit = 48,
    SetUnitHp = 49,
    SetUnitEnergy = 50,
    SetUnitShields = 51,
    SetUnitResource = 52,
    SetUnitHangar = 53,
    PauseCountdownTimer = 54,
    UnpauseCountdownTimer = 55,
    Draw = 56,
    SetAlliance = 57,
    DisableDebug = 58,
    EnableDebug = 59,
}

impl ActionType {
    const ALL: [Self; 60] = [
        Self::None,
        Self::Victory,
        Self::Defeat,
        Self::PreserveTrigger,
        Self::Wait,
        Self::Pause,
        Self::Unpause,
        Self::Transmission,
        Self::PlayWav,
        Self::DisplayText,
        Self::CenterView,
        Self::CreateUnitWithProperties,
        Self::SetMissionObjectives,
        Self::SetSwitch,
        Self::SetCountdownTimer,
        Self::RunAiScript,
        Self::RunAiScriptAtLocation,
        Self::LeaderboardControl,
        Self::LeaderboardControlAtLocation,
        Self::LeaderboardResources,
        Self::LeaderboardKills,
        Self::LeaderboardPoints,
        Self::KillUnit,
        Self::KillUnitAtLocation,
        Self::RemoveUnit,
        Self::RemoveUnitAtLocation,
        Self::SetResources,
        Self::SetScore,
        Self::MinimapPing,
        Self::TalkingPortrait,
        Self::MuteUnitSpeech,
        Self::UnmuteUnitSpeech,
        Self::LeaderboardComputers,
        Self::LeaderboardGoalControl,
        Self::LeaderboardGoalControlAtLocation,
        Self::LeaderboardGoalResources,
        Self::LeaderboardGoalKills,
        Self::LeaderboardGoalPoints,
        Self::MoveLocation,
        Self::MoveUnit,
        Self::LeaderboardGreed,
        Self::SetNextScenario,
        Self::SetDoodadState,
        Self::SetInvincibility,
        Self::CreateUnit,
        Self::SetDeaths,
        Self::IssueOrder,
        Self::Comment,
        Self::GiveUnit,
        Self::SetUnitHp,
        Self::SetUnitEnergy,
        Self::SetUnitShields,
        Self::SetUnitResource,
        Self::SetUnitHangar,
        Self::PauseCountdownTimer,
        Self::UnpauseCountdownTimer,
        Self::Draw,
        Self::SetAlliance,
        Self::DisableDebug,
        Self::EnableDebug,
    ];

    pub fn from_u8(v: u8) -> Option<Self> {
        Self::ALL.get(v as usize).copied()
    }
}

bitflags! {
    /// Which parameters a condition opcode uses
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ConditionFields: u32 {
        const LOCATION = 0x1;
        const PLAYER = 0x2;
        /// Amount and comparison
        const AMOUNT = 0x4;
        const UNIT = 0x8;
        /// Switch id and switch state
        const SWITCH = 0x10;
        const RESOURCE = 0x20;
        const SCORE = 0x40;
    }
}

bitflags! {
    /// Which parameters an action opcode uses
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ActionFields: u32 {
        const LOCATION = 0x1;
        const DEST_LOCATION = 0x2;
        const PLAYER = 0x4;
        const DEST_PLAYER = 0x8;
        const TIME = 0x10;
        const MODIFIER = 0x20;
        const UNIT = 0x40;
        const ORDER = 0x80;
        const ALLIANCE = 0x100;
        /// Switch id and switch state
        const SWITCH = 0x200;
        const RESOURCE = 0x400;
        const SCORE = 0x800;
        /// Amount stored where countdown actions keep their time
        const COUNTDOWN_AMOUNT = 0x1000;
        const AMOUNT = 0x2000;
        const UNIT_AMOUNT = 0x4000;
        const AI_SCRIPT = 0x8000;
        const TEXT = 0x10000;
        const SOUND_FILE = 0x20000;
        const STATE = 0x40000;
        const MOVED_LOCATION = 0x80000;
        const ALWAYS_DISPLAY = 0x100000;
    }
}

/// Indexed by condition id - 1
const CONDITION_FIELDS: [u32; 21] = [
    0x4,  // CountdownTimer
    0xe,  // Command
    0xf,  // Bring
    0x26, // Accumulate
    0xe,  // Kill
    // Most/least conditions always apply to the current player
    0x8,  // CommandMost
    0x9,  // CommandMostAt
    0x8,  // MostKills
    0x40, // HighestScore
    0x20, // MostResources
    0x10, // Switch
    0x4,  // ElapsedTime
    0x0,  // MissionBriefing
    0x6,  // Opponents
    0xe,  // Deaths
    0x8,  // CommandLeast
    0x9,  // CommandLeastAt
    0x8,  // LeastKills
    0x40, // LowestScore
    0x20, // LeastResources
    0x46, // Score
];

/// Indexed by action id - 1
const ACTION_FIELDS: [u32; 57] = [
    0x0,      // Victory
    0x0,      // Defeat
    0x0,      // PreserveTrigger
    0x10,     // Wait
    0x0,      // Pause
    0x0,      // Unpause
    0x132071, // Transmission
    0x20010,  // PlayWav
    0x110000, // DisplayText
    0x1,      // CenterView
    0x4045,   // CreateUnitWithProperties
    0x10000,  // SetMissionObjectives
    0x200,    // SetSwitch
    0x1020,   // SetCountdownTimer
    0x8000,   // RunAiScript
    0x8001,   // RunAiScriptAtLocation
    0x10040,  // LeaderboardControl
    0x10041,  // LeaderboardControlAtLocation
    0x10400,  // LeaderboardResources
    0x10040,  // LeaderboardKills
    0x10800,  // LeaderboardPoints
    0x44,     // KillUnit
    0x4045,   // KillUnitAtLocation
    0x44,     // RemoveUnit
    0x4045,   // RemoveUnitAtLocation
    0x2424,   // SetResources
    0x2824,   // SetScore
    0x1,      // MinimapPing
    0x50,     // TalkingPortrait
    0x0,      // MuteUnitSpeech
    0x0,      // UnmuteUnitSpeech
    0x40000,  // LeaderboardComputers
    0x12040,  // LeaderboardGoalControl
    0x12041,  // LeaderboardGoalControlAtLocation
    0x12400,  // LeaderboardGoalResources
    0x12040,  // LeaderboardGoalKills
    0x12800,  // LeaderboardGoalPoints
    0x80045,  // MoveLocation
    0x4047,   // MoveUnit
    0x2000,   // LeaderboardGreed
    0x10000,  // SetNextScenario
    0x40045,  // SetDoodadState
    0x40045,  // SetInvincibility
    0x4045,   // CreateUnit
    0x2064,   // SetDeaths
    0xc7,     // IssueOrder
    0x10000,  // Comment
    0x404d,   // GiveUnit
    0x6045,   // SetUnitHp
    0x6045,   // SetUnitEnergy
    0x6045,   // SetUnitShields
    0x6005,   // SetUnitResource
    0x6045,   // SetUnitHangar
    0x0,      // PauseCountdownTimer
    0x0,      // UnpauseCountdownTimer
    0x0,      // Draw
    0x104,    // SetAlliance
];

impl ConditionFields {
    /// Mask for a raw condition id; unknown ids use no parameters
    pub fn for_id(id: u8) -> Self {
        let bits = (id as usize)
            .checked_sub(1)
            .and_then(|i| CONDITION_FIELDS.get(i))
            .copied()
            .unwrap_or(0);
        Self::from_bits_retain(bits)
    }
}

impl ActionFields {
    /// Mask for a raw action id; unknown ids use no parameters
    pub fn for_id(id: u8) -> Self {
        let bits = (id as usize)
            .checked_sub(1)
            .and_then(|i| ACTION_FIELDS.get(i))
            .copied()
            .unwrap_or(0);
        Self::from_bits_retain(bits)
    }
}
