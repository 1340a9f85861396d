use serde::{Deserialize, Serialize};

use crate::models::WorkProject;
use crate::rounding::{RoundingConfig, RoundingDirection};

pub const DEFAULT_ROUND_IN_TIME_FRAGMENTS: bool = false;
pub const DEFAULT_TIME_FRAGMENT_INTERVAL: u32 = 15;
pub const DEFAULT_ROUNDING_INTERVAL: u32 = 0;
pub const DEFAULT_ROUNDING_DIRECTION: RoundingDirection = RoundingDirection::Nearest;

/// User-wide timer preferences. Unset values fall back to the defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub round_in_time_fragments: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_fragment_interval: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rounding_interval: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rounding_direction: Option<RoundingDirection>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerRoundingSettings {
    pub round_in_time_fragments: bool,
    pub time_fragment_interval: u32,
    pub rounding_interval: u32,
    pub rounding_direction: RoundingDirection,
}

impl Default for TimerRoundingSettings {
    fn default() -> Self {
        Self {
            round_in_time_fragments: DEFAULT_ROUND_IN_TIME_FRAGMENTS,
            time_fragment_interval: DEFAULT_TIME_FRAGMENT_INTERVAL,
            rounding_interval: DEFAULT_ROUNDING_INTERVAL,
            rounding_direction: DEFAULT_ROUNDING_DIRECTION,
        }
    }
}

impl TimerRoundingSettings {
    pub fn rounding(&self) -> RoundingConfig {
        RoundingConfig {
            interval_minutes: self.rounding_interval,
            direction: self.rounding_direction,
        }
    }
}

/// Project override, then global setting, then built-in default, field by field.
pub fn resolve_rounding_settings(
    project: &WorkProject,
    global: &GlobalSettings,
) -> TimerRoundingSettings {
    TimerRoundingSettings {
        round_in_time_fragments: project
            .round_in_time_fragments
            .or(global.round_in_time_fragments)
            .unwrap_or(DEFAULT_ROUND_IN_TIME_FRAGMENTS),
        time_fragment_interval: project
            .time_fragment_interval
            .or(global.time_fragment_interval)
            .unwrap_or(DEFAULT_TIME_FRAGMENT_INTERVAL),
        rounding_interval: project
            .rounding_interval
            .or(global.rounding_interval)
            .unwrap_or(DEFAULT_ROUNDING_INTERVAL),
        rounding_direction: project
            .rounding_direction
            .or(global.rounding_direction)
            .unwrap_or(DEFAULT_ROUNDING_DIRECTION),
    }
}
