use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::navigation::NAUTICAL_MILE;

/// Collision risk settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrackEstimationParameters {
    /// Seconds simulated before `now`
    pub start_time_offset: f64,
    /// Seconds simulated after `now`
    pub end_time_offset: f64,
    /// Simulation step in seconds
    pub normal_step_size: f64,
    /// CPA below this many meters is dangerous
    pub warning_distance: f64,
    /// TCPA up to this many seconds ahead is dangerous
    pub warning_time: f64,
    /// Seconds without a message before a target is lost
    pub target_lost_timeout: f64,
    /// Seconds before a warning for the same target is repeated
    pub warning_repeat_timeout: f64,
    /// Seconds between two collision checks
    pub check_interval: f64,
}

impl Default for TrackEstimationParameters {
    fn default() -> Self {
        TrackEstimationParameters {
            start_time_offset: 1200.0,   // 20 minutes
            end_time_offset: 3600.0,     // 1 hour
            normal_step_size: 10.0,
            warning_distance: NAUTICAL_MILE,
            warning_time: 600.0,         // 10 minutes
            target_lost_timeout: 600.0,
            warning_repeat_timeout: 600.0,
            check_interval: 5.0,
        }
    }
}

/// Longest time span any setting may express, about 100 years
pub const MAX_SECONDS: f64 = 100.0 * 365.0 * 86400.0;

/// Seconds as a `TimeDelta`, clamped to `±MAX_SECONDS`
pub(crate) fn seconds(s: f64) -> TimeDelta {
    TimeDelta::milliseconds((s.clamp(-MAX_SECONDS, MAX_SECONDS) * 1000.0).round() as i64)
}

impl TrackEstimationParameters {
    pub fn start_offset(&self) -> TimeDelta {
        seconds(self.start_time_offset)
    }

    pub fn end_offset(&self) -> TimeDelta {
        seconds(self.end_time_offset)
    }

    pub fn step(&self) -> TimeDelta {
        seconds(self.normal_step_size)
    }

    pub fn lost_timeout(&self) -> TimeDelta {
        seconds(self.target_lost_timeout)
    }

    pub fn repeat_timeout(&self) -> TimeDelta {
        seconds(self.warning_repeat_timeout)
    }

    pub fn check_period(&self) -> std::time::Duration {
        let s = if self.check_interval.is_nan() {
            0.1
        } else {
            self.check_interval.clamp(0.1, MAX_SECONDS)
        };
        std::time::Duration::from_secs_f64(s)
    }
}
