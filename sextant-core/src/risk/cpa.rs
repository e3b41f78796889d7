//! CPA/TCPA by simulating both tracks
//!
//! Own ship and target are dead reckoned over the same window at the same
//! step, and the sample with the smallest separation is the closest point of
//! approach. When that sample is at either end of the window the real
//! minimum may be outside it, and the result is `Unknown` rather than a
//! bounded but wrong CPA.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::params::TrackEstimationParameters;
use super::track::get_estimated_track;
use crate::navigation::{dist_and_bearing, normalize_180};
use crate::targets::{AisTarget, TargetRegistry};

/// TCPA values down to this many seconds in the past still count as dangerous
const RECENT_CPA_SECONDS: f64 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
pub enum SafetyState {
    Safe,
    Unknown,
    Dangerous,
    Lost,
}

/// Where a target is relative to the own ship
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipRelativePosition {
    pub from: u32,
    pub to: u32,
    /// Meters, now
    pub distance: f64,
    /// Degrees true from own ship to target, now
    pub bearing: f64,
    /// Bearing relative to own heading, (-180, 180]
    pub relative_direction: Option<f64>,
    /// Closest point of approach in meters
    pub cpa: Option<f64>,
    /// Seconds until the closest point of approach, negative if passed
    pub tcpa: Option<f64>,
    pub time_of_cpa: Option<DateTime<Utc>>,
    pub safety_state: SafetyState,
}

/// Position and collision risk of `other` seen from `own`.
///
/// `None` if either position is unknown.
pub fn relative_position(
    own: &AisTarget,
    other: &AisTarget,
    now: DateTime<Utc>,
    params: &TrackEstimationParameters,
) -> Option<ShipRelativePosition> {
    let own_position = own.position?;
    let other_position = other.position?;
    let (distance, bearing) = dist_and_bearing(&own_position, &other_position);

    let mut result = ShipRelativePosition {
        from: own.mmsi,
        to: other.mmsi,
        distance,
        bearing,
        relative_direction: own.true_heading().map(|h| normalize_180(bearing - h)),
        cpa: None,
        tcpa: None,
        time_of_cpa: None,
        safety_state: SafetyState::Safe,
    };

    let lost = other
        .last_seen
        .map_or(true, |seen| {
            seen.checked_add_signed(params.lost_timeout())
                .map_or(false, |until| until < now)
        });
    if lost {
        result.safety_state = SafetyState::Lost;
        return Some(result);
    }

    if !other.is_moving_kind() {
        if distance < params.warning_distance {
            result.safety_state = SafetyState::Dangerous;
        }
        return Some(result);
    }

    let start = now - params.start_offset();
    let end = now + params.end_offset();
    let step = params.step();
    let own_track = get_estimated_track(own, start, end, step);
    let other_track = get_estimated_track(other, start, end, step);

    let mut samples = 0usize;
    let mut closest: Option<(usize, f64)> = None;
    for (i, (a, b)) in own_track.zip(other_track).enumerate() {
        let (Some(pa), Some(pb)) = (a.position, b.position) else {
            continue;
        };
        let (d, _) = dist_and_bearing(&pa, &pb);
        samples = i + 1;
        if closest.map_or(true, |(_, best)| d < best) {
            closest = Some((i, d));
        }
    }

    match closest {
        Some((i, cpa)) if i > 0 && i + 1 < samples => {
            let time = start + step * i as i32;
            let tcpa = (time - now).num_milliseconds() as f64 / 1000.0;
            result.cpa = Some(cpa);
            result.tcpa = Some(tcpa);
            result.time_of_cpa = Some(time);
            let dangerous = cpa < params.warning_distance
                && tcpa > -RECENT_CPA_SECONDS
                && tcpa <= params.warning_time;
            if dangerous {
                result.safety_state = SafetyState::Dangerous;
            }
        }
        _ => result.safety_state = SafetyState::Unknown,
    }
    Some(result)
}

/// Relative positions of all targets, closest CPA first.
///
/// Targets without a CPA follow, ordered by current distance.
pub fn relative_positions(
    registry: &TargetRegistry,
    now: DateTime<Utc>,
    params: &TrackEstimationParameters,
) -> Vec<ShipRelativePosition> {
    let own = registry.own_ship();
    let mut positions: Vec<ShipRelativePosition> = registry
        .targets()
        .iter()
        .filter_map(|target| relative_position(&own, target, now, params))
        .collect();
    positions.sort_by(|a, b| match (a.cpa, b.cpa) {
        (Some(x), Some(y)) => x.total_cmp(&y).then(a.distance.total_cmp(&b.distance)),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.distance.total_cmp(&b.distance),
    });
    positions
}
