//! Dead reckoning of moving targets

use chrono::{DateTime, TimeDelta, Utc};

use crate::navigation::{destination, normalize_360, KN_TO_MS};
use crate::targets::AisTarget;

fn as_seconds(d: TimeDelta) -> f64 {
    d.num_milliseconds() as f64 / 1000.0
}

/// One dead reckoning step of `dt` seconds (negative steps go back in time)
fn step(target: &mut AisTarget, course: &mut f64, speed_ms: f64, rate: Option<f64>, dt: f64) {
    let Some(position) = target.position else {
        return;
    };
    let turn = rate.map(|r| r / 60.0 * dt).unwrap_or(0.0);
    if dt >= 0.0 {
        *course = normalize_360(*course + turn);
        target.position = Some(destination(&position, *course, speed_ms * dt));
    } else {
        // Inverse of the forward step: move first, then undo the turn
        target.position = Some(destination(&position, *course, speed_ms * dt));
        *course = normalize_360(*course + turn);
    }
}

/// Extrapolate `target` by `delta` using steps of at most `step_size`.
///
/// Each step first turns by the rate of turn, then moves along the great
/// circle. The last step is shortened so the result is exactly `delta`
/// away. Targets without position, course or speed only get their
/// timestamp shifted.
pub fn estimate_position(target: &AisTarget, delta: TimeDelta, step_size: TimeDelta) -> AisTarget {
    let mut estimate = target.clone();
    estimate.last_seen = target.last_seen.map(|t| t + delta);

    let (Some(mut course), Some(speed)) = (target.course_over_ground(), target.speed_over_ground())
    else {
        return estimate;
    };
    if !target.is_moving_kind() || target.position.is_none() || delta.is_zero() {
        return estimate;
    }

    let speed_ms = speed * KN_TO_MS;
    let rate = target.rate_of_turn();
    let total = as_seconds(delta);
    let step_len = as_seconds(step_size).abs();
    let sign = total.signum();

    if step_len <= 0.0 {
        step(&mut estimate, &mut course, speed_ms, rate, total);
    } else {
        let full_steps = (total.abs() / step_len).floor() as u64;
        for _ in 0..full_steps {
            step(&mut estimate, &mut course, speed_ms, rate, sign * step_len);
        }
        let remainder = total.abs() - full_steps as f64 * step_len;
        if remainder > 1e-9 {
            step(&mut estimate, &mut course, speed_ms, rate, sign * remainder);
        }
    }

    estimate.set_course_over_ground(course);
    estimate
}

/// Snapshots of a target at `start`, `start + step`, ... up to `end`.
///
/// A clone continues independently from the same point, and a fresh call
/// with the same arguments yields the same sequence.
#[derive(Debug, Clone)]
pub struct EstimatedTrack {
    current: Option<AisTarget>,
    time: DateTime<Utc>,
    end: DateTime<Utc>,
    step: TimeDelta,
}

impl Iterator for EstimatedTrack {
    type Item = AisTarget;

    fn next(&mut self) -> Option<AisTarget> {
        if self.time > self.end {
            return None;
        }
        let snapshot = self.current.take()?;
        if self.step > TimeDelta::zero() {
            self.current = Some(estimate_position(&snapshot, self.step, self.step));
            self.time += self.step;
        }
        Some(snapshot)
    }
}

/// Estimated track between `start` and `end`.
///
/// Times are relative to the target's `last_seen`; a target that was never
/// seen is taken to be at its position at `start`.
pub fn get_estimated_track(
    target: &AisTarget,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    step_size: TimeDelta,
) -> EstimatedTrack {
    let mut anchored = target.clone();
    let reference = *anchored.last_seen.get_or_insert(start);
    EstimatedTrack {
        current: Some(estimate_position(&anchored, start - reference, step_size)),
        time: start,
        end,
        step: step_size,
    }
}
