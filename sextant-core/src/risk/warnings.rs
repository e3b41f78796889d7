//! Collision warning bookkeeping and warning text

use std::collections::HashMap;

use chrono::{DateTime, TimeDelta, Utc};

use super::cpa::ShipRelativePosition;
use crate::navigation::NAUTICAL_MILE;
use crate::protocol::messages::MAX_SAFETY_BROADCAST_CHARS;
use crate::protocol::payload::SIXBIT_ASCII;

/// Rate limits warnings per MMSI
#[derive(Debug, Clone)]
pub struct WarningThrottle {
    repeat: TimeDelta,
    last_warned: HashMap<u32, DateTime<Utc>>,
}

impl WarningThrottle {
    pub fn new(repeat: TimeDelta) -> Self {
        WarningThrottle {
            repeat,
            last_warned: HashMap::new(),
        }
    }

    fn suppresses(repeat: TimeDelta, last: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        last.checked_add_signed(repeat).map_or(true, |until| now < until)
    }

    /// True if a warning for `mmsi` should be raised now; records it if so.
    pub fn should_warn(&mut self, mmsi: u32, now: DateTime<Utc>) -> bool {
        match self.last_warned.get(&mmsi) {
            Some(&last) if Self::suppresses(self.repeat, last, now) => false,
            _ => {
                self.last_warned.insert(mmsi, now);
                true
            }
        }
    }

    /// Forget a target, so its next danger warns immediately
    pub fn clear(&mut self, mmsi: u32) {
        self.last_warned.remove(&mmsi);
    }

    /// Drop entries that could no longer suppress anything
    pub fn expire(&mut self, now: DateTime<Utc>) {
        let repeat = self.repeat;
        self.last_warned
            .retain(|_, last| Self::suppresses(repeat, *last, now));
    }

    pub fn len(&self) -> usize {
        self.last_warned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_warned.is_empty()
    }
}

fn to_ais_text(text: &str) -> String {
    text.chars()
        .map(|c| c.to_ascii_uppercase())
        .map(|c| {
            // '@' is the padding character and would truncate the text
            if c != '@' && c.is_ascii() && SIXBIT_ASCII.contains(&(c as u8)) {
                c
            } else {
                ' '
            }
        })
        .collect()
}

/// Warning text for a type 14 safety broadcast.
///
/// `name` is the display name of the target. The result only uses the AIS
/// character set and fits a single safety broadcast.
pub fn warning_text(name: &str, relative: &ShipRelativePosition) -> String {
    let mut text = format!("COLLISION WARNING {}", name);
    if let Some(cpa) = relative.cpa {
        text.push_str(&format!(" CPA {:.2} NM", cpa / NAUTICAL_MILE));
    }
    if let Some(tcpa) = relative.tcpa {
        text.push_str(&format!(" IN {:.0} MIN", (tcpa / 60.0).max(0.0)));
    }
    if relative.cpa.is_none() {
        text.push_str(&format!(" DIST {:.2} NM", relative.distance / NAUTICAL_MILE));
    }
    to_ais_text(&text)
        .chars()
        .take(MAX_SAFETY_BROADCAST_CHARS)
        .collect()
}
