//! Periodic collision check.
//!
//! Every `checkInterval` seconds the watch computes the relative position of
//! all targets. Dangerous targets are logged (and optionally broadcast as a
//! type 14 safety message on stdout), at most once per
//! `warningRepeatTimeout` per target.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sextant_core::protocol::messages::SafetyBroadcastMessage;
use sextant_core::risk::{relative_positions, warning_text};
use sextant_core::{
    AisError, AisMessage, MessageFactory, SafetyState, TargetRegistry, TrackEstimationParameters,
    WarningThrottle,
};
use thiserror::Error;
use tokio::task::{spawn_blocking, JoinError};
use tokio::time::{interval, MissedTickBehavior};
use tokio_graceful_shutdown::SubsystemHandle;

#[derive(Error, Debug)]
pub enum WatchError {
    #[error("Collision check failed: {0}")]
    Check(#[from] JoinError),
}

pub struct CollisionWatch {
    registry: Arc<TargetRegistry>,
    params: TrackEstimationParameters,
    throttle: WarningThrottle,
    factory: MessageFactory,
    send_warnings: bool,
    sequence_id: u8,
}

impl CollisionWatch {
    pub fn new(registry: Arc<TargetRegistry>, params: TrackEstimationParameters, send_warnings: bool) -> Self {
        CollisionWatch {
            registry,
            throttle: WarningThrottle::new(params.repeat_timeout()),
            params,
            factory: MessageFactory::default(),
            send_warnings,
            sequence_id: 0,
        }
    }

    fn next_sequence_id(&mut self) -> u8 {
        let id = self.sequence_id;
        self.sequence_id = (self.sequence_id + 1) % 10;
        id
    }

    fn warning_sentences(&mut self, text: &str) -> Result<Vec<String>, AisError> {
        let own_mmsi = self.registry.own_mmsi().unwrap_or(0);
        let message = AisMessage::SafetyBroadcastMessage(SafetyBroadcastMessage::new(own_mmsi, text));
        let sequence_id = self.next_sequence_id();
        self.factory
            .encode_sentences(&message, None, Some(sequence_id), true)
    }

    /// Run one check at `now`.
    ///
    /// Returns the `!AIVDO` sentences to send, empty unless warnings are
    /// enabled.
    pub fn check(&mut self, now: DateTime<Utc>) -> Vec<String> {
        if self.registry.own_ship().position.is_none() {
            log::debug!("Own position unknown, no collision check");
            return Vec::new();
        }

        let mut sentences = Vec::new();
        for relative in relative_positions(&self.registry, now, &self.params) {
            match relative.safety_state {
                SafetyState::Dangerous => {
                    if !self.throttle.should_warn(relative.to, now) {
                        continue;
                    }
                    let name = self
                        .registry
                        .target(relative.to)
                        .map(|t| t.display_name())
                        .unwrap_or_else(|| relative.to.to_string());
                    let text = warning_text(&name, &relative);
                    log::warn!("{}", text);
                    if self.send_warnings {
                        match self.warning_sentences(&text) {
                            Ok(mut s) => sentences.append(&mut s),
                            Err(e) => log::error!("Cannot encode warning: {}", e),
                        }
                    }
                }
                SafetyState::Safe => self.throttle.clear(relative.to),
                SafetyState::Unknown | SafetyState::Lost => {}
            }
        }
        self.throttle.expire(now);
        sentences
    }

    /// Run `check` on the blocking pool, handing the watch back afterwards
    pub async fn check_blocking(
        mut self,
        now: DateTime<Utc>,
    ) -> Result<(Self, Vec<String>), JoinError> {
        spawn_blocking(move || {
            let sentences = self.check(now);
            (self, sentences)
        })
        .await
    }

    pub async fn run(self, subsys: SubsystemHandle) -> Result<(), WatchError> {
        log::info!(
            "Collision watch every {:?}, warning below {:.0} m within {:.0} s",
            self.params.check_period(),
            self.params.warning_distance,
            self.params.warning_time
        );
        let mut timer = interval(self.params.check_period());
        timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut watch = self;
        loop {
            tokio::select! {
                _ = subsys.on_shutdown_requested() => {
                    log::info!("CollisionWatch: shutdown");
                    return Ok(());
                }
                _ = timer.tick() => {
                    let (w, sentences) = watch.check_blocking(Utc::now()).await?;
                    watch = w;
                    for sentence in sentences {
                        println!("{}", sentence);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone};
    use sextant_core::navigation::{destination, NAUTICAL_MILE};
    use sextant_core::targets::ShipData;
    use sextant_core::{AisSentence, AisTarget, GeoPosition, OwnShipFix, TargetKind};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn registry() -> Arc<TargetRegistry> {
        let registry = Arc::new(TargetRegistry::with_own_mmsi(244_000_001));
        let origin = GeoPosition::new(54.0, 10.0);
        registry.update_own_ship(&OwnShipFix {
            position: origin,
            course_over_ground: Some(0.0),
            speed_over_ground: Some(10.0),
            true_heading: Some(0.0),
            timestamp: now(),
        });
        let mut other = AisTarget::with_kind(
            244_000_002,
            TargetKind::Ship(ShipData {
                course_over_ground: Some(180.0),
                speed_over_ground: Some(10.0),
                ..Default::default()
            }),
        );
        other.name = Some("Ever Diadem".to_string());
        other.position = Some(destination(&origin, 0.0, 2.0 * NAUTICAL_MILE));
        other.last_seen = Some(now());
        registry.insert(other);
        registry
    }

    #[test]
    fn test_warns_once_per_repeat_interval() {
        let mut watch = CollisionWatch::new(registry(), TrackEstimationParameters::default(), true);
        let sentences = watch.check(now());
        assert!(!sentences.is_empty());
        assert!(sentences.iter().all(|s| s.starts_with("!AIVDO,")));

        let first = AisSentence::parse(&sentences[0], now()).unwrap();
        assert!(first.own_ship);

        assert!(watch.check(now() + TimeDelta::seconds(5)).is_empty());
    }

    #[test]
    fn test_warning_decodes_back() {
        let mut watch = CollisionWatch::new(registry(), TrackEstimationParameters::default(), true);
        let sentences = watch.check(now());
        let pipeline = sextant_core::AisPipeline::new(
            MessageFactory::default(),
            Arc::new(TargetRegistry::new()),
        );
        let decoded: Vec<_> = sentences
            .iter()
            .filter_map(|s| pipeline.process_line(s, now()).unwrap())
            .collect();
        assert_eq!(decoded.len(), 1);
        let AisMessage::SafetyBroadcastMessage(m) = &decoded[0] else {
            panic!("unexpected {:?}", decoded[0]);
        };
        assert_eq!(m.header.mmsi, 244_000_001);
        assert!(m.text.starts_with("COLLISION WARNING EVER DIADEM CPA"));
    }

    #[test]
    fn test_no_sentences_when_disabled() {
        let mut watch = CollisionWatch::new(registry(), TrackEstimationParameters::default(), false);
        assert!(watch.check(now()).is_empty());
        // The warning was still raised and is throttled
        assert_eq!(watch.throttle.len(), 1);
    }

    #[tokio::test]
    async fn test_check_on_blocking_pool_keeps_state() {
        let watch = CollisionWatch::new(registry(), TrackEstimationParameters::default(), true);
        let (watch, sentences) = watch.check_blocking(now()).await.unwrap();
        assert!(!sentences.is_empty());
        assert_eq!(watch.throttle.len(), 1);
        let (_, sentences) = watch.check_blocking(now() + TimeDelta::seconds(5)).await.unwrap();
        assert!(sentences.is_empty());
    }

    #[test]
    fn test_no_check_without_own_position() {
        let registry = Arc::new(TargetRegistry::new());
        let mut watch = CollisionWatch::new(registry, TrackEstimationParameters::default(), true);
        assert!(watch.check(now()).is_empty());
    }
}
