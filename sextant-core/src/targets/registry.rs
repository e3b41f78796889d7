//! MMSI keyed store of targets, updated from decoded messages

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::target::{AisTarget, TargetKind};
use crate::navigation::GeoPosition;
use crate::protocol::messages::{
    AisMessage, PositionReport, StaticDataReportPart, TransceiverClass,
};

/// Own position from the vessel's GNSS feed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnShipFix {
    pub position: GeoPosition,
    pub course_over_ground: Option<f64>,
    pub speed_over_ground: Option<f64>,
    pub true_heading: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug)]
struct RegistryInner {
    targets: HashMap<u32, AisTarget>,
    own_ship: AisTarget,
    own_mmsi_known: bool,
}

impl RegistryInner {
    fn is_own(&self, mmsi: u32) -> bool {
        self.own_mmsi_known && self.own_ship.mmsi == mmsi
    }

    fn get_or_create(&mut self, mmsi: u32) -> &mut AisTarget {
        if self.is_own(mmsi) {
            return &mut self.own_ship;
        }
        self.targets.entry(mmsi).or_insert_with(|| {
            log::debug!("New target {}", mmsi);
            AisTarget::new(mmsi)
        })
    }

    fn set_own_mmsi(&mut self, mmsi: u32) {
        if self.is_own(mmsi) {
            return;
        }
        if self.own_mmsi_known {
            log::debug!(
                "Own ship MMSI changes from {} to {}, previous fix dropped",
                self.own_ship.mmsi,
                mmsi
            );
        }
        let own = self.targets.remove(&mmsi).unwrap_or_else(|| {
            let mut t = self.own_ship.clone();
            t.mmsi = mmsi;
            t
        });
        self.own_ship = own;
        self.own_mmsi_known = true;
        log::info!("Own ship MMSI is {}", mmsi);
    }
}

/// Thread-safe target store.
///
/// Mutation and get-or-create go through one mutex; readers only ever get
/// cloned snapshots. The own ship lives outside the target list.
#[derive(Debug)]
pub struct TargetRegistry {
    inner: Mutex<RegistryInner>,
}

impl Default for TargetRegistry {
    fn default() -> Self {
        TargetRegistry::new()
    }
}

impl TargetRegistry {
    pub fn new() -> Self {
        TargetRegistry {
            inner: Mutex::new(RegistryInner {
                targets: HashMap::new(),
                own_ship: AisTarget::with_kind(0, TargetKind::Ship(Default::default())),
                own_mmsi_known: false,
            }),
        }
    }

    pub fn with_own_mmsi(mmsi: u32) -> Self {
        let registry = TargetRegistry::new();
        registry.lock().set_own_mmsi(mmsi);
        registry
    }

    fn lock(&self) -> MutexGuard<'_, RegistryInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn own_mmsi(&self) -> Option<u32> {
        let inner = self.lock();
        inner.own_mmsi_known.then_some(inner.own_ship.mmsi)
    }

    pub fn set_own_mmsi(&self, mmsi: u32) {
        self.lock().set_own_mmsi(mmsi);
    }

    /// Snapshot of the target for `mmsi`, created if it does not exist yet
    pub fn get_or_create(&self, mmsi: u32) -> AisTarget {
        self.lock().get_or_create(mmsi).clone()
    }

    /// Snapshot of one target, the own ship included
    pub fn target(&self, mmsi: u32) -> Option<AisTarget> {
        let inner = self.lock();
        if inner.is_own(mmsi) {
            return Some(inner.own_ship.clone());
        }
        inner.targets.get(&mmsi).cloned()
    }

    /// Snapshot of all targets except the own ship
    pub fn targets(&self) -> Vec<AisTarget> {
        self.lock().targets.values().cloned().collect()
    }

    /// Store a complete target, replacing any existing one with its MMSI
    pub fn insert(&self, target: AisTarget) {
        let mut inner = self.lock();
        if inner.is_own(target.mmsi) {
            inner.own_ship = target;
        } else {
            inner.targets.insert(target.mmsi, target);
        }
    }

    pub fn own_ship(&self) -> AisTarget {
        self.lock().own_ship.clone()
    }

    pub fn len(&self) -> usize {
        self.lock().targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Apply a GNSS fix to the own ship
    pub fn update_own_ship(&self, fix: &OwnShipFix) {
        let mut inner = self.lock();
        let own = &mut inner.own_ship;
        own.position = Some(fix.position);
        own.last_seen = Some(fix.timestamp);
        own.update_ship(|s| {
            s.course_over_ground = fix.course_over_ground;
            s.speed_over_ground = fix.speed_over_ground;
            if fix.true_heading.is_some() {
                s.true_heading = fix.true_heading;
            }
        });
    }

    /// Route one message to its target.
    ///
    /// `own_ship` marks messages received as `!AIVDO`; the first one also
    /// teaches the registry its own MMSI. Returns a snapshot of the updated
    /// target, or `None` for message kinds that do not describe a station.
    pub fn update(
        &self,
        message: &AisMessage,
        own_ship: bool,
        received: DateTime<Utc>,
    ) -> Option<AisTarget> {
        let mmsi = message.mmsi();
        let mut inner = self.lock();
        if own_ship {
            inner.set_own_mmsi(mmsi);
        }

        let class = message.transceiver_class();
        let routed = match message {
            AisMessage::PositionReportClassA(_)
            | AisMessage::StandardClassBPositionReport(_)
            | AisMessage::LongRangePositionReport(_)
            | AisMessage::ExtendedClassBPositionReport(_)
            | AisMessage::BaseStationReport(_)
            | AisMessage::StaticAndVoyageData(_)
            | AisMessage::StaticDataReport(_)
            | AisMessage::AidToNavigationReport(_)
            | AisMessage::SarAircraftPositionReport(_) => true,
            _ => false,
        };
        if !routed {
            return None;
        }

        let target = inner.get_or_create(mmsi);
        target.last_seen = Some(received);

        match message {
            AisMessage::SarAircraftPositionReport(m) => {
                if let Some(position) = m.position() {
                    target.position = Some(position);
                }
                target.update_sar(|s| {
                    s.speed_over_ground = m.speed_over_ground();
                    s.course_over_ground = m.course_over_ground();
                    s.altitude = m.altitude_meters();
                });
            }
            AisMessage::BaseStationReport(m) => {
                if let Some(position) = m.position() {
                    target.position = Some(position);
                }
                // Type 11 is a mobile station answering a UTC inquiry
                if m.header.message_type == 4 {
                    target.make_base_station();
                }
            }
            AisMessage::AidToNavigationReport(m) => {
                if let Some(position) = m.position() {
                    target.position = Some(position);
                }
                if !m.name.is_empty() {
                    target.name = Some(m.name.clone());
                }
                target.update_aton(|a| {
                    a.navaid_type = Some(m.aid_type);
                    a.dimensions = Some(m.dimensions);
                    a.off_position = m.off_position;
                    a.virtual_aid = m.virtual_aid;
                });
            }
            AisMessage::StaticAndVoyageData(m) => {
                if !m.ship_name.is_empty() {
                    target.name = Some(m.ship_name.clone());
                }
                target.update_ship(|s| {
                    s.call_sign = non_empty(&m.call_sign);
                    s.imo_number = (m.imo_number != 0).then_some(m.imo_number);
                    s.ship_type = Some(m.ship_type);
                    s.dimensions = Some(m.dimensions);
                    s.draught = (m.draught > 0.0).then_some(m.draught);
                    s.destination = non_empty(&m.destination);
                    s.transceiver_class = Some(class);
                });
            }
            AisMessage::StaticDataReport(m) => match &m.part {
                StaticDataReportPart::A { ship_name } => {
                    if !ship_name.is_empty() {
                        target.name = Some(ship_name.clone());
                    }
                    target.update_ship(|s| s.transceiver_class = Some(class));
                }
                StaticDataReportPart::B {
                    ship_type,
                    call_sign,
                    dimensions,
                    ..
                } => target.update_ship(|s| {
                    s.ship_type = Some(*ship_type);
                    s.call_sign = non_empty(call_sign);
                    if dimensions.is_some() {
                        s.dimensions = *dimensions;
                    }
                    s.transceiver_class = Some(class);
                }),
            },
            _ => {
                if let Some(report) = message.position_report() {
                    update_ship_kinematics(target, report, class);
                }
                match message {
                    AisMessage::PositionReportClassA(m) => {
                        target.update_ship(|s| s.navigation_status = Some(m.navigation_status))
                    }
                    AisMessage::LongRangePositionReport(m) => {
                        target.update_ship(|s| s.navigation_status = Some(m.navigation_status))
                    }
                    AisMessage::ExtendedClassBPositionReport(m) => {
                        if !m.ship_name.is_empty() {
                            target.name = Some(m.ship_name.clone());
                        }
                        target.update_ship(|s| {
                            s.ship_type = Some(m.ship_type);
                            s.dimensions = Some(m.dimensions);
                        });
                    }
                    _ => {}
                }
            }
        }
        Some(target.clone())
    }
}

fn update_ship_kinematics(target: &mut AisTarget, report: &dyn PositionReport, class: TransceiverClass) {
    if let Some(position) = report.position() {
        target.position = Some(position);
    }
    target.update_ship(|s| {
        s.course_over_ground = report.course_over_ground();
        s.speed_over_ground = report.speed_over_ground();
        s.true_heading = report.true_heading();
        s.rate_of_turn = report.rate_of_turn();
        s.transceiver_class = Some(class);
    });
}

fn non_empty(text: &str) -> Option<String> {
    (!text.is_empty()).then(|| text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::messages::{MessageFactory, NavigationStatus, SafetyBroadcastMessage};
    use crate::protocol::payload::Payload;
    use chrono::TimeZone;

    fn message(armored: &str, fill: u8) -> AisMessage {
        let payload = Payload::from_armored(armored, fill).unwrap();
        MessageFactory::default().decode(&payload).unwrap().unwrap()
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_get_or_create_is_idempotent() {
        let r = TargetRegistry::new();
        let a = r.get_or_create(244_000_001);
        let b = r.get_or_create(244_000_001);
        assert_eq!(a, b);
        assert_eq!(r.len(), 1);
    }

    #[test]
    fn test_position_report_updates_ship() {
        let r = TargetRegistry::new();
        let t = r
            .update(&message("15M67FC000G?ufbE`FepT@3n00Sa", 0), false, t0())
            .unwrap();
        assert_eq!(t.mmsi, 366053209);
        assert_eq!(t.last_seen, Some(t0()));
        let pos = t.position.unwrap();
        assert!((pos.latitude - 37.802118333).abs() < 1e-6);
        assert!((t.course_over_ground().unwrap() - 219.3).abs() < 1e-9);
        assert_eq!(t.speed_over_ground(), Some(0.0));
        assert_eq!(t.true_heading(), Some(1.0));
        let TargetKind::Ship(s) = &t.kind else {
            panic!("expected ship");
        };
        assert_eq!(
            s.navigation_status,
            Some(NavigationStatus::RestrictedManeuverability)
        );
        assert_eq!(s.transceiver_class, Some(TransceiverClass::ClassA));
    }

    #[test]
    fn test_static_data_sets_name() {
        let r = TargetRegistry::new();
        r.update(
            &message(
                "55?MbV02;H;s<HtKR20EHE:0@T4@Dn2222222216L961O5Gf0NSQEp6ClRp888888888880",
                2,
            ),
            false,
            t0(),
        );
        let t = r.target(351759000).unwrap();
        assert_eq!(t.name.as_deref(), Some("EVER DIADEM"));
        assert_eq!(t.position, None);
        let TargetKind::Ship(s) = &t.kind else {
            panic!("expected ship");
        };
        assert_eq!(s.call_sign.as_deref(), Some("3FOF8"));
        assert_eq!(s.imo_number, Some(9134270));
        assert_eq!(s.destination.as_deref(), Some("NEW YORK"));
        assert_eq!(s.dimensions.and_then(|d| d.length()), Some(295));
    }

    #[test]
    fn test_base_station_report_converts_kind() {
        let r = TargetRegistry::new();
        r.lock().targets.insert(
            3669702,
            AisTarget::with_kind(3669702, TargetKind::Ship(Default::default())),
        );
        let t = r
            .update(&message("403OviQuMGCqWrRO9>E6fE700@GO", 0), false, t0())
            .unwrap();
        assert!(matches!(t.kind, TargetKind::BaseStation));
        assert!(t.position.is_some());
        assert_eq!(t.last_seen, Some(t0()));
    }

    #[test]
    fn test_utc_response_keeps_ship() {
        let r = TargetRegistry::new();
        let mut reply = message("403OviQuMGCqWrRO9>E6fE700@GO", 0);
        if let AisMessage::BaseStationReport(m) = &mut reply {
            m.header.message_type = 11;
            m.header.mmsi = 244_000_001;
        }
        let t = r.update(&reply, false, t0()).unwrap();
        assert!(matches!(t.kind, TargetKind::Ship(_)));
        assert!(t.position.is_some());
    }

    #[test]
    fn test_non_station_message_is_ignored() {
        let r = TargetRegistry::new();
        let m = AisMessage::SafetyBroadcastMessage(SafetyBroadcastMessage::new(244_000_001, "TEST"));
        assert_eq!(r.update(&m, false, t0()), None);
        assert!(r.is_empty());
    }

    #[test]
    fn test_own_ship_excluded_from_targets() {
        let r = TargetRegistry::with_own_mmsi(366053209);
        r.update(&message("15M67FC000G?ufbE`FepT@3n00Sa", 0), false, t0());
        assert!(r.targets().is_empty());
        assert!(r.own_ship().position.is_some());
        assert_eq!(r.target(366053209).unwrap().mmsi, 366053209);
    }

    #[test]
    fn test_vdo_sets_own_mmsi() {
        let r = TargetRegistry::new();
        assert_eq!(r.own_mmsi(), None);
        r.get_or_create(366053209);
        r.update(&message("15M67FC000G?ufbE`FepT@3n00Sa", 0), true, t0());
        assert_eq!(r.own_mmsi(), Some(366053209));
        assert!(r.targets().is_empty());
        assert_eq!(r.own_ship().last_seen, Some(t0()));
    }

    #[test]
    fn test_own_ship_fix() {
        let r = TargetRegistry::new();
        r.update_own_ship(&OwnShipFix {
            position: GeoPosition::new(52.0, 4.0),
            course_over_ground: Some(90.0),
            speed_over_ground: Some(6.0),
            true_heading: None,
            timestamp: t0(),
        });
        let own = r.own_ship();
        assert_eq!(own.position, Some(GeoPosition::new(52.0, 4.0)));
        assert_eq!(own.course_over_ground(), Some(90.0));
        assert_eq!(own.true_heading(), None);
        assert!(r.targets().is_empty());
    }

    #[test]
    fn test_changing_own_mmsi_takes_over_target() {
        let r = TargetRegistry::with_own_mmsi(244_000_001);
        r.update_own_ship(&OwnShipFix {
            position: GeoPosition::new(52.0, 4.0),
            course_over_ground: Some(90.0),
            speed_over_ground: Some(6.0),
            true_heading: None,
            timestamp: t0(),
        });
        r.get_or_create(244_000_002);

        r.set_own_mmsi(244_000_002);
        assert_eq!(r.own_mmsi(), Some(244_000_002));
        assert_eq!(r.own_ship().position, None);
        assert!(r.is_empty());
        assert!(r.target(244_000_001).is_none());
    }

    #[test]
    fn test_concurrent_updates() {
        let r = std::sync::Arc::new(TargetRegistry::new());
        let handles: Vec<_> = (0..4)
            .map(|n| {
                let r = r.clone();
                std::thread::spawn(move || {
                    for i in 0..50 {
                        r.get_or_create(244_000_000 + (i % 10) + n * 100);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(r.len(), 40);
    }
}
