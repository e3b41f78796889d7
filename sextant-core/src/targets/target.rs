//! Tracked AIS stations

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::mmsi::{classify_mmsi, MmsiType};
use crate::navigation::GeoPosition;
use crate::protocol::messages::{Dimensions, NavaidType, NavigationStatus, ShipType, TransceiverClass};

/// Dynamic and static data of a vessel
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipData {
    /// Degrees true
    pub course_over_ground: Option<f64>,
    /// Knots
    pub speed_over_ground: Option<f64>,
    /// Degrees per minute, positive to starboard
    pub rate_of_turn: Option<f64>,
    /// Degrees true
    pub true_heading: Option<f64>,
    pub navigation_status: Option<NavigationStatus>,
    pub call_sign: Option<String>,
    pub imo_number: Option<u32>,
    pub ship_type: Option<ShipType>,
    pub dimensions: Option<Dimensions>,
    /// Meters
    pub draught: Option<f64>,
    pub destination: Option<String>,
    pub transceiver_class: Option<TransceiverClass>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtonData {
    pub navaid_type: Option<NavaidType>,
    pub dimensions: Option<Dimensions>,
    pub off_position: bool,
    pub virtual_aid: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SarData {
    pub course_over_ground: Option<f64>,
    pub speed_over_ground: Option<f64>,
    /// Meters
    pub altitude: Option<u16>,
}

/// Kind specific part of a target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, strum::Display)]
#[serde(tag = "type")]
pub enum TargetKind {
    Ship(ShipData),
    BaseStation,
    AidToNavigation(AtonData),
    SarAircraft(SarData),
}

impl TargetKind {
    /// Initial kind for a target first seen with this MMSI
    pub fn for_mmsi(mmsi: u32) -> TargetKind {
        match classify_mmsi(mmsi) {
            MmsiType::BaseStation => TargetKind::BaseStation,
            MmsiType::AidToNavigation => TargetKind::AidToNavigation(AtonData::default()),
            MmsiType::SarAircraft => TargetKind::SarAircraft(SarData::default()),
            _ => TargetKind::Ship(ShipData::default()),
        }
    }
}

/// One station, keyed by MMSI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AisTarget {
    pub mmsi: u32,
    pub name: Option<String>,
    pub position: Option<GeoPosition>,
    pub last_seen: Option<DateTime<Utc>>,
    pub kind: TargetKind,
}

impl AisTarget {
    pub fn new(mmsi: u32) -> Self {
        AisTarget {
            mmsi,
            name: None,
            position: None,
            last_seen: None,
            kind: TargetKind::for_mmsi(mmsi),
        }
    }

    pub fn with_kind(mmsi: u32, kind: TargetKind) -> Self {
        AisTarget {
            kind,
            ..AisTarget::new(mmsi)
        }
    }

    pub fn mmsi_type(&self) -> MmsiType {
        classify_mmsi(self.mmsi)
    }

    /// Ships and SAR aircraft move; base stations and aids do not
    pub fn is_moving_kind(&self) -> bool {
        matches!(self.kind, TargetKind::Ship(_) | TargetKind::SarAircraft(_))
    }

    pub fn course_over_ground(&self) -> Option<f64> {
        match &self.kind {
            TargetKind::Ship(s) => s.course_over_ground,
            TargetKind::SarAircraft(s) => s.course_over_ground,
            _ => None,
        }
    }

    pub fn speed_over_ground(&self) -> Option<f64> {
        match &self.kind {
            TargetKind::Ship(s) => s.speed_over_ground,
            TargetKind::SarAircraft(s) => s.speed_over_ground,
            _ => None,
        }
    }

    pub fn rate_of_turn(&self) -> Option<f64> {
        match &self.kind {
            TargetKind::Ship(s) => s.rate_of_turn,
            _ => None,
        }
    }

    pub fn true_heading(&self) -> Option<f64> {
        match &self.kind {
            TargetKind::Ship(s) => s.true_heading,
            _ => None,
        }
    }

    pub(crate) fn set_course_over_ground(&mut self, course: f64) {
        match &mut self.kind {
            TargetKind::Ship(s) => s.course_over_ground = Some(course),
            TargetKind::SarAircraft(s) => s.course_over_ground = Some(course),
            _ => {}
        }
    }

    /// Name if known, else the MMSI
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) if !name.is_empty() => name.clone(),
            _ => self.mmsi.to_string(),
        }
    }

    // Kind conversion keeps mmsi, name, position and last_seen

    pub(crate) fn update_ship(&mut self, f: impl FnOnce(&mut ShipData)) {
        let mut ship = match std::mem::replace(&mut self.kind, TargetKind::BaseStation) {
            TargetKind::Ship(s) => s,
            other => {
                log::debug!("MMSI {}: {} becomes Ship", self.mmsi, other);
                ShipData::default()
            }
        };
        f(&mut ship);
        self.kind = TargetKind::Ship(ship);
    }

    pub(crate) fn update_aton(&mut self, f: impl FnOnce(&mut AtonData)) {
        let mut aton = match std::mem::replace(&mut self.kind, TargetKind::BaseStation) {
            TargetKind::AidToNavigation(a) => a,
            other => {
                log::debug!("MMSI {}: {} becomes AidToNavigation", self.mmsi, other);
                AtonData::default()
            }
        };
        f(&mut aton);
        self.kind = TargetKind::AidToNavigation(aton);
    }

    pub(crate) fn update_sar(&mut self, f: impl FnOnce(&mut SarData)) {
        let mut sar = match std::mem::replace(&mut self.kind, TargetKind::BaseStation) {
            TargetKind::SarAircraft(s) => s,
            other => {
                log::debug!("MMSI {}: {} becomes SarAircraft", self.mmsi, other);
                SarData::default()
            }
        };
        f(&mut sar);
        self.kind = TargetKind::SarAircraft(sar);
    }

    pub(crate) fn make_base_station(&mut self) {
        if !matches!(self.kind, TargetKind::BaseStation) {
            log::debug!("MMSI {}: {} becomes BaseStation", self.mmsi, self.kind);
            self.kind = TargetKind::BaseStation;
        }
    }
}
