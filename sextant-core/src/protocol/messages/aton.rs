//! Aid-to-navigation report (21)

use serde::{Deserialize, Serialize};

use super::{available_position, read_position_fine, Dimensions, EpfdType, MessageHeader, NavaidType};
use crate::error::Result;
use crate::navigation::GeoPosition;
use crate::protocol::payload::Payload;

/// Position and status of a buoy, beacon or other aid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AidToNavigationReport {
    pub header: MessageHeader,
    pub aid_type: NavaidType,
    /// Full name, including the extension of up to 14 characters
    pub name: String,
    pub position_accuracy: bool,
    pub longitude: f64,
    pub latitude: f64,
    pub dimensions: Dimensions,
    pub epfd: EpfdType,
    pub timestamp: u8,
    pub off_position: bool,
    pub regional_reserved: u8,
    pub raim: bool,
    /// No physical aid at the reported position
    pub virtual_aid: bool,
    pub assigned: bool,
}

impl AidToNavigationReport {
    pub fn decode(p: &Payload) -> Result<Self> {
        let (longitude, latitude) = read_position_fine(p, 164, 192)?;
        let mut name = p.read_string(43, 20)?;
        let extension_chars = p.remaining_chars(272).min(14);
        if extension_chars > 0 {
            name.push_str(&p.read_string(272, extension_chars)?);
        }
        Ok(AidToNavigationReport {
            header: MessageHeader::decode(p)?,
            aid_type: p.read_enum(38, 5)?,
            name,
            position_accuracy: p.read_bool(163)?,
            longitude,
            latitude,
            dimensions: Dimensions::decode(p, 219)?,
            epfd: p.read_enum(249, 4)?,
            timestamp: p.read_uint(253, 6)? as u8,
            off_position: p.read_bool(259)?,
            regional_reserved: p.read_uint(260, 8)? as u8,
            raim: p.read_bool(268)?,
            virtual_aid: p.read_bool(269)?,
            assigned: p.read_bool(270)?,
        })
    }

    pub fn position(&self) -> Option<GeoPosition> {
        available_position(self.latitude, self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::messages::write_position_fine;

    fn build(name: &str, extension: &str) -> Payload {
        let mut p = Payload::new();
        MessageHeader::new(21, 993_672_085).encode(&mut p).unwrap();
        p.write_uint(5, 1).unwrap();
        p.write_string(20, name).unwrap();
        p.write_bool(false).unwrap();
        write_position_fine(&mut p, 1.5, 51.0).unwrap();
        Dimensions::default().encode(&mut p).unwrap();
        p.write_uint(4, 7).unwrap();
        p.write_uint(6, 61).unwrap();
        p.write_bool(false).unwrap();
        p.write_uint(8, 0).unwrap();
        p.write_bool(false).unwrap();
        p.write_bool(true).unwrap();
        p.write_bool(false).unwrap();
        p.write_bool(false).unwrap();
        assert_eq!(p.len(), 272);
        if !extension.is_empty() {
            p.write_string(extension.len(), extension).unwrap();
        }
        p
    }

    #[test]
    fn test_decode_aton() {
        let m = AidToNavigationReport::decode(&build("SEA TRAFFIC SEP BUOY", "")).unwrap();
        assert_eq!(m.aid_type, NavaidType::ReferencePoint);
        assert_eq!(m.name, "SEA TRAFFIC SEP BUOY");
        assert_eq!(m.epfd, EpfdType::Surveyed);
        assert!(m.virtual_aid);
        assert!(!m.off_position);
        let pos = m.position().unwrap();
        assert!((pos.longitude - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_name_extension() {
        let m = AidToNavigationReport::decode(&build("NORTH HINDER LIGHTVE", "SSEL NO 2")).unwrap();
        assert_eq!(m.name, "NORTH HINDER LIGHTVESSEL NO 2");
    }
}
