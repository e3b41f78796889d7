//! Standard SAR aircraft position report (9)

use serde::{Deserialize, Serialize};

use super::position::PositionReport;
use super::{available_course, available_position, read_position_fine, read_tenths, MessageHeader};
use crate::error::Result;
use crate::navigation::GeoPosition;
use crate::protocol::payload::Payload;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SarAircraftPositionReport {
    pub header: MessageHeader,
    /// Meters, 4095 = not available, 4094 = 4094 or higher
    pub altitude: u16,
    /// Whole knots, 1023 = not available, 1022 = 1022 or higher
    pub speed: u16,
    pub position_accuracy: bool,
    pub longitude: f64,
    pub latitude: f64,
    pub course: f64,
    pub timestamp: u8,
    pub regional_reserved: u8,
    pub dte: bool,
    pub spare: u8,
    pub assigned: bool,
    pub raim: bool,
    pub radio_status: u32,
}

impl SarAircraftPositionReport {
    pub fn decode(p: &Payload) -> Result<Self> {
        let (longitude, latitude) = read_position_fine(p, 61, 89)?;
        Ok(SarAircraftPositionReport {
            header: MessageHeader::decode(p)?,
            altitude: p.read_uint(38, 12)? as u16,
            speed: p.read_uint(50, 10)? as u16,
            position_accuracy: p.read_bool(60)?,
            longitude,
            latitude,
            course: read_tenths(p, 116, 12)?,
            timestamp: p.read_uint(128, 6)? as u8,
            regional_reserved: p.read_uint(134, 8)? as u8,
            dte: p.read_bool(142)?,
            spare: p.read_uint(143, 3)? as u8,
            assigned: p.read_bool(146)?,
            raim: p.read_bool(147)?,
            radio_status: p.read_uint(148, 20)? as u32,
        })
    }

    /// Altitude in meters when available
    pub fn altitude_meters(&self) -> Option<u16> {
        (self.altitude < 4095).then_some(self.altitude)
    }
}

impl PositionReport for SarAircraftPositionReport {
    fn position(&self) -> Option<GeoPosition> {
        available_position(self.latitude, self.longitude)
    }
    fn speed_over_ground(&self) -> Option<f64> {
        (self.speed < 1023).then_some(self.speed as f64)
    }
    fn course_over_ground(&self) -> Option<f64> {
        available_course(self.course)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::messages::write_position_fine;

    #[test]
    fn test_decode_sar_aircraft() {
        let mut p = Payload::new();
        MessageHeader::new(9, 111_232_511).encode(&mut p).unwrap();
        p.write_uint(12, 303).unwrap();
        p.write_uint(10, 42).unwrap();
        p.write_bool(false).unwrap();
        write_position_fine(&mut p, -6.2785, 58.1448).unwrap();
        p.write_uint(12, 1545).unwrap();
        p.write_uint(6, 15).unwrap();
        p.write_uint(8, 0).unwrap();
        p.write_bool(true).unwrap();
        p.write_uint(3, 0).unwrap();
        p.write_bool(false).unwrap();
        p.write_bool(false).unwrap();
        p.write_uint(20, 33392).unwrap();
        assert_eq!(p.len(), 168);

        let m = SarAircraftPositionReport::decode(&p).unwrap();
        assert_eq!(m.header.mmsi, 111_232_511);
        assert_eq!(m.altitude_meters(), Some(303));
        assert_eq!(m.speed_over_ground(), Some(42.0));
        assert_eq!(m.course_over_ground(), Some(154.5));
        assert_eq!(m.timestamp, 15);
        assert!(m.dte);
        assert_eq!(m.radio_status, 33392);
        let pos = m.position().unwrap();
        assert!((pos.latitude - 58.1448).abs() < 1e-6);
    }
}
