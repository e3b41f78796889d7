//! Position reports: Class A (1, 2, 3), Class B (18, 19), long range (27)

use serde::{Deserialize, Serialize};

use super::{
    available_course, available_heading, available_position, available_speed,
    read_position_coarse, read_position_fine, read_tenths, write_position_fine, write_tenths,
    Dimensions, EpfdType, ManeuverIndicator, MessageHeader, NavigationStatus, ShipType,
};
use crate::error::Result;
use crate::navigation::GeoPosition;
use crate::protocol::payload::Payload;

/// Kinematic fields shared by every message that reports a moving position
pub trait PositionReport {
    fn position(&self) -> Option<GeoPosition>;
    /// Knots
    fn speed_over_ground(&self) -> Option<f64>;
    /// Degrees true
    fn course_over_ground(&self) -> Option<f64>;
    /// Degrees true
    fn true_heading(&self) -> Option<f64> {
        None
    }
    /// Degrees per minute, positive to starboard
    fn rate_of_turn(&self) -> Option<f64> {
        None
    }
}

// =============================================================================
// Types 1, 2, 3
// =============================================================================

/// Scheduled, assigned or interrogated Class A position report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionReportClassA {
    pub header: MessageHeader,
    pub navigation_status: NavigationStatus,
    /// ROT_AIS encoding, see [`super::rate_of_turn_degrees_per_minute`]
    pub rate_of_turn: i8,
    /// Knots, 102.3 = not available
    pub speed: f64,
    pub position_accuracy: bool,
    pub longitude: f64,
    pub latitude: f64,
    /// Degrees, 360 = not available
    pub course: f64,
    /// Degrees, 511 = not available
    pub heading: u16,
    /// UTC second of the report, 60..=63 have special meanings
    pub timestamp: u8,
    pub maneuver_indicator: ManeuverIndicator,
    pub spare: u8,
    pub raim: bool,
    pub radio_status: u32,
}

impl PositionReportClassA {
    pub fn decode(p: &Payload) -> Result<Self> {
        let (longitude, latitude) = read_position_fine(p, 61, 89)?;
        Ok(PositionReportClassA {
            header: MessageHeader::decode(p)?,
            navigation_status: p.read_enum(38, 4)?,
            rate_of_turn: p.read_int(42, 8)? as i8,
            speed: read_tenths(p, 50, 10)?,
            position_accuracy: p.read_bool(60)?,
            longitude,
            latitude,
            course: read_tenths(p, 116, 12)?,
            heading: p.read_uint(128, 9)? as u16,
            timestamp: p.read_uint(137, 6)? as u8,
            maneuver_indicator: p.read_enum(143, 2)?,
            spare: p.read_uint(145, 3)? as u8,
            raim: p.read_bool(148)?,
            radio_status: p.read_uint(149, 19)? as u32,
        })
    }

    pub fn encode(&self) -> Result<Payload> {
        let mut p = Payload::new();
        self.header.encode(&mut p)?;
        p.write_enum(4, self.navigation_status)?;
        p.write_int(8, self.rate_of_turn as i64)?;
        write_tenths(&mut p, 10, self.speed, "speed")?;
        p.write_bool(self.position_accuracy)?;
        write_position_fine(&mut p, self.longitude, self.latitude)?;
        write_tenths(&mut p, 12, self.course, "course")?;
        p.write_uint(9, self.heading as u64)?;
        p.write_uint(6, self.timestamp as u64)?;
        p.write_enum(2, self.maneuver_indicator)?;
        p.write_uint(3, self.spare as u64)?;
        p.write_bool(self.raim)?;
        p.write_uint(19, self.radio_status as u64)?;
        Ok(p)
    }
}

impl PositionReport for PositionReportClassA {
    fn position(&self) -> Option<GeoPosition> {
        available_position(self.latitude, self.longitude)
    }
    fn speed_over_ground(&self) -> Option<f64> {
        available_speed(self.speed)
    }
    fn course_over_ground(&self) -> Option<f64> {
        available_course(self.course)
    }
    fn true_heading(&self) -> Option<f64> {
        available_heading(self.heading)
    }
    fn rate_of_turn(&self) -> Option<f64> {
        super::rate_of_turn_degrees_per_minute(self.rate_of_turn)
    }
}

// =============================================================================
// Type 18
// =============================================================================

/// Standard Class B equipment position report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandardClassBPositionReport {
    pub header: MessageHeader,
    pub reserved: u8,
    pub speed: f64,
    pub position_accuracy: bool,
    pub longitude: f64,
    pub latitude: f64,
    pub course: f64,
    pub heading: u16,
    pub timestamp: u8,
    pub regional_reserved: u8,
    /// Unit is a carrier sense (CS) unit rather than SOTDMA
    pub cs_unit: bool,
    pub display: bool,
    pub dsc: bool,
    /// Unit can use the whole marine band
    pub band: bool,
    /// Unit accepts channel management (type 22)
    pub message22: bool,
    pub assigned: bool,
    pub raim: bool,
    pub radio_status: u32,
}

impl StandardClassBPositionReport {
    pub fn decode(p: &Payload) -> Result<Self> {
        let (longitude, latitude) = read_position_fine(p, 57, 85)?;
        Ok(StandardClassBPositionReport {
            header: MessageHeader::decode(p)?,
            reserved: p.read_uint(38, 8)? as u8,
            speed: read_tenths(p, 46, 10)?,
            position_accuracy: p.read_bool(56)?,
            longitude,
            latitude,
            course: read_tenths(p, 112, 12)?,
            heading: p.read_uint(124, 9)? as u16,
            timestamp: p.read_uint(133, 6)? as u8,
            regional_reserved: p.read_uint(139, 2)? as u8,
            cs_unit: p.read_bool(141)?,
            display: p.read_bool(142)?,
            dsc: p.read_bool(143)?,
            band: p.read_bool(144)?,
            message22: p.read_bool(145)?,
            assigned: p.read_bool(146)?,
            raim: p.read_bool(147)?,
            radio_status: p.read_uint(148, 20)? as u32,
        })
    }

    pub fn encode(&self) -> Result<Payload> {
        let mut p = Payload::new();
        self.header.encode(&mut p)?;
        p.write_uint(8, self.reserved as u64)?;
        write_tenths(&mut p, 10, self.speed, "speed")?;
        p.write_bool(self.position_accuracy)?;
        write_position_fine(&mut p, self.longitude, self.latitude)?;
        write_tenths(&mut p, 12, self.course, "course")?;
        p.write_uint(9, self.heading as u64)?;
        p.write_uint(6, self.timestamp as u64)?;
        p.write_uint(2, self.regional_reserved as u64)?;
        for flag in [
            self.cs_unit,
            self.display,
            self.dsc,
            self.band,
            self.message22,
            self.assigned,
            self.raim,
        ] {
            p.write_bool(flag)?;
        }
        p.write_uint(20, self.radio_status as u64)?;
        Ok(p)
    }
}

impl PositionReport for StandardClassBPositionReport {
    fn position(&self) -> Option<GeoPosition> {
        available_position(self.latitude, self.longitude)
    }
    fn speed_over_ground(&self) -> Option<f64> {
        available_speed(self.speed)
    }
    fn course_over_ground(&self) -> Option<f64> {
        available_course(self.course)
    }
    fn true_heading(&self) -> Option<f64> {
        available_heading(self.heading)
    }
}

// =============================================================================
// Type 19
// =============================================================================

/// Extended Class B position report, carries static data as well
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtendedClassBPositionReport {
    pub header: MessageHeader,
    pub reserved: u8,
    pub speed: f64,
    pub position_accuracy: bool,
    pub longitude: f64,
    pub latitude: f64,
    pub course: f64,
    pub heading: u16,
    pub timestamp: u8,
    pub regional_reserved: u8,
    pub ship_name: String,
    pub ship_type: ShipType,
    pub dimensions: Dimensions,
    pub epfd: EpfdType,
    pub raim: bool,
    /// Data terminal not ready
    pub dte: bool,
    pub assigned: bool,
    pub spare: u8,
}

impl ExtendedClassBPositionReport {
    pub fn decode(p: &Payload) -> Result<Self> {
        let (longitude, latitude) = read_position_fine(p, 57, 85)?;
        Ok(ExtendedClassBPositionReport {
            header: MessageHeader::decode(p)?,
            reserved: p.read_uint(38, 8)? as u8,
            speed: read_tenths(p, 46, 10)?,
            position_accuracy: p.read_bool(56)?,
            longitude,
            latitude,
            course: read_tenths(p, 112, 12)?,
            heading: p.read_uint(124, 9)? as u16,
            timestamp: p.read_uint(133, 6)? as u8,
            regional_reserved: p.read_uint(139, 4)? as u8,
            ship_name: p.read_string(143, 20)?,
            ship_type: ShipType(p.read_uint(263, 8)? as u8),
            dimensions: Dimensions::decode(p, 271)?,
            epfd: p.read_enum(301, 4)?,
            raim: p.read_bool(305)?,
            dte: p.read_bool(306)?,
            assigned: p.read_bool(307)?,
            spare: p.read_uint(308, 4)? as u8,
        })
    }
}

impl PositionReport for ExtendedClassBPositionReport {
    fn position(&self) -> Option<GeoPosition> {
        available_position(self.latitude, self.longitude)
    }
    fn speed_over_ground(&self) -> Option<f64> {
        available_speed(self.speed)
    }
    fn course_over_ground(&self) -> Option<f64> {
        available_course(self.course)
    }
    fn true_heading(&self) -> Option<f64> {
        available_heading(self.heading)
    }
}

// =============================================================================
// Type 27
// =============================================================================

/// Long range broadcast (satellite reception), coarse position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LongRangePositionReport {
    pub header: MessageHeader,
    pub position_accuracy: bool,
    pub raim: bool,
    pub navigation_status: NavigationStatus,
    pub longitude: f64,
    pub latitude: f64,
    /// Whole knots, 63 = not available
    pub speed: u8,
    /// Whole degrees, 511 = not available
    pub course: u16,
    /// Position is not from the current GNSS fix
    pub gnss_position_latency: bool,
    pub spare: bool,
}

impl LongRangePositionReport {
    pub fn decode(p: &Payload) -> Result<Self> {
        let (longitude, latitude) = read_position_coarse(p, 44, 62)?;
        Ok(LongRangePositionReport {
            header: MessageHeader::decode(p)?,
            position_accuracy: p.read_bool(38)?,
            raim: p.read_bool(39)?,
            navigation_status: p.read_enum(40, 4)?,
            longitude,
            latitude,
            speed: p.read_uint(79, 6)? as u8,
            course: p.read_uint(85, 9)? as u16,
            gnss_position_latency: p.read_bool(94)?,
            // Some transmitters omit the spare bit
            spare: p.len() > 95 && p.read_bool(95)?,
        })
    }
}

impl PositionReport for LongRangePositionReport {
    fn position(&self) -> Option<GeoPosition> {
        available_position(self.latitude, self.longitude)
    }
    fn speed_over_ground(&self) -> Option<f64> {
        (self.speed < 63).then_some(self.speed as f64)
    }
    fn course_over_ground(&self) -> Option<f64> {
        (self.course < 360).then_some(self.course as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::messages::{
        COURSE_NOT_AVAILABLE, HEADING_NOT_AVAILABLE, LATITUDE_NOT_AVAILABLE,
        LONGITUDE_NOT_AVAILABLE, SPEED_NOT_AVAILABLE,
    };

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_decode_class_a() {
        let p = Payload::from_armored("15M67FC000G?ufbE`FepT@3n00Sa", 0).unwrap();
        let m = PositionReportClassA::decode(&p).unwrap();
        assert_eq!(m.header.message_type, 1);
        assert_eq!(m.header.mmsi, 366053209);
        assert_eq!(m.navigation_status, NavigationStatus::RestrictedManeuverability);
        assert_eq!(m.rate_of_turn, 0);
        assert_eq!(m.speed, 0.0);
        assert!(!m.position_accuracy);
        assert!(approx(m.longitude, -122.341618333));
        assert!(approx(m.latitude, 37.802118333));
        assert!(approx(m.course, 219.3));
        assert_eq!(m.heading, 1);
        assert_eq!(m.timestamp, 59);
        assert_eq!(m.maneuver_indicator, ManeuverIndicator::NotAvailable);
        assert!(!m.raim);
        assert_eq!(m.radio_status, 2281);

        let pos = m.position().unwrap();
        assert!(approx(pos.latitude, 37.802118333));
        assert_eq!(m.speed_over_ground(), Some(0.0));
        assert_eq!(m.true_heading(), Some(1.0));
    }

    #[test]
    fn test_class_a_round_trip() {
        let p = Payload::from_armored("15M67FC000G?ufbE`FepT@3n00Sa", 0).unwrap();
        let m = PositionReportClassA::decode(&p).unwrap();
        assert_eq!(m.encode().unwrap(), p);
    }

    #[test]
    fn test_class_a_not_available_values() {
        let m = PositionReportClassA {
            header: MessageHeader::new(3, 244_000_001),
            navigation_status: NavigationStatus::NotDefined,
            rate_of_turn: -128,
            speed: SPEED_NOT_AVAILABLE,
            position_accuracy: false,
            longitude: LONGITUDE_NOT_AVAILABLE,
            latitude: LATITUDE_NOT_AVAILABLE,
            course: COURSE_NOT_AVAILABLE,
            heading: HEADING_NOT_AVAILABLE,
            timestamp: 60,
            maneuver_indicator: ManeuverIndicator::NotAvailable,
            spare: 0,
            raim: false,
            radio_status: 0,
        };
        let decoded = PositionReportClassA::decode(&m.encode().unwrap()).unwrap();
        assert_eq!(decoded.position(), None);
        assert_eq!(decoded.speed_over_ground(), None);
        assert_eq!(decoded.course_over_ground(), None);
        assert_eq!(decoded.true_heading(), None);
        assert_eq!(PositionReport::rate_of_turn(&decoded), None);
        assert_eq!(decoded.latitude, LATITUDE_NOT_AVAILABLE);
        assert_eq!(decoded.rate_of_turn, -128);
    }

    #[test]
    fn test_decode_class_b() {
        let p = Payload::from_armored("B52K>;h00Fc>jpUlNV@ikwpUoP06", 0).unwrap();
        let m = StandardClassBPositionReport::decode(&p).unwrap();
        assert_eq!(m.header.mmsi, 338087471);
        assert!(approx(m.speed, 0.1));
        assert!(approx(m.longitude, -74.072131667));
        assert!(approx(m.latitude, 40.68454));
        assert!(approx(m.course, 79.6));
        assert_eq!(m.heading, 511);
        assert_eq!(m.true_heading(), None);
        assert_eq!(m.timestamp, 49);
        assert!(m.cs_unit);
        assert!(!m.display);
        assert!(m.dsc);
        assert!(m.band);
        assert!(m.message22);
        assert!(!m.assigned);
        assert!(m.raim);
        assert_eq!(m.radio_status, 917510);
        assert_eq!(m.encode().unwrap(), p);
    }

    #[test]
    fn test_decode_extended_class_b() {
        let mut p = Payload::new();
        MessageHeader::new(19, 211_333_444).encode(&mut p).unwrap();
        p.write_uint(8, 0).unwrap();
        p.write_uint(10, 65).unwrap();
        p.write_bool(true).unwrap();
        write_position_fine(&mut p, 10.5, 54.25).unwrap();
        p.write_uint(12, 1805).unwrap();
        p.write_uint(9, 181).unwrap();
        p.write_uint(6, 12).unwrap();
        p.write_uint(4, 0).unwrap();
        p.write_string(20, "SEA BREEZE").unwrap();
        p.write_uint(8, 37).unwrap();
        Dimensions {
            to_bow: 8,
            to_stern: 4,
            to_port: 2,
            to_starboard: 2,
        }
        .encode(&mut p)
        .unwrap();
        p.write_uint(4, 1).unwrap();
        // raim, dte, assigned, spare
        p.write_uint(7, 0b010_0000).unwrap();
        assert_eq!(p.len(), 312);

        let m = ExtendedClassBPositionReport::decode(&p).unwrap();
        assert_eq!(m.header.mmsi, 211_333_444);
        assert_eq!(m.speed_over_ground(), Some(6.5));
        assert_eq!(m.course_over_ground(), Some(180.5));
        assert_eq!(m.true_heading(), Some(181.0));
        assert_eq!(m.ship_name, "SEA BREEZE");
        assert_eq!(m.ship_type.description(), "Pleasure craft");
        assert_eq!(m.dimensions.length(), Some(12));
        assert_eq!(m.epfd, EpfdType::Gps);
        assert!(!m.raim);
        assert!(m.dte);
        let pos = m.position().unwrap();
        assert!(approx(pos.latitude, 54.25));
        assert!(approx(pos.longitude, 10.5));
    }

    #[test]
    fn test_decode_long_range() {
        let mut p = Payload::new();
        MessageHeader::new(27, 366_000_001).encode(&mut p).unwrap();
        p.write_bool(true).unwrap();
        p.write_bool(false).unwrap();
        p.write_uint(4, 0).unwrap();
        p.write_int(18, (-70.5f64 * 600.0) as i64).unwrap();
        p.write_int(17, (42.25f64 * 600.0) as i64).unwrap();
        p.write_uint(6, 12).unwrap();
        p.write_uint(9, 511).unwrap();
        p.write_bool(false).unwrap();
        p.write_bool(false).unwrap();
        assert_eq!(p.len(), 96);

        let m = LongRangePositionReport::decode(&p).unwrap();
        assert_eq!(m.navigation_status, NavigationStatus::UnderWayUsingEngine);
        assert!(approx(m.longitude, -70.5));
        assert!(approx(m.latitude, 42.25));
        assert_eq!(m.speed_over_ground(), Some(12.0));
        assert_eq!(m.course_over_ground(), None);

        // 95-bit variant without spare
        let short = p.read_bits(0, 95).unwrap();
        assert!(LongRangePositionReport::decode(&short).is_ok());
    }

    #[test]
    fn test_encode_rejects_out_of_range_speed() {
        let p = Payload::from_armored("15M67FC000G?ufbE`FepT@3n00Sa", 0).unwrap();
        let mut m = PositionReportClassA::decode(&p).unwrap();
        m.speed = 150.0;
        assert!(m.encode().is_err());
    }
}
