//! Static and voyage related data (5) and Class B static data report (24)

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{Dimensions, EpfdType, MessageHeader, ShipType};
use crate::error::{AisError, Result};
use crate::protocol::payload::Payload;
use crate::targets::mmsi::{classify_mmsi, MmsiType};

/// Class A static and voyage related data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticAndVoyageData {
    pub header: MessageHeader,
    pub ais_version: u8,
    pub imo_number: u32,
    pub call_sign: String,
    pub ship_name: String,
    pub ship_type: ShipType,
    pub dimensions: Dimensions,
    pub epfd: EpfdType,
    /// ETA month, 0 = not available
    pub eta_month: u8,
    /// ETA day, 0 = not available
    pub eta_day: u8,
    /// ETA hour, 24 = not available
    pub eta_hour: u8,
    /// ETA minute, 60 = not available
    pub eta_minute: u8,
    /// Meters
    pub draught: f64,
    pub destination: String,
    /// Data terminal not ready
    pub dte: bool,
    pub spare: bool,
}

impl StaticAndVoyageData {
    pub fn decode(p: &Payload) -> Result<Self> {
        Ok(StaticAndVoyageData {
            header: MessageHeader::decode(p)?,
            ais_version: p.read_uint(38, 2)? as u8,
            imo_number: p.read_uint(40, 30)? as u32,
            call_sign: p.read_string(70, 7)?,
            ship_name: p.read_string(112, 20)?,
            ship_type: ShipType(p.read_uint(232, 8)? as u8),
            dimensions: Dimensions::decode(p, 240)?,
            epfd: p.read_enum(270, 4)?,
            eta_month: p.read_uint(274, 4)? as u8,
            eta_day: p.read_uint(278, 5)? as u8,
            eta_hour: p.read_uint(283, 5)? as u8,
            eta_minute: p.read_uint(288, 6)? as u8,
            draught: p.read_uint(294, 8)? as f64 / 10.0,
            destination: p.read_string(302, 20)?,
            // Many transmitters send 420 bits and leave out the tail
            dte: p.len() > 422 && p.read_bool(422)?,
            spare: p.len() > 423 && p.read_bool(423)?,
        })
    }

    pub fn encode(&self) -> Result<Payload> {
        let mut p = Payload::new();
        self.header.encode(&mut p)?;
        p.write_uint(2, self.ais_version as u64)?;
        p.write_uint(30, self.imo_number as u64)?;
        p.write_string(7, &self.call_sign)?;
        p.write_string(20, &self.ship_name)?;
        p.write_uint(8, self.ship_type.0 as u64)?;
        self.dimensions.encode(&mut p)?;
        p.write_enum(4, self.epfd)?;
        p.write_uint(4, self.eta_month as u64)?;
        p.write_uint(5, self.eta_day as u64)?;
        p.write_uint(5, self.eta_hour as u64)?;
        p.write_uint(6, self.eta_minute as u64)?;
        let draught = (self.draught * 10.0).round();
        if !(0.0..=255.0).contains(&draught) {
            return Err(AisError::InvalidField {
                field: "draught",
                reason: format!("{} m is out of range", self.draught),
            });
        }
        p.write_uint(8, draught as u64)?;
        p.write_string(20, &self.destination)?;
        p.write_bool(self.dte)?;
        p.write_bool(self.spare)?;
        Ok(p)
    }

    /// Next occurrence of the ETA after `now`.
    ///
    /// The message carries no year, so the ETA is placed in the current
    /// year, or the next one if that moment has already passed.
    pub fn eta(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let at = |year: i32| {
            NaiveDate::from_ymd_opt(year, self.eta_month as u32, self.eta_day as u32)?
                .and_hms_opt(self.eta_hour as u32, self.eta_minute as u32, 0)
                .map(|t| t.and_utc())
        };
        match at(now.year()) {
            Some(eta) if eta >= now => Some(eta),
            _ => at(now.year() + 1),
        }
    }
}

/// Which half of a type 24 report was sent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "part")]
pub enum StaticDataReportPart {
    #[serde(rename_all = "camelCase")]
    A {
        ship_name: String,
    },
    #[serde(rename_all = "camelCase")]
    B {
        ship_type: ShipType,
        vendor_id: String,
        unit_model: u8,
        serial_number: u32,
        call_sign: String,
        /// Absent for auxiliary craft
        dimensions: Option<Dimensions>,
        /// Only present for auxiliary craft
        mothership_mmsi: Option<u32>,
        spare: u8,
    },
}

/// Class B static data, sent in two independent parts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticDataReport {
    pub header: MessageHeader,
    pub part: StaticDataReportPart,
}

impl StaticDataReport {
    pub fn decode(p: &Payload) -> Result<Self> {
        let header = MessageHeader::decode(p)?;
        let part = match p.read_uint(38, 2)? {
            0 => StaticDataReportPart::A {
                ship_name: p.read_string(40, 20)?,
            },
            1 => {
                let auxiliary = classify_mmsi(header.mmsi) == MmsiType::AuxiliaryCraft;
                StaticDataReportPart::B {
                    ship_type: ShipType(p.read_uint(40, 8)? as u8),
                    vendor_id: p.read_string(48, 3)?,
                    unit_model: p.read_uint(66, 4)? as u8,
                    serial_number: p.read_uint(70, 20)? as u32,
                    call_sign: p.read_string(90, 7)?,
                    dimensions: if auxiliary {
                        None
                    } else {
                        Some(Dimensions::decode(p, 132)?)
                    },
                    mothership_mmsi: if auxiliary {
                        Some(p.read_uint(132, 30)? as u32)
                    } else {
                        None
                    },
                    spare: p.read_uint(162, 6)? as u8,
                }
            }
            other => {
                return Err(AisError::MalformedPayload(format!(
                    "type 24 part number {} is not A or B",
                    other
                )))
            }
        };
        Ok(StaticDataReport { header, part })
    }

    pub fn encode(&self) -> Result<Payload> {
        let mut p = Payload::new();
        self.header.encode(&mut p)?;
        match &self.part {
            StaticDataReportPart::A { ship_name } => {
                p.write_uint(2, 0)?;
                p.write_string(20, ship_name)?;
            }
            StaticDataReportPart::B {
                ship_type,
                vendor_id,
                unit_model,
                serial_number,
                call_sign,
                dimensions,
                mothership_mmsi,
                spare,
            } => {
                p.write_uint(2, 1)?;
                p.write_uint(8, ship_type.0 as u64)?;
                p.write_string(3, vendor_id)?;
                p.write_uint(4, *unit_model as u64)?;
                p.write_uint(20, *serial_number as u64)?;
                p.write_string(7, call_sign)?;
                match (mothership_mmsi, dimensions) {
                    (Some(mmsi), _) => p.write_uint(30, *mmsi as u64)?,
                    (None, Some(d)) => d.encode(&mut p)?,
                    (None, None) => Dimensions::default().encode(&mut p)?,
                }
                p.write_uint(6, *spare as u64)?;
            }
        }
        Ok(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const TYPE5: &str = "55?MbV02;H;s<HtKR20EHE:0@T4@Dn2222222216L961O5Gf0NSQEp6ClRp888888888880";

    #[test]
    fn test_decode_static_and_voyage() {
        let p = Payload::from_armored(TYPE5, 2).unwrap();
        assert_eq!(p.len(), 424);
        let m = StaticAndVoyageData::decode(&p).unwrap();
        assert_eq!(m.header.mmsi, 351759000);
        assert_eq!(m.ais_version, 0);
        assert_eq!(m.imo_number, 9134270);
        assert_eq!(m.call_sign, "3FOF8");
        assert_eq!(m.ship_name, "EVER DIADEM");
        assert_eq!(m.ship_type, ShipType(70));
        assert_eq!(m.ship_type.description(), "Cargo");
        assert_eq!(m.dimensions.to_bow, 225);
        assert_eq!(m.dimensions.to_stern, 70);
        assert_eq!(m.dimensions.to_port, 1);
        assert_eq!(m.dimensions.to_starboard, 31);
        assert_eq!(m.epfd, EpfdType::Gps);
        assert_eq!((m.eta_month, m.eta_day, m.eta_hour, m.eta_minute), (5, 15, 14, 0));
        assert!((m.draught - 12.2).abs() < 1e-9);
        assert_eq!(m.destination, "NEW YORK");
        assert!(!m.dte);
    }

    #[test]
    fn test_static_and_voyage_round_trip() {
        let p = Payload::from_armored(TYPE5, 2).unwrap();
        let m = StaticAndVoyageData::decode(&p).unwrap();
        let encoded = m.encode().unwrap();
        assert_eq!(encoded.len(), 424);
        assert_eq!(StaticAndVoyageData::decode(&encoded).unwrap(), m);
    }

    #[test]
    fn test_short_type5_without_dte() {
        let p = Payload::from_armored(TYPE5, 2).unwrap();
        let short = p.read_bits(0, 420).unwrap();
        let m = StaticAndVoyageData::decode(&short).unwrap();
        assert_eq!(m.destination, "NEW YORK");
        assert!(!m.dte);
    }

    #[test]
    fn test_eta_rolls_into_next_year() {
        let p = Payload::from_armored(TYPE5, 2).unwrap();
        let m = StaticAndVoyageData::decode(&p).unwrap();
        let before = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        assert_eq!(
            m.eta(before),
            Some(Utc.with_ymd_and_hms(2024, 5, 15, 14, 0, 0).unwrap())
        );
        let after = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        assert_eq!(
            m.eta(after),
            Some(Utc.with_ymd_and_hms(2025, 5, 15, 14, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_decode_part_a() {
        let p = Payload::from_armored("H42O55i18tMET00000000000000", 2).unwrap();
        let m = StaticDataReport::decode(&p).unwrap();
        assert_eq!(m.header.mmsi, 271041815);
        assert_eq!(
            m.part,
            StaticDataReportPart::A {
                ship_name: "PROGUY".to_string()
            }
        );
        assert_eq!(m.encode().unwrap(), p);
    }

    #[test]
    fn test_decode_part_b() {
        let p = Payload::from_armored("H42O55lti4hhhilD3nink000?050", 0).unwrap();
        let m = StaticDataReport::decode(&p).unwrap();
        let StaticDataReportPart::B {
            ship_type,
            vendor_id,
            unit_model,
            serial_number,
            call_sign,
            dimensions,
            mothership_mmsi,
            ..
        } = &m.part
        else {
            panic!("expected part B");
        };
        assert_eq!(*ship_type, ShipType(60));
        assert_eq!(vendor_id, "1D0");
        assert_eq!(*unit_model, 12);
        assert_eq!(*serial_number, 199796);
        assert_eq!(call_sign, "TC6163");
        let d = dimensions.unwrap();
        assert_eq!((d.to_bow, d.to_stern, d.to_port, d.to_starboard), (0, 15, 0, 5));
        assert_eq!(*mothership_mmsi, None);
        assert_eq!(m.encode().unwrap(), p);
    }

    #[test]
    fn test_part_b_auxiliary_craft() {
        let m = StaticDataReport {
            header: MessageHeader::new(24, 982_710_001),
            part: StaticDataReportPart::B {
                ship_type: ShipType(37),
                vendor_id: "ABC".to_string(),
                unit_model: 1,
                serial_number: 42,
                call_sign: "".to_string(),
                dimensions: None,
                mothership_mmsi: Some(271_000_001),
                spare: 0,
            },
        };
        let p = m.encode().unwrap();
        assert_eq!(p.len(), 168);
        assert_eq!(StaticDataReport::decode(&p).unwrap(), m);
    }

    #[test]
    fn test_invalid_part_number() {
        let mut p = Payload::new();
        MessageHeader::new(24, 271041815).encode(&mut p).unwrap();
        p.write_uint(2, 2).unwrap();
        p.write_string(20, "X").unwrap();
        assert!(matches!(
            StaticDataReport::decode(&p),
            Err(AisError::MalformedPayload(_))
        ));
    }
}
