//! Base station report (4), UTC/date response (11) and UTC inquiry (10)

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{available_position, read_position_fine, write_position_fine, EpfdType, MessageHeader};
use crate::error::Result;
use crate::navigation::GeoPosition;
use crate::protocol::payload::Payload;

/// Fixed station position and UTC time (type 4), or a mobile station's
/// answer to a UTC inquiry (type 11)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseStationReport {
    pub header: MessageHeader,
    /// 0 = not available
    pub year: u16,
    pub month: u8,
    pub day: u8,
    /// 24 = not available
    pub hour: u8,
    /// 60 = not available
    pub minute: u8,
    pub second: u8,
    pub position_accuracy: bool,
    pub longitude: f64,
    pub latitude: f64,
    pub epfd: EpfdType,
    pub spare: u16,
    pub raim: bool,
    pub radio_status: u32,
}

impl BaseStationReport {
    pub fn decode(p: &Payload) -> Result<Self> {
        let (longitude, latitude) = read_position_fine(p, 79, 107)?;
        Ok(BaseStationReport {
            header: MessageHeader::decode(p)?,
            year: p.read_uint(38, 14)? as u16,
            month: p.read_uint(52, 4)? as u8,
            day: p.read_uint(56, 5)? as u8,
            hour: p.read_uint(61, 5)? as u8,
            minute: p.read_uint(66, 6)? as u8,
            second: p.read_uint(72, 6)? as u8,
            position_accuracy: p.read_bool(78)?,
            longitude,
            latitude,
            epfd: p.read_enum(134, 4)?,
            spare: p.read_uint(138, 10)? as u16,
            raim: p.read_bool(148)?,
            radio_status: p.read_uint(149, 19)? as u32,
        })
    }

    pub fn encode(&self) -> Result<Payload> {
        let mut p = Payload::new();
        self.header.encode(&mut p)?;
        p.write_uint(14, self.year as u64)?;
        p.write_uint(4, self.month as u64)?;
        p.write_uint(5, self.day as u64)?;
        p.write_uint(5, self.hour as u64)?;
        p.write_uint(6, self.minute as u64)?;
        p.write_uint(6, self.second as u64)?;
        p.write_bool(self.position_accuracy)?;
        write_position_fine(&mut p, self.longitude, self.latitude)?;
        p.write_enum(4, self.epfd)?;
        p.write_uint(10, self.spare as u64)?;
        p.write_bool(self.raim)?;
        p.write_uint(19, self.radio_status as u64)?;
        Ok(p)
    }

    pub fn position(&self) -> Option<GeoPosition> {
        available_position(self.latitude, self.longitude)
    }

    /// Reported UTC time, `None` if any component is not available
    pub fn utc(&self) -> Option<DateTime<Utc>> {
        NaiveDate::from_ymd_opt(self.year as i32, self.month as u32, self.day as u32)?
            .and_hms_opt(self.hour as u32, self.minute as u32, self.second as u32)
            .map(|t| t.and_utc())
    }
}

/// Request for a type 11 response from one station
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UtcInquiry {
    pub header: MessageHeader,
    pub destination_mmsi: u32,
}

impl UtcInquiry {
    pub fn decode(p: &Payload) -> Result<Self> {
        Ok(UtcInquiry {
            header: MessageHeader::decode(p)?,
            destination_mmsi: p.read_uint(40, 30)? as u32,
        })
    }
}
