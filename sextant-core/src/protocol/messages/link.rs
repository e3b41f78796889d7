//! Data link and channel control messages: 15, 16, 17, 20, 22, 23

use serde::{Deserialize, Serialize};

use super::{read_position_coarse, MessageHeader, ShipType};
use crate::error::Result;
use crate::protocol::payload::Payload;

/// One request in an interrogation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterrogationRequest {
    pub mmsi: u32,
    pub message_type: u8,
    pub slot_offset: u16,
}

/// Type 15: up to two message requests to a first station, one to a second
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interrogation {
    pub header: MessageHeader,
    pub requests: Vec<InterrogationRequest>,
}

impl Interrogation {
    pub fn decode(p: &Payload) -> Result<Self> {
        let first_mmsi = p.read_uint(40, 30)? as u32;
        let mut requests = vec![InterrogationRequest {
            mmsi: first_mmsi,
            message_type: p.read_uint(70, 6)? as u8,
            slot_offset: p.read_uint(76, 12)? as u16,
        }];
        if p.len() >= 108 {
            requests.push(InterrogationRequest {
                mmsi: first_mmsi,
                message_type: p.read_uint(90, 6)? as u8,
                slot_offset: p.read_uint(96, 12)? as u16,
            });
        }
        if p.len() >= 158 {
            requests.push(InterrogationRequest {
                mmsi: p.read_uint(110, 30)? as u32,
                message_type: p.read_uint(140, 6)? as u8,
                slot_offset: p.read_uint(146, 12)? as u16,
            });
        }
        // Unused second request of the first station is sent as zeros
        if requests.len() > 1 && requests[1].message_type == 0 && requests[1].slot_offset == 0 {
            requests.remove(1);
        }
        Ok(Interrogation {
            header: MessageHeader::decode(p)?,
            requests,
        })
    }
}

/// One assignment in a type 16
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotAssignment {
    pub mmsi: u32,
    pub offset: u16,
    pub increment: u16,
}

/// Type 16
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentModeCommand {
    pub header: MessageHeader,
    pub assignments: Vec<SlotAssignment>,
}

impl AssignmentModeCommand {
    pub fn decode(p: &Payload) -> Result<Self> {
        let mut assignments = Vec::with_capacity(2);
        for offset in [40, 92] {
            if offset + 52 > p.len() && !assignments.is_empty() {
                break;
            }
            assignments.push(SlotAssignment {
                mmsi: p.read_uint(offset, 30)? as u32,
                offset: p.read_uint(offset + 30, 12)? as u16,
                increment: p.read_uint(offset + 42, 10)? as u16,
            });
        }
        Ok(AssignmentModeCommand {
            header: MessageHeader::decode(p)?,
            assignments,
        })
    }
}

/// Type 17, differential correction data from a reference station
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DgnssBroadcast {
    pub header: MessageHeader,
    pub longitude: f64,
    pub latitude: f64,
    pub data: Payload,
}

impl DgnssBroadcast {
    pub fn decode(p: &Payload) -> Result<Self> {
        let (longitude, latitude) = read_position_coarse(p, 40, 58)?;
        Ok(DgnssBroadcast {
            header: MessageHeader::decode(p)?,
            longitude,
            latitude,
            data: p.read_bits_to_end(80),
        })
    }
}

/// Slot block reserved by a base station
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataLinkReservation {
    pub offset: u16,
    pub number: u8,
    pub timeout: u8,
    pub increment: u16,
}

/// Type 20
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataLinkManagement {
    pub header: MessageHeader,
    pub reservations: Vec<DataLinkReservation>,
}

impl DataLinkManagement {
    pub fn decode(p: &Payload) -> Result<Self> {
        let mut reservations = Vec::with_capacity(4);
        let mut offset = 40;
        while reservations.len() < 4 && offset + 30 <= p.len() {
            let r = DataLinkReservation {
                offset: p.read_uint(offset, 12)? as u16,
                number: p.read_uint(offset + 12, 4)? as u8,
                timeout: p.read_uint(offset + 16, 3)? as u8,
                increment: p.read_uint(offset + 19, 11)? as u16,
            };
            if r.offset == 0 && r.number == 0 && !reservations.is_empty() {
                break;
            }
            reservations.push(r);
            offset += 30;
        }
        if reservations.is_empty() {
            p.read_uint(40, 30)?;
        }
        Ok(DataLinkManagement {
            header: MessageHeader::decode(p)?,
            reservations,
        })
    }
}

/// Recipients of a channel management command
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "target")]
pub enum ChannelManagementTarget {
    /// Rectangle given by its north-east and south-west corners
    #[serde(rename_all = "camelCase")]
    Area {
        ne_longitude: f64,
        ne_latitude: f64,
        sw_longitude: f64,
        sw_latitude: f64,
    },
    Addressed {
        destinations: [u32; 2],
    },
}

/// Type 22
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelManagement {
    pub header: MessageHeader,
    pub channel_a: u16,
    pub channel_b: u16,
    pub tx_rx_mode: u8,
    pub low_power: bool,
    pub target: ChannelManagementTarget,
    pub band_a: bool,
    pub band_b: bool,
    pub zone_size: u8,
}

impl ChannelManagement {
    pub fn decode(p: &Payload) -> Result<Self> {
        let target = if p.read_bool(139)? {
            ChannelManagementTarget::Addressed {
                destinations: [p.read_uint(69, 30)? as u32, p.read_uint(104, 30)? as u32],
            }
        } else {
            let (ne_longitude, ne_latitude) = read_position_coarse(p, 69, 87)?;
            let (sw_longitude, sw_latitude) = read_position_coarse(p, 104, 122)?;
            ChannelManagementTarget::Area {
                ne_longitude,
                ne_latitude,
                sw_longitude,
                sw_latitude,
            }
        };
        Ok(ChannelManagement {
            header: MessageHeader::decode(p)?,
            channel_a: p.read_uint(40, 12)? as u16,
            channel_b: p.read_uint(52, 12)? as u16,
            tx_rx_mode: p.read_uint(64, 4)? as u8,
            low_power: p.read_bool(68)?,
            target,
            band_a: p.read_bool(140)?,
            band_b: p.read_bool(141)?,
            zone_size: p.read_uint(142, 3)? as u8,
        })
    }
}

/// Type 23, assigns reporting parameters to stations in a region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupAssignmentCommand {
    pub header: MessageHeader,
    pub ne_longitude: f64,
    pub ne_latitude: f64,
    pub sw_longitude: f64,
    pub sw_latitude: f64,
    pub station_type: u8,
    pub ship_type: ShipType,
    pub tx_rx_mode: u8,
    pub report_interval: u8,
    pub quiet_time: u8,
}

impl GroupAssignmentCommand {
    pub fn decode(p: &Payload) -> Result<Self> {
        let (ne_longitude, ne_latitude) = read_position_coarse(p, 40, 58)?;
        let (sw_longitude, sw_latitude) = read_position_coarse(p, 75, 93)?;
        Ok(GroupAssignmentCommand {
            header: MessageHeader::decode(p)?,
            ne_longitude,
            ne_latitude,
            sw_longitude,
            sw_latitude,
            station_type: p.read_uint(110, 4)? as u8,
            ship_type: ShipType(p.read_uint(114, 8)? as u8),
            tx_rx_mode: p.read_uint(144, 2)? as u8,
            report_interval: p.read_uint(146, 4)? as u8,
            quiet_time: p.read_uint(150, 4)? as u8,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(message_type: u8) -> Payload {
        let mut p = Payload::new();
        MessageHeader::new(message_type, 2_320_001).encode(&mut p).unwrap();
        p.write_uint(2, 0).unwrap();
        p
    }

    fn coarse(p: &mut Payload, lon: f64, lat: f64) {
        p.write_int(18, (lon * 600.0).round() as i64).unwrap();
        p.write_int(17, (lat * 600.0).round() as i64).unwrap();
    }

    #[test]
    fn test_interrogation_lengths() {
        let mut p = header(15);
        p.write_uint(30, 211_000_001).unwrap();
        p.write_uint(6, 5).unwrap();
        p.write_uint(12, 0).unwrap();
        p.write_uint(2, 0).unwrap();
        let m = Interrogation::decode(&p).unwrap();
        assert_eq!(m.requests.len(), 1);
        assert_eq!(m.requests[0].message_type, 5);

        p.write_uint(6, 24).unwrap();
        p.write_uint(12, 100).unwrap();
        p.write_uint(2, 0).unwrap();
        p.write_uint(30, 211_000_002).unwrap();
        p.write_uint(6, 3).unwrap();
        p.write_uint(12, 7).unwrap();
        p.write_uint(2, 0).unwrap();
        assert_eq!(p.len(), 160);
        let m = Interrogation::decode(&p).unwrap();
        assert_eq!(
            m.requests,
            vec![
                InterrogationRequest {
                    mmsi: 211_000_001,
                    message_type: 5,
                    slot_offset: 0
                },
                InterrogationRequest {
                    mmsi: 211_000_001,
                    message_type: 24,
                    slot_offset: 100
                },
                InterrogationRequest {
                    mmsi: 211_000_002,
                    message_type: 3,
                    slot_offset: 7
                },
            ]
        );
    }

    #[test]
    fn test_assignment_mode_one_or_two() {
        let mut p = header(16);
        p.write_uint(30, 211_000_001).unwrap();
        p.write_uint(12, 10).unwrap();
        p.write_uint(10, 5).unwrap();
        p.write_uint(4, 0).unwrap();
        let m = AssignmentModeCommand::decode(&p).unwrap();
        assert_eq!(m.assignments.len(), 1);
        assert_eq!(m.assignments[0].increment, 5);

        let mut p = header(16);
        for mmsi in [211_000_001, 211_000_002] {
            p.write_uint(30, mmsi).unwrap();
            p.write_uint(12, 10).unwrap();
            p.write_uint(10, 5).unwrap();
        }
        let m = AssignmentModeCommand::decode(&p).unwrap();
        assert_eq!(m.assignments.len(), 2);
        assert_eq!(m.assignments[1].mmsi, 211_000_002);
    }

    #[test]
    fn test_dgnss_position() {
        let mut p = header(17);
        coarse(&mut p, 12.5, -33.25);
        p.write_uint(5, 0).unwrap();
        p.write_uint(16, 0xbeef).unwrap();
        let m = DgnssBroadcast::decode(&p).unwrap();
        assert!((m.longitude - 12.5).abs() < 1e-9);
        assert!((m.latitude + 33.25).abs() < 1e-9);
        assert_eq!(m.data.len(), 16);
    }

    #[test]
    fn test_data_link_reservations() {
        let mut p = header(20);
        for (offset, number) in [(100, 2), (300, 1)] {
            p.write_uint(12, offset).unwrap();
            p.write_uint(4, number).unwrap();
            p.write_uint(3, 7).unwrap();
            p.write_uint(11, 750).unwrap();
        }
        p.write_uint(2, 0).unwrap();
        let m = DataLinkManagement::decode(&p).unwrap();
        assert_eq!(m.reservations.len(), 2);
        assert_eq!(m.reservations[1].offset, 300);
        assert_eq!(m.reservations[1].increment, 750);
    }

    #[test]
    fn test_channel_management_variants() {
        let build = |addressed: bool| {
            let mut p = header(22);
            p.write_uint(12, 2087).unwrap();
            p.write_uint(12, 2088).unwrap();
            p.write_uint(4, 0).unwrap();
            p.write_bool(false).unwrap();
            if addressed {
                p.write_uint(30, 211_000_001).unwrap();
                p.write_uint(5, 0).unwrap();
                p.write_uint(30, 211_000_002).unwrap();
                p.write_uint(5, 0).unwrap();
            } else {
                coarse(&mut p, 11.0, 55.0);
                coarse(&mut p, 10.0, 54.0);
            }
            p.write_bool(addressed).unwrap();
            p.write_bool(false).unwrap();
            p.write_bool(true).unwrap();
            p.write_uint(3, 4).unwrap();
            p.write_uint(23, 0).unwrap();
            assert_eq!(p.len(), 168);
            ChannelManagement::decode(&p).unwrap()
        };

        let m = build(false);
        assert_eq!(m.channel_a, 2087);
        assert_eq!(m.zone_size, 4);
        assert!(m.band_b);
        let ChannelManagementTarget::Area { ne_latitude, sw_longitude, .. } = m.target else {
            panic!("expected area");
        };
        assert!((ne_latitude - 55.0).abs() < 1e-9);
        assert!((sw_longitude - 10.0).abs() < 1e-9);

        let m = build(true);
        assert_eq!(
            m.target,
            ChannelManagementTarget::Addressed {
                destinations: [211_000_001, 211_000_002]
            }
        );
    }

    #[test]
    fn test_group_assignment() {
        let mut p = header(23);
        coarse(&mut p, 11.0, 55.0);
        coarse(&mut p, 10.0, 54.0);
        p.write_uint(4, 6).unwrap();
        p.write_uint(8, 70).unwrap();
        p.write_uint(22, 0).unwrap();
        p.write_uint(2, 1).unwrap();
        p.write_uint(4, 9).unwrap();
        p.write_uint(4, 2).unwrap();
        p.write_uint(6, 0).unwrap();
        assert_eq!(p.len(), 160);
        let m = GroupAssignmentCommand::decode(&p).unwrap();
        assert_eq!(m.station_type, 6);
        assert_eq!(m.ship_type, ShipType(70));
        assert_eq!(m.tx_rx_mode, 1);
        assert_eq!(m.report_interval, 9);
        assert_eq!(m.quiet_time, 2);
        assert!((m.sw_latitude - 54.0).abs() < 1e-9);
    }
}
