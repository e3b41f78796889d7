//! Typed AIS messages and the message factory
//!
//! Every decoder reproduces the ITU-R M.1371 field table of its message
//! type: bit offsets, widths, signedness and scaling. "Not available"
//! values are kept as they appear on the wire (speed 102.3, course 360,
//! heading 511, longitude 181, latitude 91, ...); accessor methods such
//! as [`PositionReportClassA::speed_over_ground`] interpret them.

use num_derive::{FromPrimitive, ToPrimitive};
use serde::{Deserialize, Serialize};

use super::payload::Payload;
use super::sentence::encode_sentences;
use crate::error::{AisError, Result};
use crate::navigation::GeoPosition;

mod aton;
mod base_station;
mod binary;
mod link;
mod position;
mod sar;
mod static_data;

pub use aton::AidToNavigationReport;
pub use base_station::{BaseStationReport, UtcInquiry};
pub use binary::{
    Acknowledgement, AddressedSafetyMessage, ApplicationId, BinaryAcknowledge,
    BinaryAddressedMessage, BinaryBroadcastMessage, SafetyBroadcastMessage,
    MAX_SAFETY_BROADCAST_CHARS,
};
pub use link::{
    AssignmentModeCommand, ChannelManagement, ChannelManagementTarget, DataLinkManagement,
    DataLinkReservation, DgnssBroadcast, GroupAssignmentCommand, Interrogation,
    InterrogationRequest, SlotAssignment,
};
pub use position::{
    ExtendedClassBPositionReport, LongRangePositionReport, PositionReport,
    PositionReportClassA, StandardClassBPositionReport,
};
pub use sar::SarAircraftPositionReport;
pub use static_data::{StaticAndVoyageData, StaticDataReport, StaticDataReportPart};

// =============================================================================
// Field conventions shared by the decoders
// =============================================================================

/// Longitude value meaning "not available" (degrees)
pub const LONGITUDE_NOT_AVAILABLE: f64 = 181.0;
/// Latitude value meaning "not available" (degrees)
pub const LATITUDE_NOT_AVAILABLE: f64 = 91.0;
/// Speed over ground meaning "not available" (knots)
pub const SPEED_NOT_AVAILABLE: f64 = 102.3;
/// Course over ground meaning "not available" (degrees)
pub const COURSE_NOT_AVAILABLE: f64 = 360.0;
/// True heading meaning "not available" (degrees)
pub const HEADING_NOT_AVAILABLE: u16 = 511;
/// Rate of turn meaning "not available" (ROT_AIS)
pub const RATE_OF_TURN_NOT_AVAILABLE: i8 = -128;
/// UTC second meaning "not available"
pub const SECOND_NOT_AVAILABLE: u8 = 60;

/// Degrees from a position field in 1/10000 minute (types 1-4, 9, 11, 18, 19, 21)
pub(crate) fn read_position_fine(p: &Payload, lon_offset: usize, lat_offset: usize) -> Result<(f64, f64)> {
    let lon = p.read_int(lon_offset, 28)? as f64 / 600_000.0;
    let lat = p.read_int(lat_offset, 27)? as f64 / 600_000.0;
    Ok((lon, lat))
}

pub(crate) fn write_position_fine(p: &mut Payload, longitude: f64, latitude: f64) -> Result<()> {
    p.write_int(28, (longitude * 600_000.0).round() as i64)?;
    p.write_int(27, (latitude * 600_000.0).round() as i64)
}

/// Degrees from a position field in 1/10 minute (types 17, 22, 23, 27)
pub(crate) fn read_position_coarse(p: &Payload, lon_offset: usize, lat_offset: usize) -> Result<(f64, f64)> {
    let lon = p.read_int(lon_offset, 18)? as f64 / 600.0;
    let lat = p.read_int(lat_offset, 17)? as f64 / 600.0;
    Ok((lon, lat))
}

pub(crate) fn read_tenths(p: &Payload, offset: usize, width: usize) -> Result<f64> {
    Ok(p.read_uint(offset, width)? as f64 / 10.0)
}

pub(crate) fn write_tenths(p: &mut Payload, width: usize, value: f64, field: &'static str) -> Result<()> {
    let raw = (value * 10.0).round();
    if raw < 0.0 {
        return Err(AisError::InvalidField {
            field,
            reason: format!("{} is negative", value),
        });
    }
    p.write_uint(width, raw as u64).map_err(|_| AisError::InvalidField {
        field,
        reason: format!("{} is out of range", value),
    })
}

/// A position, unless either coordinate holds its "not available" value
pub(crate) fn available_position(latitude: f64, longitude: f64) -> Option<GeoPosition> {
    if latitude.abs() > 90.0 || longitude.abs() > 180.0 {
        None
    } else {
        Some(GeoPosition::new(latitude, longitude))
    }
}

pub(crate) fn available_speed(speed: f64) -> Option<f64> {
    (speed < SPEED_NOT_AVAILABLE - 0.05).then_some(speed)
}

pub(crate) fn available_course(course: f64) -> Option<f64> {
    (course < COURSE_NOT_AVAILABLE).then_some(course)
}

pub(crate) fn available_heading(heading: u16) -> Option<f64> {
    (heading < 360).then_some(heading as f64)
}

/// Rate of turn in degrees per minute from the ROT_AIS field.
///
/// `None` for "not available" and for ±127 (turning faster than 5°/30s,
/// no turn indicator), where only the direction is known.
pub fn rate_of_turn_degrees_per_minute(rot: i8) -> Option<f64> {
    match rot {
        RATE_OF_TURN_NOT_AVAILABLE | -127 | 127 => None,
        0 => Some(0.0),
        r => {
            let magnitude = (r.unsigned_abs() as f64 / 4.733).powi(2);
            Some(if r < 0 { -magnitude } else { magnitude })
        }
    }
}

/// ROT_AIS field value for a rate of turn in degrees per minute
pub fn rate_of_turn_to_ais(degrees_per_minute: Option<f64>) -> i8 {
    match degrees_per_minute {
        None => RATE_OF_TURN_NOT_AVAILABLE,
        Some(rate) => {
            let raw = (4.733 * rate.abs().sqrt()).round().min(126.0) as i8;
            if rate < 0.0 {
                -raw
            } else {
                raw
            }
        }
    }
}

// =============================================================================
// Shared field types
// =============================================================================

/// Fields common to every AIS message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageHeader {
    pub message_type: u8,
    pub repeat_indicator: u8,
    pub mmsi: u32,
}

impl MessageHeader {
    pub fn new(message_type: u8, mmsi: u32) -> Self {
        MessageHeader {
            message_type,
            repeat_indicator: 0,
            mmsi,
        }
    }

    pub(crate) fn decode(p: &Payload) -> Result<Self> {
        Ok(MessageHeader {
            message_type: p.read_uint(0, 6)? as u8,
            repeat_indicator: p.read_uint(6, 2)? as u8,
            mmsi: p.read_uint(8, 30)? as u32,
        })
    }

    pub(crate) fn encode(&self, p: &mut Payload) -> Result<()> {
        p.write_uint(6, self.message_type as u64)?;
        p.write_uint(2, self.repeat_indicator as u64)?;
        p.write_uint(30, self.mmsi as u64)
    }
}

/// Kind of station that sends a message type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
pub enum TransceiverClass {
    ClassA,
    ClassB,
    BaseStation,
    AidToNavigation,
    SarAircraft,
    Unknown,
}

/// Navigational status of a Class A vessel
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, FromPrimitive, ToPrimitive, strum::Display,
)]
pub enum NavigationStatus {
    UnderWayUsingEngine = 0,
    AtAnchor = 1,
    NotUnderCommand = 2,
    RestrictedManeuverability = 3,
    ConstrainedByDraught = 4,
    Moored = 5,
    Aground = 6,
    EngagedInFishing = 7,
    UnderWaySailing = 8,
    ReservedForHsc = 9,
    ReservedForWig = 10,
    TowingAstern = 11,
    PushingAheadOrTowingAlongside = 12,
    Reserved13 = 13,
    AisSartActive = 14,
    #[default]
    NotDefined = 15,
}

/// Special maneuver indicator
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, FromPrimitive, ToPrimitive,
)]
pub enum ManeuverIndicator {
    #[default]
    NotAvailable = 0,
    NoSpecialManeuver = 1,
    SpecialManeuver = 2,
    Reserved = 3,
}

/// Electronic position fixing device type
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, FromPrimitive, ToPrimitive, strum::Display,
)]
pub enum EpfdType {
    #[default]
    Undefined = 0,
    Gps = 1,
    Glonass = 2,
    CombinedGpsGlonass = 3,
    LoranC = 4,
    Chayka = 5,
    IntegratedNavigationSystem = 6,
    Surveyed = 7,
    Galileo = 8,
    Reserved9 = 9,
    Reserved10 = 10,
    Reserved11 = 11,
    Reserved12 = 12,
    Reserved13 = 13,
    Reserved14 = 14,
    InternalGnss = 15,
}

/// Type of an aid to navigation
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, FromPrimitive, ToPrimitive, strum::Display,
)]
pub enum NavaidType {
    #[default]
    Default = 0,
    ReferencePoint = 1,
    Racon = 2,
    FixedStructureOffShore = 3,
    Spare = 4,
    LightWithoutSectors = 5,
    LightWithSectors = 6,
    LeadingLightFront = 7,
    LeadingLightRear = 8,
    BeaconCardinalN = 9,
    BeaconCardinalE = 10,
    BeaconCardinalS = 11,
    BeaconCardinalW = 12,
    BeaconPortHand = 13,
    BeaconStarboardHand = 14,
    BeaconPreferredChannelPortHand = 15,
    BeaconPreferredChannelStarboardHand = 16,
    BeaconIsolatedDanger = 17,
    BeaconSafeWater = 18,
    BeaconSpecialMark = 19,
    CardinalMarkN = 20,
    CardinalMarkE = 21,
    CardinalMarkS = 22,
    CardinalMarkW = 23,
    PortHandMark = 24,
    StarboardHandMark = 25,
    PreferredChannelPortHand = 26,
    PreferredChannelStarboardHand = 27,
    IsolatedDanger = 28,
    SafeWater = 29,
    SpecialMark = 30,
    LightVessel = 31,
}

/// Ship and cargo type (0..=99 defined, the rest reserved)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShipType(pub u8);

impl ShipType {
    /// Broad category of the ship type code
    pub fn description(&self) -> &'static str {
        match self.0 {
            0 => "Not available",
            20..=29 => "Wing in ground",
            30 => "Fishing",
            31 | 32 => "Towing",
            33 => "Dredging or underwater ops",
            34 => "Diving ops",
            35 => "Military ops",
            36 => "Sailing",
            37 => "Pleasure craft",
            40..=49 => "High speed craft",
            50 => "Pilot vessel",
            51 => "Search and rescue vessel",
            52 => "Tug",
            53 => "Port tender",
            54 => "Anti-pollution equipment",
            55 => "Law enforcement",
            58 => "Medical transport",
            59 => "Noncombatant ship",
            60..=69 => "Passenger",
            70..=79 => "Cargo",
            80..=89 => "Tanker",
            90..=99 => "Other",
            _ => "Reserved",
        }
    }
}

/// Reference point for reported position, distances in meters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dimensions {
    pub to_bow: u16,
    pub to_stern: u16,
    pub to_port: u8,
    pub to_starboard: u8,
}

impl Dimensions {
    pub(crate) fn decode(p: &Payload, offset: usize) -> Result<Self> {
        Ok(Dimensions {
            to_bow: p.read_uint(offset, 9)? as u16,
            to_stern: p.read_uint(offset + 9, 9)? as u16,
            to_port: p.read_uint(offset + 18, 6)? as u8,
            to_starboard: p.read_uint(offset + 24, 6)? as u8,
        })
    }

    pub(crate) fn encode(&self, p: &mut Payload) -> Result<()> {
        p.write_uint(9, self.to_bow as u64)?;
        p.write_uint(9, self.to_stern as u64)?;
        p.write_uint(6, self.to_port as u64)?;
        p.write_uint(6, self.to_starboard as u64)
    }

    /// Overall length in meters, `None` when not reported
    pub fn length(&self) -> Option<u16> {
        let l = self.to_bow + self.to_stern;
        (l > 0).then_some(l)
    }

    /// Overall beam in meters, `None` when not reported
    pub fn beam(&self) -> Option<u16> {
        let b = self.to_port as u16 + self.to_starboard as u16;
        (b > 0).then_some(b)
    }
}

// =============================================================================
// Message enum
// =============================================================================

/// A decoded AIS message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, strum::AsRefStr)]
#[serde(tag = "kind")]
pub enum AisMessage {
    /// Types 1, 2 and 3
    PositionReportClassA(PositionReportClassA),
    /// Types 4 and 11
    BaseStationReport(BaseStationReport),
    /// Type 5
    StaticAndVoyageData(StaticAndVoyageData),
    /// Type 6
    BinaryAddressedMessage(BinaryAddressedMessage),
    /// Types 7 and 13
    BinaryAcknowledge(BinaryAcknowledge),
    /// Type 8
    BinaryBroadcastMessage(BinaryBroadcastMessage),
    /// Type 9
    SarAircraftPositionReport(SarAircraftPositionReport),
    /// Type 10
    UtcInquiry(UtcInquiry),
    /// Type 12
    AddressedSafetyMessage(AddressedSafetyMessage),
    /// Type 14
    SafetyBroadcastMessage(SafetyBroadcastMessage),
    /// Type 15
    Interrogation(Interrogation),
    /// Type 16
    AssignmentModeCommand(AssignmentModeCommand),
    /// Type 17
    DgnssBroadcast(DgnssBroadcast),
    /// Type 18
    StandardClassBPositionReport(StandardClassBPositionReport),
    /// Type 19
    ExtendedClassBPositionReport(ExtendedClassBPositionReport),
    /// Type 20
    DataLinkManagement(DataLinkManagement),
    /// Type 21
    AidToNavigationReport(AidToNavigationReport),
    /// Type 22
    ChannelManagement(ChannelManagement),
    /// Type 23
    GroupAssignmentCommand(GroupAssignmentCommand),
    /// Type 24
    StaticDataReport(StaticDataReport),
    /// Type 27
    LongRangePositionReport(LongRangePositionReport),
}

impl AisMessage {
    pub fn header(&self) -> &MessageHeader {
        match self {
            AisMessage::PositionReportClassA(m) => &m.header,
            AisMessage::BaseStationReport(m) => &m.header,
            AisMessage::StaticAndVoyageData(m) => &m.header,
            AisMessage::BinaryAddressedMessage(m) => &m.header,
            AisMessage::BinaryAcknowledge(m) => &m.header,
            AisMessage::BinaryBroadcastMessage(m) => &m.header,
            AisMessage::SarAircraftPositionReport(m) => &m.header,
            AisMessage::UtcInquiry(m) => &m.header,
            AisMessage::AddressedSafetyMessage(m) => &m.header,
            AisMessage::SafetyBroadcastMessage(m) => &m.header,
            AisMessage::Interrogation(m) => &m.header,
            AisMessage::AssignmentModeCommand(m) => &m.header,
            AisMessage::DgnssBroadcast(m) => &m.header,
            AisMessage::StandardClassBPositionReport(m) => &m.header,
            AisMessage::ExtendedClassBPositionReport(m) => &m.header,
            AisMessage::DataLinkManagement(m) => &m.header,
            AisMessage::AidToNavigationReport(m) => &m.header,
            AisMessage::ChannelManagement(m) => &m.header,
            AisMessage::GroupAssignmentCommand(m) => &m.header,
            AisMessage::StaticDataReport(m) => &m.header,
            AisMessage::LongRangePositionReport(m) => &m.header,
        }
    }

    pub fn message_type(&self) -> u8 {
        self.header().message_type
    }

    pub fn mmsi(&self) -> u32 {
        self.header().mmsi
    }

    pub fn repeat_indicator(&self) -> u8 {
        self.header().repeat_indicator
    }

    /// Variant name, e.g. `"PositionReportClassA"`
    pub fn kind(&self) -> &str {
        self.as_ref()
    }

    /// Kinematic view of messages that report a moving station
    pub fn position_report(&self) -> Option<&dyn PositionReport> {
        match self {
            AisMessage::PositionReportClassA(m) => Some(m),
            AisMessage::StandardClassBPositionReport(m) => Some(m),
            AisMessage::ExtendedClassBPositionReport(m) => Some(m),
            AisMessage::LongRangePositionReport(m) => Some(m),
            AisMessage::SarAircraftPositionReport(m) => Some(m),
            _ => None,
        }
    }

    pub fn transceiver_class(&self) -> TransceiverClass {
        match self.message_type() {
            1 | 2 | 3 | 5 | 27 => TransceiverClass::ClassA,
            18 | 19 | 24 => TransceiverClass::ClassB,
            4 | 11 => TransceiverClass::BaseStation,
            9 => TransceiverClass::SarAircraft,
            21 => TransceiverClass::AidToNavigation,
            _ => TransceiverClass::Unknown,
        }
    }
}

// =============================================================================
// Factory
// =============================================================================

/// Options for [`MessageFactory`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MessageFactoryOptions {
    /// Return `UnknownMessageType` instead of `Ok(None)` for undecodable types
    pub throw_on_unknown_message: bool,
}

/// Dispatches payloads to the per-type decoders and encoders
#[derive(Debug, Clone, Default)]
pub struct MessageFactory {
    options: MessageFactoryOptions,
}

impl MessageFactory {
    pub fn new(options: MessageFactoryOptions) -> Self {
        MessageFactory { options }
    }

    pub fn options(&self) -> &MessageFactoryOptions {
        &self.options
    }

    /// Decode a complete payload.
    ///
    /// # Example
    /// ```
    /// use sextant_core::protocol::messages::{AisMessage, MessageFactory};
    /// use sextant_core::protocol::payload::Payload;
    ///
    /// let payload = Payload::from_armored("15M67FC000G?ufbE`FepT@3n00Sa", 0).unwrap();
    /// let msg = MessageFactory::default().decode(&payload).unwrap().unwrap();
    /// assert_eq!(msg.mmsi(), 366053209);
    /// assert!(matches!(msg, AisMessage::PositionReportClassA(_)));
    /// ```
    pub fn decode(&self, payload: &Payload) -> Result<Option<AisMessage>> {
        let message_type = payload.message_type()?;
        let message = match message_type {
            1..=3 => AisMessage::PositionReportClassA(PositionReportClassA::decode(payload)?),
            4 | 11 => AisMessage::BaseStationReport(BaseStationReport::decode(payload)?),
            5 => AisMessage::StaticAndVoyageData(StaticAndVoyageData::decode(payload)?),
            6 => AisMessage::BinaryAddressedMessage(BinaryAddressedMessage::decode(payload)?),
            7 | 13 => AisMessage::BinaryAcknowledge(BinaryAcknowledge::decode(payload)?),
            8 => AisMessage::BinaryBroadcastMessage(BinaryBroadcastMessage::decode(payload)?),
            9 => AisMessage::SarAircraftPositionReport(SarAircraftPositionReport::decode(payload)?),
            10 => AisMessage::UtcInquiry(UtcInquiry::decode(payload)?),
            12 => AisMessage::AddressedSafetyMessage(AddressedSafetyMessage::decode(payload)?),
            14 => AisMessage::SafetyBroadcastMessage(SafetyBroadcastMessage::decode(payload)?),
            15 => AisMessage::Interrogation(Interrogation::decode(payload)?),
            16 => AisMessage::AssignmentModeCommand(AssignmentModeCommand::decode(payload)?),
            17 => AisMessage::DgnssBroadcast(DgnssBroadcast::decode(payload)?),
            18 => AisMessage::StandardClassBPositionReport(StandardClassBPositionReport::decode(
                payload,
            )?),
            19 => AisMessage::ExtendedClassBPositionReport(ExtendedClassBPositionReport::decode(
                payload,
            )?),
            20 => AisMessage::DataLinkManagement(DataLinkManagement::decode(payload)?),
            21 => AisMessage::AidToNavigationReport(AidToNavigationReport::decode(payload)?),
            22 => AisMessage::ChannelManagement(ChannelManagement::decode(payload)?),
            23 => AisMessage::GroupAssignmentCommand(GroupAssignmentCommand::decode(payload)?),
            24 => AisMessage::StaticDataReport(StaticDataReport::decode(payload)?),
            27 => AisMessage::LongRangePositionReport(LongRangePositionReport::decode(payload)?),
            other => {
                if self.options.throw_on_unknown_message {
                    return Err(AisError::UnknownMessageType(other));
                }
                log::debug!("Ignoring AIS message type {}", other);
                return Ok(None);
            }
        };
        Ok(Some(message))
    }

    /// Encode a message into a payload.
    ///
    /// Only the message kinds this system transmits are supported.
    pub fn encode(&self, message: &AisMessage) -> Result<Payload> {
        match message {
            AisMessage::PositionReportClassA(m) => m.encode(),
            AisMessage::BaseStationReport(m) => m.encode(),
            AisMessage::StaticAndVoyageData(m) => m.encode(),
            AisMessage::SafetyBroadcastMessage(m) => m.encode(),
            AisMessage::StandardClassBPositionReport(m) => m.encode(),
            AisMessage::StaticDataReport(m) => m.encode(),
            other => Err(AisError::EncodeNotImplemented(other.message_type())),
        }
    }

    /// Encode a message all the way to NMEA sentences
    pub fn encode_sentences(
        &self,
        message: &AisMessage,
        channel: Option<char>,
        sequence_id: Option<u8>,
        own_ship: bool,
    ) -> Result<Vec<String>> {
        let (armored, fill_bits) = self.encode(message)?.to_armored();
        Ok(encode_sentences(&armored, fill_bits, channel, sequence_id, own_ship))
    }
}
