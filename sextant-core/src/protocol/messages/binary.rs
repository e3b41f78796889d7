//! Binary messages (6, 7, 8, 13) and safety related text (12, 14)

use serde::{Deserialize, Serialize};

use super::MessageHeader;
use crate::error::{AisError, Result};
use crate::protocol::payload::Payload;

/// Longest text a type 14 message can carry in five slots
pub const MAX_SAFETY_BROADCAST_CHARS: usize = 161;

/// Application identifier of a binary message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationId {
    /// Designated area code
    pub dac: u16,
    /// Function identifier
    pub fid: u8,
}

impl ApplicationId {
    fn decode(p: &Payload, offset: usize) -> Result<Self> {
        Ok(ApplicationId {
            dac: p.read_uint(offset, 10)? as u16,
            fid: p.read_uint(offset + 10, 6)? as u8,
        })
    }
}

/// Type 6
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinaryAddressedMessage {
    pub header: MessageHeader,
    pub sequence_number: u8,
    pub destination_mmsi: u32,
    pub retransmit: bool,
    pub spare: bool,
    pub application_id: ApplicationId,
    /// Application specific data, not interpreted
    pub data: Payload,
}

impl BinaryAddressedMessage {
    pub fn decode(p: &Payload) -> Result<Self> {
        Ok(BinaryAddressedMessage {
            header: MessageHeader::decode(p)?,
            sequence_number: p.read_uint(38, 2)? as u8,
            destination_mmsi: p.read_uint(40, 30)? as u32,
            retransmit: p.read_bool(70)?,
            spare: p.read_bool(71)?,
            application_id: ApplicationId::decode(p, 72)?,
            data: p.read_bits_to_end(88),
        })
    }
}

/// One acknowledged message in a type 7 or 13
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Acknowledgement {
    pub mmsi: u32,
    pub sequence_number: u8,
}

/// Binary acknowledge (7) and safety related acknowledge (13)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinaryAcknowledge {
    pub header: MessageHeader,
    pub spare: u8,
    /// One to four destinations
    pub acknowledgements: Vec<Acknowledgement>,
}

impl BinaryAcknowledge {
    pub fn decode(p: &Payload) -> Result<Self> {
        let mut acknowledgements = Vec::with_capacity(4);
        let mut offset = 40;
        while acknowledgements.len() < 4 && offset + 32 <= p.len() {
            acknowledgements.push(Acknowledgement {
                mmsi: p.read_uint(offset, 30)? as u32,
                sequence_number: p.read_uint(offset + 30, 2)? as u8,
            });
            offset += 32;
        }
        if acknowledgements.is_empty() {
            return Err(AisError::past_end(40, 32, p.len()));
        }
        Ok(BinaryAcknowledge {
            header: MessageHeader::decode(p)?,
            spare: p.read_uint(38, 2)? as u8,
            acknowledgements,
        })
    }
}

/// Type 8
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinaryBroadcastMessage {
    pub header: MessageHeader,
    pub spare: u8,
    pub application_id: ApplicationId,
    pub data: Payload,
}

impl BinaryBroadcastMessage {
    pub fn decode(p: &Payload) -> Result<Self> {
        Ok(BinaryBroadcastMessage {
            header: MessageHeader::decode(p)?,
            spare: p.read_uint(38, 2)? as u8,
            application_id: ApplicationId::decode(p, 40)?,
            data: p.read_bits_to_end(56),
        })
    }
}

/// Type 12
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressedSafetyMessage {
    pub header: MessageHeader,
    pub sequence_number: u8,
    pub destination_mmsi: u32,
    pub retransmit: bool,
    pub spare: bool,
    pub text: String,
}

impl AddressedSafetyMessage {
    pub fn decode(p: &Payload) -> Result<Self> {
        Ok(AddressedSafetyMessage {
            header: MessageHeader::decode(p)?,
            sequence_number: p.read_uint(38, 2)? as u8,
            destination_mmsi: p.read_uint(40, 30)? as u32,
            retransmit: p.read_bool(70)?,
            spare: p.read_bool(71)?,
            text: p.read_string(72, p.remaining_chars(72))?,
        })
    }
}

/// Type 14, free text broadcast to all stations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetyBroadcastMessage {
    pub header: MessageHeader,
    pub spare: u8,
    /// Free text in the AIS character set.
    ///
    /// Trailing spaces do not survive the radio link: the decoder strips
    /// trailing `@` padding and blanks, so `"SECURITE "` decodes as
    /// `"SECURITE"`.
    pub text: String,
}

impl SafetyBroadcastMessage {
    pub fn new(mmsi: u32, text: &str) -> Self {
        SafetyBroadcastMessage {
            header: MessageHeader::new(14, mmsi),
            spare: 0,
            text: text.to_string(),
        }
    }

    pub fn decode(p: &Payload) -> Result<Self> {
        Ok(SafetyBroadcastMessage {
            header: MessageHeader::decode(p)?,
            spare: p.read_uint(38, 2)? as u8,
            text: p.read_string(40, p.remaining_chars(40))?,
        })
    }

    pub fn encode(&self) -> Result<Payload> {
        let chars = self.text.chars().count();
        if chars > MAX_SAFETY_BROADCAST_CHARS {
            return Err(AisError::InvalidField {
                field: "text",
                reason: format!(
                    "{} characters, at most {} fit",
                    chars, MAX_SAFETY_BROADCAST_CHARS
                ),
            });
        }
        let mut p = Payload::new();
        self.header.encode(&mut p)?;
        p.write_uint(2, self.spare as u64)?;
        p.write_string(chars, &self.text)?;
        Ok(p)
    }
}
