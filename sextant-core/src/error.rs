//! Error types for AIS sentence and payload handling

use thiserror::Error;

/// Errors that can occur when framing, decoding or encoding AIS data
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AisError {
    /// Line is not a well-formed NMEA0183 encapsulation sentence
    #[error("Framing error: {0}")]
    Framing(String),

    /// Checksum after `*` does not match the XOR of the sentence body
    #[error("Checksum mismatch: computed {computed}, sentence says {received}")]
    ChecksumMismatch { computed: String, received: String },

    /// Sentence is valid NMEA but not `!AIVDM`/`!AIVDO`
    #[error("Unrecognized packet header: {0}")]
    UnrecognizedPacketHeader(String),

    /// Message type has no decoder
    #[error("Unknown message type: {0}")]
    UnknownMessageType(u8),

    /// Payload cannot be read as the message it claims to be
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// Encoding is not available for this message type
    #[error("Encoding not implemented for message type {0}")]
    EncodeNotImplemented(u8),

    /// Field value cannot be represented in its wire width
    #[error("Invalid field '{field}': {reason}")]
    InvalidField { field: &'static str, reason: String },
}

impl AisError {
    /// A field read that runs past the end of a payload of `len` bits
    pub(crate) fn past_end(offset: usize, width: usize, len: usize) -> Self {
        AisError::MalformedPayload(format!(
            "read of {} bits at offset {} runs past the end of {} bits",
            width, offset, len
        ))
    }

    /// True for errors that are caused by one bad sentence on the wire
    pub fn is_input_error(&self) -> bool {
        !matches!(
            self,
            AisError::EncodeNotImplemented(_) | AisError::InvalidField { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, AisError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_errors() {
        assert!(AisError::Framing("no comma".to_string()).is_input_error());
        assert!(AisError::UnknownMessageType(25).is_input_error());
        assert!(AisError::past_end(10, 6, 12).is_input_error());
        assert!(!AisError::EncodeNotImplemented(10).is_input_error());
        assert!(!AisError::InvalidField {
            field: "text",
            reason: "too long".to_string()
        }
        .is_input_error());
    }

    #[test]
    fn test_past_end_is_malformed_payload() {
        assert_eq!(
            AisError::past_end(10, 6, 12),
            AisError::MalformedPayload(
                "read of 6 bits at offset 10 runs past the end of 12 bits".to_string()
            )
        );
    }
}
