//! NMEA0183 encapsulation sentence framing (pure, no I/O)
//!
//! Turns one line such as
//! `!AIVDM,1,1,,B,15M67FC000G?ufbE`FepT@3n00Sa,0*5C` into a validated
//! [`AisSentence`], and builds outgoing sentences for the encode path.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AisError, Result};

/// Maximum armored payload characters placed in one outgoing sentence
pub const MAX_PAYLOAD_CHARS_PER_SENTENCE: usize = 60;

/// One framed NMEA0183 line, split but not yet interpreted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSentence {
    /// Talker id, `AI` for AIS transceivers
    pub talker_id: String,
    /// Sentence id, `VDM` or `VDO` for AIS
    pub sentence_id: String,
    /// Comma separated fields after the header, checksum removed
    pub fields: Vec<String>,
    /// When the line was received
    pub timestamp: DateTime<Utc>,
    /// Checksum present in the sentence
    pub checksum: String,
    /// Whether `checksum` matches the computed XOR
    pub valid: bool,
}

/// XOR of all bytes, formatted as two uppercase hex digits
pub fn checksum(body: &str) -> String {
    let sum = body.bytes().fold(0u8, |acc, b| acc ^ b);
    format!("{:02X}", sum)
}

impl RawSentence {
    /// Frame a single line.
    ///
    /// Only framing problems are errors here; a wrong checksum produces a
    /// sentence with `valid == false`.
    pub fn parse(line: &str, timestamp: DateTime<Utc>) -> Result<RawSentence> {
        let line = line.trim_end_matches(['\r', '\n']).trim_start();

        let Some(rest) = line.strip_prefix('!') else {
            return Err(AisError::Framing(format!(
                "sentence does not start with '!': {:?}",
                line
            )));
        };
        let Some((body, received)) = rest.rsplit_once('*') else {
            return Err(AisError::Framing(format!(
                "no '*' checksum marker in {:?}",
                line
            )));
        };

        let received = received.trim().to_string();
        let computed = checksum(body);

        let mut parts = body.split(',');
        let header = parts.next().unwrap_or_default();
        if header.len() < 3 || !header.is_ascii() {
            return Err(AisError::Framing(format!("invalid header {:?}", header)));
        }
        let (talker_id, sentence_id) = header.split_at(2);

        Ok(RawSentence {
            talker_id: talker_id.to_string(),
            sentence_id: sentence_id.to_string(),
            fields: parts.map(str::to_string).collect(),
            timestamp,
            valid: computed == received,
            checksum: received,
        })
    }

    /// Header as it appears on the wire, including the leading `!`
    pub fn header(&self) -> String {
        format!("!{}{}", self.talker_id, self.sentence_id)
    }
}

/// A validated AIS encapsulation sentence (one fragment of a message)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AisSentence {
    /// Total number of sentences carrying this message (1..=9)
    pub fragment_count: u8,
    /// Position of this sentence in the group (1-based)
    pub fragment_number: u8,
    /// Sequential message id linking fragments (0..=9)
    pub sequence_id: Option<u8>,
    /// VHF channel, `A` or `B` (some receivers send `1`/`2`)
    pub channel: Option<char>,
    /// 6-bit armored payload
    pub payload: String,
    /// Number of padding bits at the end of the payload
    pub fill_bits: u8,
    /// True for `VDO` (own vessel) sentences
    pub own_ship: bool,
    /// When the sentence was received
    pub timestamp: DateTime<Utc>,
}

impl AisSentence {
    /// Interpret a framed sentence as AIS.
    pub fn from_raw(raw: &RawSentence) -> Result<AisSentence> {
        if !raw.valid {
            let body = format!("{}{},{}", raw.talker_id, raw.sentence_id, raw.fields.join(","));
            return Err(AisError::ChecksumMismatch {
                computed: checksum(&body),
                received: raw.checksum.clone(),
            });
        }

        let own_ship = match (raw.talker_id.as_str(), raw.sentence_id.as_str()) {
            ("AI", "VDM") => false,
            ("AI", "VDO") => true,
            _ => return Err(AisError::UnrecognizedPacketHeader(raw.header())),
        };

        if raw.fields.len() != 6 {
            return Err(AisError::Framing(format!(
                "expected 6 fields after {}, got {}",
                raw.header(),
                raw.fields.len()
            )));
        }

        let fragment_count = parse_count(&raw.fields[0], "fragment count")?;
        let fragment_number = parse_count(&raw.fields[1], "fragment number")?;
        if fragment_count == 0 || fragment_number == 0 || fragment_number > fragment_count {
            return Err(AisError::Framing(format!(
                "fragment {} of {} is out of range",
                fragment_number, fragment_count
            )));
        }

        let sequence_id = match raw.fields[2].trim() {
            "" => None,
            s => Some(parse_count(s, "sequential message id")?),
        };
        let channel = raw.fields[3].trim().chars().next();
        let payload = raw.fields[4].trim().to_string();

        let fill_bits = parse_count(&raw.fields[5], "fill bits")?;
        if fill_bits > 5 {
            return Err(AisError::Framing(format!(
                "fill bits must be 0..=5, got {}",
                fill_bits
            )));
        }

        Ok(AisSentence {
            fragment_count,
            fragment_number,
            sequence_id,
            channel,
            payload,
            fill_bits,
            own_ship,
            timestamp: raw.timestamp,
        })
    }

    /// Frame and validate one line.
    ///
    /// # Example
    /// ```
    /// use chrono::Utc;
    /// use sextant_core::protocol::sentence::AisSentence;
    ///
    /// let s = AisSentence::parse("!AIVDM,1,1,,B,15M67FC000G?ufbE`FepT@3n00Sa,0*5C", Utc::now()).unwrap();
    /// assert_eq!(s.fragment_count, 1);
    /// assert_eq!(s.channel, Some('B'));
    /// ```
    pub fn parse(line: &str, timestamp: DateTime<Utc>) -> Result<AisSentence> {
        let raw = RawSentence::parse(line, timestamp)?;
        AisSentence::from_raw(&raw)
    }

    pub fn is_single_fragment(&self) -> bool {
        self.fragment_count == 1
    }

    /// Format back to wire form, including checksum
    pub fn to_line(&self) -> String {
        format_sentence(
            self.own_ship,
            self.fragment_count,
            self.fragment_number,
            self.sequence_id,
            self.channel,
            &self.payload,
            self.fill_bits,
        )
    }
}

fn parse_count(field: &str, what: &str) -> Result<u8> {
    field
        .trim()
        .parse::<u8>()
        .map_err(|_| AisError::Framing(format!("invalid {}: {:?}", what, field)))
}

/// Build one `!AIVDM`/`!AIVDO` sentence with checksum (no line terminator)
pub fn format_sentence(
    own_ship: bool,
    fragment_count: u8,
    fragment_number: u8,
    sequence_id: Option<u8>,
    channel: Option<char>,
    payload: &str,
    fill_bits: u8,
) -> String {
    let body = format!(
        "AIVD{},{},{},{},{},{},{}",
        if own_ship { 'O' } else { 'M' },
        fragment_count,
        fragment_number,
        sequence_id.map(|s| s.to_string()).unwrap_or_default(),
        channel.map(String::from).unwrap_or_default(),
        payload,
        fill_bits
    );
    format!("!{}*{}", body, checksum(&body))
}

/// Split an armored payload into as many sentences as needed.
///
/// A sequential id is only written when more than one sentence is produced
/// and `sequence_id` is given. Fill bits go on the last fragment; all
/// others carry 0.
pub fn encode_sentences(
    payload: &str,
    fill_bits: u8,
    channel: Option<char>,
    sequence_id: Option<u8>,
    own_ship: bool,
) -> Vec<String> {
    let chunks: Vec<&str> = if payload.is_empty() {
        vec![""]
    } else {
        payload
            .as_bytes()
            .chunks(MAX_PAYLOAD_CHARS_PER_SENTENCE)
            // Armored payloads are ASCII, so byte chunks are valid str
            .map(|c| std::str::from_utf8(c).unwrap_or_default())
            .collect()
    };

    let count = chunks.len() as u8;
    let seq = if count > 1 { sequence_id } else { None };

    chunks
        .iter()
        .enumerate()
        .map(|(i, chunk)| {
            let number = i as u8 + 1;
            let fill = if number == count { fill_bits } else { 0 };
            format_sentence(own_ship, count, number, seq, channel, chunk, fill)
        })
        .collect()
}
