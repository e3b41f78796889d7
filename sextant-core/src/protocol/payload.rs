//! AIS payload bit buffer and 6-bit armoring
//!
//! An AIS message body is a big-endian bit string carried in sentences as
//! "armored" ASCII: every character holds 6 bits. [`Payload`] holds the
//! de-armored bits and provides offset based field reads (used by the
//! message decoders, which follow the ITU-R M.1371 field tables) and an
//! append cursor for writes (used by the encoders).

use std::fmt;

use num_traits::{FromPrimitive, ToPrimitive};
use serde::{Deserialize, Serialize};

use crate::error::{AisError, Result};

/// The AIS 6-bit text alphabet, indexed by 6-bit value
pub const SIXBIT_ASCII: &[u8; 64] =
    b"@ABCDEFGHIJKLMNOPQRSTUVWXYZ[\\]^_ !\"#$%&'()*+,-./0123456789:;<=>?";

/// Convert one armored payload character to its 6-bit value
#[inline]
pub fn dearmor(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'W' => Some(c - 48),
        b'`'..=b'w' => Some(c - 56),
        _ => None,
    }
}

/// Convert a 6-bit value to its armored payload character
#[inline]
pub fn armor(v: u8) -> char {
    let v = v & 0x3f;
    if v < 40 {
        (v + 48) as char
    } else {
        (v + 56) as char
    }
}

fn sixbit_to_char(v: u8) -> char {
    SIXBIT_ASCII[(v & 0x3f) as usize] as char
}

fn char_to_sixbit(c: char) -> Option<u8> {
    let c = c.to_ascii_uppercase();
    SIXBIT_ASCII
        .iter()
        .position(|&a| a as char == c)
        .map(|p| p as u8)
}

/// A bit buffer holding one AIS message body
///
/// Bits are packed MSB first. `len` counts valid bits; fill bits from the
/// armored form are never part of it.
#[derive(Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Payload {
    bytes: Vec<u8>,
    len: usize,
}

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode an armored payload, dropping `fill_bits` padding bits.
    ///
    /// # Example
    /// ```
    /// use sextant_core::protocol::payload::Payload;
    ///
    /// let p = Payload::from_armored("15M67FC000G?ufbE`FepT@3n00Sa", 0).unwrap();
    /// assert_eq!(p.len(), 168);
    /// assert_eq!(p.message_type().unwrap(), 1);
    /// ```
    pub fn from_armored(armored: &str, fill_bits: u8) -> Result<Payload> {
        let mut payload = Payload {
            bytes: Vec::with_capacity(armored.len() * 6 / 8 + 1),
            len: 0,
        };
        for c in armored.bytes() {
            let v = dearmor(c).ok_or_else(|| {
                AisError::MalformedPayload(format!("invalid armor character {:?}", c as char))
            })?;
            payload.push_bits(v as u64, 6);
        }

        let fill = fill_bits as usize;
        if fill > payload.len {
            return Err(AisError::MalformedPayload(format!(
                "{} fill bits in a payload of {} bits",
                fill, payload.len
            )));
        }
        payload.truncate(payload.len - fill);
        Ok(payload)
    }

    /// Number of valid bits
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The 6-bit message type tag at offset 0
    pub fn message_type(&self) -> Result<u8> {
        Ok(self.read_uint(0, 6)? as u8)
    }

    /// Number of whole 6-bit characters between `offset` and the end
    pub fn remaining_chars(&self, offset: usize) -> usize {
        self.len.saturating_sub(offset) / 6
    }

    #[inline]
    fn bit(&self, i: usize) -> u8 {
        (self.bytes[i / 8] >> (7 - (i % 8))) & 1
    }

    fn check(&self, offset: usize, width: usize) -> Result<()> {
        if offset + width > self.len {
            return Err(AisError::past_end(offset, width, self.len));
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    /// Big-endian unsigned field of up to 64 bits
    pub fn read_uint(&self, offset: usize, width: usize) -> Result<u64> {
        debug_assert!(width <= 64);
        self.check(offset, width)?;
        Ok((offset..offset + width).fold(0u64, |acc, i| (acc << 1) | self.bit(i) as u64))
    }

    /// Two's complement signed field of up to 64 bits
    pub fn read_int(&self, offset: usize, width: usize) -> Result<i64> {
        let raw = self.read_uint(offset, width)?;
        if width == 0 || width == 64 {
            return Ok(raw as i64);
        }
        let shift = 64 - width;
        Ok(((raw << shift) as i64) >> shift)
    }

    pub fn read_bool(&self, offset: usize) -> Result<bool> {
        Ok(self.read_uint(offset, 1)? == 1)
    }

    /// Text field of `chars` 6-bit characters, trailing `@` and blanks removed
    pub fn read_string(&self, offset: usize, chars: usize) -> Result<String> {
        self.check(offset, chars * 6)?;
        let text: String = (0..chars)
            .map(|n| self.read_uint(offset + n * 6, 6).map(|v| sixbit_to_char(v as u8)))
            .collect::<Result<String>>()?;
        Ok(text.trim_end_matches(['@', ' ']).to_string())
    }

    /// Enumerated field; every value of the wire width must map to a variant
    pub fn read_enum<T: FromPrimitive>(&self, offset: usize, width: usize) -> Result<T> {
        let raw = self.read_uint(offset, width)?;
        T::from_u64(raw).ok_or_else(|| {
            AisError::MalformedPayload(format!(
                "value {} at offset {} is not a valid {}",
                raw,
                offset,
                std::any::type_name::<T>()
            ))
        })
    }

    /// Opaque bit range, e.g. application specific binary data
    pub fn read_bits(&self, offset: usize, width: usize) -> Result<Payload> {
        self.check(offset, width)?;
        let mut out = Payload::new();
        for i in offset..offset + width {
            out.push_bits(self.bit(i) as u64, 1);
        }
        Ok(out)
    }

    /// Everything from `offset` to the end (empty if `offset` is past it)
    pub fn read_bits_to_end(&self, offset: usize) -> Payload {
        self.read_bits(offset, self.len.saturating_sub(offset))
            .unwrap_or_default()
    }

    // -------------------------------------------------------------------------
    // Writes (append at the cursor, which is always `len`)
    // -------------------------------------------------------------------------

    fn push_bits(&mut self, value: u64, width: usize) {
        for i in (0..width).rev() {
            let bit = ((value >> i) & 1) as u8;
            if self.len % 8 == 0 {
                self.bytes.push(0);
            }
            if bit == 1 {
                let last = self.bytes.len() - 1;
                self.bytes[last] |= 1 << (7 - (self.len % 8));
            }
            self.len += 1;
        }
    }

    fn truncate(&mut self, len: usize) {
        self.len = len;
        self.bytes.truncate(len.div_ceil(8));
        if len % 8 != 0 {
            let last = self.bytes.len() - 1;
            self.bytes[last] &= 0xffu8 << (8 - len % 8);
        }
    }

    pub fn write_uint(&mut self, width: usize, value: u64) -> Result<()> {
        if width < 64 && value >> width != 0 {
            return Err(AisError::InvalidField {
                field: "unsigned",
                reason: format!("{} does not fit in {} bits", value, width),
            });
        }
        self.push_bits(value, width);
        Ok(())
    }

    pub fn write_int(&mut self, width: usize, value: i64) -> Result<()> {
        if width == 0 || width >= 64 {
            return Err(AisError::InvalidField {
                field: "signed",
                reason: format!("unsupported width of {} bits", width),
            });
        }
        let min = -(1i64 << (width - 1));
        let max = (1i64 << (width - 1)) - 1;
        if value < min || value > max {
            return Err(AisError::InvalidField {
                field: "signed",
                reason: format!("{} does not fit in {} bits", value, width),
            });
        }
        self.push_bits(value as u64, width);
        Ok(())
    }

    pub fn write_bool(&mut self, value: bool) -> Result<()> {
        self.push_bits(value as u64, 1);
        Ok(())
    }

    /// Text field padded with `@` to exactly `chars` characters
    pub fn write_string(&mut self, chars: usize, text: &str) -> Result<()> {
        if text.chars().count() > chars {
            return Err(AisError::InvalidField {
                field: "text",
                reason: format!("{:?} is longer than {} characters", text, chars),
            });
        }
        let mut written = 0;
        for c in text.chars() {
            let v = char_to_sixbit(c).ok_or_else(|| AisError::InvalidField {
                field: "text",
                reason: format!("{:?} is not in the AIS character set", c),
            })?;
            self.push_bits(v as u64, 6);
            written += 1;
        }
        for _ in written..chars {
            self.push_bits(0, 6);
        }
        Ok(())
    }

    pub fn write_enum<T: ToPrimitive>(&mut self, width: usize, value: T) -> Result<()> {
        let raw = value.to_u64().ok_or_else(|| AisError::InvalidField {
            field: "enum",
            reason: "value has no wire representation".to_string(),
        })?;
        self.write_uint(width, raw)
    }

    pub fn write_bits(&mut self, bits: &Payload) -> Result<()> {
        for i in 0..bits.len {
            self.push_bits(bits.bit(i) as u64, 1);
        }
        Ok(())
    }

    /// Armor into 6-bit characters; returns the payload and its fill bits
    pub fn to_armored(&self) -> (String, u8) {
        let fill = (6 - self.len % 6) % 6;
        let mut padded = self.clone();
        padded.push_bits(0, fill);
        let armored = (0..padded.len / 6)
            .map(|n| armor(padded.read_uint(n * 6, 6).unwrap_or_default() as u8))
            .collect();
        (armored, fill as u8)
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (armored, fill) = self.to_armored();
        write!(f, "Payload({} bits, {:?}, fill {})", self.len, armored, fill)
    }
}
