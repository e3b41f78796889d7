//! AIS wire protocol
//!
//! Layered bottom-up:
//! - [`sentence`]: NMEA0183 framing and checksums
//! - [`payload`]: 6-bit armoring and the bit buffer
//! - [`fragments`]: reassembly of multi-sentence messages
//! - [`messages`]: typed messages and the [`MessageFactory`](messages::MessageFactory)

pub mod fragments;
pub mod messages;
pub mod payload;
pub mod sentence;

pub use fragments::FragmentReassembler;
pub use messages::{AisMessage, MessageFactory, MessageFactoryOptions};
pub use payload::Payload;
pub use sentence::{AisSentence, RawSentence};
