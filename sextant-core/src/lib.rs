//! # Sextant Core
//!
//! Platform-independent AIS decoding, target tracking and collision risk
//! library.
//!
//! This crate contains pure protocol and navigation logic with **no I/O
//! runtime**. Sentences go in as strings, typed messages and target
//! snapshots come out; reading sockets, files and timers is left to the
//! caller (see `sextant-server`).
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │  sextant-core (no tokio/async deps)                           │
//! │  ├── protocol/   sentence → fragments → payload → messages    │
//! │  ├── targets/    MMSI classification, target registry         │
//! │  ├── risk/       dead reckoning, CPA/TCPA, warning throttle   │
//! │  ├── navigation  great circle math                            │
//! │  └── pipeline    line in, registry updated                    │
//! └───────────────────────────────────────────────────────────────┘
//!                               ▲
//!                 ┌─────────────┴─────────────┐
//!                 │  sextant-server           │
//!                 │  (tokio receiver, watch)  │
//!                 └───────────────────────────┘
//! ```
//!
//! ## Supported Messages
//!
//! | Types          | Decoded as                               | Encode |
//! |----------------|------------------------------------------|--------|
//! | 1, 2, 3        | Class A position report                  | yes    |
//! | 4, 11          | Base station report / UTC response       | yes    |
//! | 5              | Static and voyage data                   | yes    |
//! | 6, 7, 8, 13    | Binary messages and acknowledgements     |        |
//! | 9              | SAR aircraft position report             |        |
//! | 10, 15, 16     | UTC inquiry, interrogation, assignment   |        |
//! | 12             | Addressed safety message                 |        |
//! | 14             | Safety broadcast                         | yes    |
//! | 17, 20, 22, 23 | DGNSS and data link management           |        |
//! | 18             | Standard Class B position report         | yes    |
//! | 19             | Extended Class B position report         |        |
//! | 21             | Aid to navigation report                 |        |
//! | 24             | Static data report (parts A and B)       | yes    |
//! | 27             | Long range position report               |        |
//!
//! ## Example: Decoding a Stream
//!
//! ```rust
//! use std::sync::Arc;
//! use chrono::Utc;
//! use sextant_core::{AisPipeline, MessageFactory, TargetRegistry};
//!
//! let pipeline = AisPipeline::new(MessageFactory::default(), Arc::new(TargetRegistry::new()));
//! let msg = pipeline
//!     .process_line("!AIVDM,1,1,,B,15M67FC000G?ufbE`FepT@3n00Sa,0*5C", Utc::now())
//!     .unwrap()
//!     .unwrap();
//! assert_eq!(msg.mmsi(), 366053209);
//! assert_eq!(pipeline.registry().len(), 1);
//! ```
//!
//! ## Example: Collision Risk
//!
//! ```rust
//! use chrono::Utc;
//! use sextant_core::risk::{relative_positions, TrackEstimationParameters};
//! use sextant_core::TargetRegistry;
//!
//! let registry = TargetRegistry::new();
//! for r in relative_positions(&registry, Utc::now(), &TrackEstimationParameters::default()) {
//!     println!("{} at {:.0} m: {}", r.to, r.distance, r.safety_state);
//! }
//! ```

pub mod error;
pub mod navigation;
pub mod pipeline;
pub mod protocol;
pub mod risk;
pub mod targets;

// Re-export commonly used types
pub use error::{AisError, Result};
pub use navigation::GeoPosition;
pub use pipeline::AisPipeline;
pub use protocol::{
    AisMessage, AisSentence, FragmentReassembler, MessageFactory, MessageFactoryOptions, Payload,
};
pub use risk::{SafetyState, ShipRelativePosition, TrackEstimationParameters, WarningThrottle};
pub use targets::{AisTarget, MmsiType, OwnShipFix, TargetKind, TargetRegistry};
