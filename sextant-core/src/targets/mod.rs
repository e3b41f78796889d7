//! Target tracking: MMSI classification, target model and registry

pub mod mmsi;
pub mod registry;
pub mod target;

pub use mmsi::{classify_mmsi, MmsiType};
pub use registry::{OwnShipFix, TargetRegistry};
pub use target::{AisTarget, AtonData, SarData, ShipData, TargetKind};
