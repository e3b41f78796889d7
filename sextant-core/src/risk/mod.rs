//! Collision risk assessment
//!
//! Targets are dead reckoned ([`track`]) over a window around now, own ship
//! and target tracks are compared sample by sample ([`cpa`]) and dangerous
//! targets are rate limited before anyone is warned ([`warnings`]).

pub mod cpa;
pub mod params;
pub mod track;
pub mod warnings;

pub use cpa::{relative_position, relative_positions, SafetyState, ShipRelativePosition};
pub use params::TrackEstimationParameters;
pub use track::{estimate_position, get_estimated_track, EstimatedTrack};
pub use warnings::{warning_text, WarningThrottle};
