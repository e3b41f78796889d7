//! MMSI classification by ITU-R M.585 prefix

use serde::{Deserialize, Serialize};

/// What kind of station an MMSI belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
pub enum MmsiType {
    Unknown,
    Ship,
    Group,
    BaseStation,
    SarAircraft,
    AidToNavigation,
    AuxiliaryCraft,
    AisSart,
    ManOverboard,
    Epirb,
    DiversRadio,
}

// Most specific prefix first
const PREFIXES: &[(&str, MmsiType)] = &[
    ("000", MmsiType::Unknown),
    ("00", MmsiType::BaseStation),
    ("0", MmsiType::Group),
    ("111", MmsiType::SarAircraft),
    ("99", MmsiType::AidToNavigation),
    ("98", MmsiType::AuxiliaryCraft),
    ("970", MmsiType::AisSart),
    ("972", MmsiType::ManOverboard),
    ("974", MmsiType::Epirb),
    ("1", MmsiType::Unknown),
    ("9", MmsiType::Unknown),
    ("8", MmsiType::DiversRadio),
];

/// Classify an MMSI by the prefix of its zero-padded 9-digit form
pub fn classify_mmsi(mmsi: u32) -> MmsiType {
    let digits = format!("{:09}", mmsi);
    PREFIXES
        .iter()
        .find(|(prefix, _)| digits.starts_with(prefix))
        .map(|(_, kind)| *kind)
        .unwrap_or(MmsiType::Ship)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(classify_mmsi(111232111), MmsiType::SarAircraft);
        assert_eq!(classify_mmsi(992359598), MmsiType::AidToNavigation);
        assert_eq!(classify_mmsi(2655619), MmsiType::BaseStation);
        assert_eq!(classify_mmsi(367000000), MmsiType::Ship);
    }

    #[test]
    fn test_prefix_order() {
        assert_eq!(classify_mmsi(0), MmsiType::Unknown);
        assert_eq!(classify_mmsi(23_000_000), MmsiType::Group);
        assert_eq!(classify_mmsi(982_710_001), MmsiType::AuxiliaryCraft);
        assert_eq!(classify_mmsi(970_123_456), MmsiType::AisSart);
        assert_eq!(classify_mmsi(972_123_456), MmsiType::ManOverboard);
        assert_eq!(classify_mmsi(974_123_456), MmsiType::Epirb);
        assert_eq!(classify_mmsi(976_000_000), MmsiType::Unknown);
        assert_eq!(classify_mmsi(123_456_789), MmsiType::Unknown);
        assert_eq!(classify_mmsi(826_000_001), MmsiType::DiversRadio);
        assert_eq!(classify_mmsi(244_000_001), MmsiType::Ship);
    }
}
