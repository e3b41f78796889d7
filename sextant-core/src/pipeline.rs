//! Line-by-line AIS processing
//!
//! [`AisPipeline`] ties the stages together: frame a line, reassemble
//! fragments, decode the payload and apply the message to the target
//! registry. It does no I/O itself apart from [`AisPipeline::run`], which
//! drives it from any blocking reader.

use std::io::BufRead;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::error::{AisError, Result};
use crate::protocol::{AisMessage, AisSentence, FragmentReassembler, MessageFactory};
use crate::targets::TargetRegistry;

pub struct AisPipeline {
    reassembler: FragmentReassembler,
    factory: MessageFactory,
    registry: Arc<TargetRegistry>,
}

impl AisPipeline {
    pub fn new(factory: MessageFactory, registry: Arc<TargetRegistry>) -> Self {
        AisPipeline {
            reassembler: FragmentReassembler::new(),
            factory,
            registry,
        }
    }

    pub fn registry(&self) -> &Arc<TargetRegistry> {
        &self.registry
    }

    pub fn factory(&self) -> &MessageFactory {
        &self.factory
    }

    /// Process one received line.
    ///
    /// Returns the decoded message once it is complete. Blank lines, pending
    /// fragments and ignored message types give `Ok(None)`.
    pub fn process_line(&self, line: &str, now: DateTime<Utc>) -> Result<Option<AisMessage>> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let sentence = AisSentence::parse(line, now)?;
        let Some(payload) = self.reassembler.push(&sentence)? else {
            return Ok(None);
        };
        let Some(message) = self.factory.decode(&payload)? else {
            return Ok(None);
        };

        self.registry.update(&message, sentence.own_ship, now);
        Ok(Some(message))
    }

    /// Read lines until end of input.
    ///
    /// Every decoded message goes to `on_message`; a line that cannot be
    /// processed goes to `on_error` and reading continues. Only I/O errors
    /// stop the loop. Returns the number of decoded messages.
    pub fn run<R, M, E>(&self, mut reader: R, mut on_message: M, mut on_error: E) -> std::io::Result<usize>
    where
        R: BufRead,
        M: FnMut(&AisMessage),
        E: FnMut(&str, &AisError),
    {
        let mut decoded = 0;
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            let line = String::from_utf8_lossy(&buf);
            match self.process_line(&line, Utc::now()) {
                Ok(Some(message)) => {
                    decoded += 1;
                    on_message(&message);
                }
                Ok(None) => {}
                Err(e) => on_error(line.trim(), &e),
            }
        }
        Ok(decoded)
    }
}

/// Log level for a line that failed with `error`
pub fn line_error_level(error: &AisError) -> log::Level {
    if error.is_input_error() {
        log::Level::Warn
    } else {
        log::Level::Error
    }
}

/// Default error callback: log and carry on
pub fn log_line_error(line: &str, error: &AisError) {
    log::log!(line_error_level(error), "Skipping {:?}: {}", line, error);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::sentence::format_sentence;
    use crate::protocol::MessageFactoryOptions;
    use std::io::Cursor;

    fn pipeline() -> AisPipeline {
        AisPipeline::new(MessageFactory::default(), Arc::new(TargetRegistry::new()))
    }

    #[test]
    fn test_two_fragment_position_report() {
        let p = pipeline();
        let first = format_sentence(false, 2, 1, Some(3), Some('B'), "15M67FC000G?ufbE", 0);
        let second = format_sentence(false, 2, 2, Some(3), Some('B'), "`FepT@3n00Sa", 0);

        assert_eq!(p.process_line(&first, Utc::now()).unwrap(), None);
        let msg = p.process_line(&second, Utc::now()).unwrap().unwrap();
        let AisMessage::PositionReportClassA(report) = &msg else {
            panic!("unexpected {:?}", msg);
        };
        assert_eq!(report.header.mmsi, 366053209);
        assert!((report.latitude - 37.802118333).abs() < 1e-6);
        assert!((report.longitude + 122.341618333).abs() < 1e-6);

        let target = p.registry().target(366053209).unwrap();
        assert!((target.position.unwrap().latitude - 37.802118333).abs() < 1e-6);
    }

    #[test]
    fn test_two_fragment_report_with_fill_bits() {
        let p = pipeline();
        // 172 bits: the last character holds four spare bits and two fill bits
        let first = format_sentence(false, 2, 1, Some(3), Some('A'), "15M67FC000G?ufbE", 0);
        let second = format_sentence(false, 2, 2, Some(3), Some('A'), "`FepT@3n00Sa0", 2);
        assert!(first.starts_with("!AIVDM,2,1,3,A,15M67FC000G?ufbE,0*"));
        assert!(second.starts_with("!AIVDM,2,2,3,A,`FepT@3n00Sa0,2*"));

        assert_eq!(p.process_line(&first, Utc::now()).unwrap(), None);
        let msg = p.process_line(&second, Utc::now()).unwrap().unwrap();
        let AisMessage::PositionReportClassA(report) = &msg else {
            panic!("unexpected {:?}", msg);
        };
        assert_eq!(report.header.mmsi, 366053209);
        assert!((report.latitude - 37.802118333).abs() < 1e-6);
        assert!((report.longitude + 122.341618333).abs() < 1e-6);
        assert_eq!(p.registry().len(), 1);
    }

    #[test]
    fn test_line_error_levels() {
        assert_eq!(
            line_error_level(&AisError::Framing("no checksum".to_string())),
            log::Level::Warn
        );
        assert_eq!(line_error_level(&AisError::EncodeNotImplemented(10)), log::Level::Error);
    }

    #[test]
    fn test_errors_do_not_stop_the_loop() {
        let p = pipeline();
        let input = "\
!AIVDM,1,1,,B,15M67FC000G?ufbE`FepT@3n00Sa,0*5D
$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47

!AIVDM,1,1,,B,15M67FC000G?ufbE`FepT@3n00Sa,0*5C
!AIVDM,1,1,,A,403OviQuMGCqWrRO9>E6fE700@GO,0*4D
";
        let mut kinds = Vec::new();
        let mut errors = Vec::new();
        let n = p
            .run(
                Cursor::new(input),
                |m| kinds.push(m.kind().to_string()),
                |line, e| errors.push((line.to_string(), e.clone())),
            )
            .unwrap();
        assert_eq!(n, 2);
        assert_eq!(kinds, ["PositionReportClassA", "BaseStationReport"]);
        assert_eq!(errors.len(), 2);
        assert!(matches!(errors[0].1, AisError::ChecksumMismatch { .. }));
        assert!(matches!(errors[1].1, AisError::Framing(_)));
        assert_eq!(p.registry().len(), 2);
    }

    #[test]
    fn test_unknown_type_reported_when_strict() {
        let strict = AisPipeline::new(
            MessageFactory::new(MessageFactoryOptions {
                throw_on_unknown_message: true,
            }),
            Arc::new(TargetRegistry::new()),
        );
        // Type 25 payload
        let line = format_sentence(false, 1, 1, None, Some('A'), "I6SWo?8P00a3PKpEKEVj0?vNP<65", 0);
        assert_eq!(
            strict.process_line(&line, Utc::now()),
            Err(AisError::UnknownMessageType(25))
        );
        assert_eq!(pipeline().process_line(&line, Utc::now()), Ok(None));
    }

    #[test]
    fn test_own_ship_sentence() {
        let p = pipeline();
        let line = format_sentence(true, 1, 1, None, None, "15M67FC000G?ufbE`FepT@3n00Sa", 0);
        p.process_line(&line, Utc::now()).unwrap();
        assert_eq!(p.registry().own_mmsi(), Some(366053209));
        assert!(p.registry().is_empty());
        assert!(p.registry().own_ship().position.is_some());
    }
}
