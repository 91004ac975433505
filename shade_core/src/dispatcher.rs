//! Fire-and-forget delivery of logical codes to the transport.

use shade_traits::Transmitter;

use crate::config::{CodeMap, LogicalCode};
use crate::hw_error::{Boundary, map_hw_error};

/// Record of one dispatch attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentCode {
    pub code: LogicalCode,
    /// Payload handed to the transmitter, if one was configured.
    pub payload: Option<String>,
    /// False when the code had no payload or the transmitter failed.
    pub delivered: bool,
}

pub struct CodeDispatcher {
    transmitter: Box<dyn Transmitter>,
    codes: CodeMap,
    sent: Vec<SentCode>,
}

impl CodeDispatcher {
    pub fn new(transmitter: Box<dyn Transmitter>, codes: CodeMap) -> Self {
        Self {
            transmitter,
            codes,
            sent: Vec::new(),
        }
    }

    /// Transmit `code` exactly once. Failures are logged and recorded, never
    /// returned.
    pub fn send(&mut self, code: LogicalCode) {
        let Some(payload) = self.codes.payload(code).map(str::to_owned) else {
            tracing::warn!(code = code.as_str(), "no payload configured; code not sent");
            self.sent.push(SentCode {
                code,
                payload: None,
                delivered: false,
            });
            return;
        };

        let delivered = match self.transmitter.transmit(&payload) {
            Ok(()) => {
                tracing::debug!(code = code.as_str(), "code sent");
                true
            }
            Err(e) => {
                let err = map_hw_error(Boundary::Transmitter, e.as_ref());
                tracing::warn!(code = code.as_str(), error = %err, "transmission failed");
                false
            }
        };
        self.sent.push(SentCode {
            code,
            payload: Some(payload),
            delivered,
        });
    }

    pub fn codes(&self) -> &CodeMap {
        &self.codes
    }

    /// Every dispatch attempt, oldest first.
    pub fn sent(&self) -> &[SentCode] {
        &self.sent
    }

    /// Logical names of every dispatch attempt, oldest first.
    pub fn sent_codes(&self) -> Vec<&'static str> {
        self.sent.iter().map(|s| s.code.as_str()).collect()
    }
}

impl std::fmt::Debug for CodeDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodeDispatcher")
            .field("codes", &self.codes)
            .field("sent", &self.sent.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shade_hardware::SimulatedTransmitter;

    #[test]
    fn each_send_transmits_once() {
        let tx = SimulatedTransmitter::new();
        let link = tx.link();
        let mut d = CodeDispatcher::new(Box::new(tx), CodeMap::default());
        d.send(LogicalCode::Open);
        d.send(LogicalCode::Stop);
        d.send(LogicalCode::Stop);
        assert_eq!(link.sent(), vec!["OPEN", "STOP", "STOP"]);
        assert_eq!(d.sent_codes(), vec!["OPEN", "STOP", "STOP"]);
        assert!(d.sent().iter().all(|s| s.delivered));
    }

    #[test]
    fn failures_are_recorded_not_raised() {
        let tx = SimulatedTransmitter::failing();
        let mut d = CodeDispatcher::new(Box::new(tx), CodeMap::default());
        d.send(LogicalCode::Close);
        let rec = &d.sent()[0];
        assert_eq!(rec.code, LogicalCode::Close);
        assert_eq!(rec.payload.as_deref(), Some("CLOSE"));
        assert!(!rec.delivered);
    }

    #[test]
    fn timeouts_are_recorded_and_later_sends_continue() {
        let tx = SimulatedTransmitter::new();
        let link = tx.link();
        let mut d = CodeDispatcher::new(Box::new(tx), CodeMap::default());
        link.set_timing_out(true);
        d.send(LogicalCode::Open);
        link.set_timing_out(false);
        d.send(LogicalCode::Stop);
        assert_eq!(link.sent(), vec!["STOP"]);
        let delivered: Vec<bool> = d.sent().iter().map(|s| s.delivered).collect();
        assert_eq!(delivered, vec![false, true]);
    }

    #[test]
    fn missing_payload_is_recorded_undelivered() {
        let tx = SimulatedTransmitter::new();
        let link = tx.link();
        let mut d = CodeDispatcher::new(Box::new(tx), CodeMap::default());
        d.send(LogicalCode::OpenCompletely);
        assert_eq!(link.sent_count(), 0);
        assert_eq!(d.sent()[0].payload, None);
        assert!(!d.sent()[0].delivered);
    }
}
