//! Maps `Box<dyn Error>` from trait boundaries to typed `ShadeError`.
//!
//! `Transmitter` and `StateStore` report failures as
//! `Box<dyn Error + Send + Sync>`; this module narrows them, with a
//! feature-gated path for `shade_hardware::HwError` downcasting.

use crate::error::ShadeError;

/// Which collaborator produced the error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    Transmitter,
    StateStore,
}

/// Map a trait-boundary error to a typed `ShadeError`.
///
/// Known hardware error types are downcast first, then the message is
/// inspected for a timeout.
pub fn map_hw_error(boundary: Boundary, e: &(dyn std::error::Error + 'static)) -> ShadeError {
    #[cfg(feature = "hardware-errors")]
    {
        use shade_hardware::error::HwError;
        if let Some(hw) = e.downcast_ref::<HwError>() {
            return match (boundary, hw) {
                (Boundary::Transmitter, HwError::Timeout) => ShadeError::Timeout,
                (Boundary::StateStore, _) => ShadeError::Persistence(hw.to_string()),
                (Boundary::Transmitter, other) => ShadeError::Transmission(other.to_string()),
            };
        }
    }

    let s = e.to_string();
    match boundary {
        Boundary::Transmitter if s.to_lowercase().contains("timeout") => ShadeError::Timeout,
        Boundary::Transmitter => ShadeError::Transmission(s),
        Boundary::StateStore => ShadeError::Persistence(s),
    }
}
