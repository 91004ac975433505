pub mod clock;

pub use clock::{Clock, ManualClock, MonotonicClock};

/// Physical transport for a single IR/RF pulse. Implementations push the
/// payload out and report whether the hand-off succeeded; there is no
/// acknowledgment from the covering itself.
pub trait Transmitter {
    fn transmit(&mut self, payload: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Optional storage for the last settled position across restarts.
pub trait StateStore {
    fn load(&self) -> Result<Option<u8>, Box<dyn std::error::Error + Send + Sync>>;
    fn save(&mut self, position: u8) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

impl<T: Transmitter + ?Sized> Transmitter for Box<T> {
    fn transmit(&mut self, payload: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).transmit(payload)
    }
}

impl<T: StateStore + ?Sized> StateStore for Box<T> {
    fn load(&self) -> Result<Option<u8>, Box<dyn std::error::Error + Send + Sync>> {
        (**self).load()
    }
    fn save(&mut self, position: u8) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).save(position)
    }
}
