#![no_main]
use std::time::Duration;

use libfuzzer_sys::arbitrary::{self, Arbitrary};
use libfuzzer_sys::fuzz_target;
use shade_core::{MoveController, TimingCfg};
use shade_traits::ManualClock;

#[derive(Debug, Arbitrary)]
enum Op {
    Target(i32),
    Advance(u16),
    Halt,
}

fuzz_target!(|ops: Vec<Op>| {
    let clock = ManualClock::new();
    let Ok(mut ctrl) = MoveController::builder()
        .with_transmitter(shade_hardware::SimulatedTransmitter::new())
        .with_timing(TimingCfg {
            initial_delay: Duration::from_millis(100),
            total_open: Duration::from_secs(5),
            total_close: Duration::from_secs(3),
            tick: Duration::from_millis(100),
        })
        .with_clock(Box::new(clock.clone()))
        .build()
    else {
        return;
    };

    for op in ops.into_iter().take(256) {
        match op {
            Op::Target(p) => ctrl.request_target(p),
            Op::Advance(ms) => {
                clock.advance(Duration::from_millis(u64::from(ms)));
                ctrl.poll();
            }
            Op::Halt => ctrl.halt(),
        }
        assert!(ctrl.read_current_position() <= 100);
        assert!(ctrl.target_position() <= 100);
    }

    // Codes always alternate start / STOP, never two starts in a row.
    let codes = ctrl.sent_codes();
    for pair in codes.windows(2) {
        assert!(!(pair[0] != "STOP" && pair[1] != "STOP"), "{codes:?}");
        assert!(!(pair[0] == "STOP" && pair[1] == "STOP"), "{codes:?}");
    }
});
