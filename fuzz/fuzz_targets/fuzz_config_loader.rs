#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Parsing and validation must reject bad input with an error, never a panic.
    let Ok(cfg) = toml::from_str::<shade_config::Config>(data) else {
        return;
    };
    if cfg.validate().is_err() {
        return;
    }
    // Anything that validates must also be accepted by the engine.
    let built = shade_core::MoveController::builder()
        .with_transmitter(shade_hardware::SimulatedTransmitter::new())
        .with_config(&cfg)
        .with_clock(Box::new(shade_traits::ManualClock::new()))
        .build();
    assert!(built.is_ok(), "validated config rejected: {:?}", built.err());
});
