//! Human-readable error descriptions and structured JSON error formatting.

use shade_core::error::{BuildError, ShadeError};

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingTransmitter => {
                "What happened: No transmitter was provided to the movement engine.\nLikely causes: The transport failed to initialize or was not wired into the builder.\nHow to fix: Ensure a transmitter is created and passed via with_transmitter(...).".to_string()
            }
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Missing, zero or out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun. See etc/shade.toml for a sample."
            ),
        };
    }

    if let Some(se) = err.downcast_ref::<ShadeError>() {
        return match se {
            ShadeError::Config(_) => format!(
                "What happened: The config file could not be used.\nLikely causes: Wrong path, TOML syntax error, or a value rejected by validation.\nHow to fix: Check the file against etc/shade.toml. Details: {}",
                root_cause(err)
            ),
            ShadeError::Timeout => "What happened: The covering did not settle in time.\nLikely causes: Travel durations much longer than expected, or a move kept being superseded.\nHow to fix: Check timing.total_duration_*_s in the config.".to_string(),
            ShadeError::Transmission(m) => format!(
                "What happened: A code could not be transmitted ({m}).\nLikely causes: Transmitter offline or unreachable.\nHow to fix: Check the transport connection, then retry."
            ),
            ShadeError::Persistence(m) => format!(
                "What happened: The saved position could not be read or written ({m}).\nLikely causes: Missing permissions or a corrupt state file.\nHow to fix: Check state_file in the config; delete it to start from initial_position."
            ),
        };
    }

    // Generic fallback
    let msg = err.to_string();
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

fn root_cause(err: &eyre::Report) -> String {
    err.chain()
        .last()
        .map_or_else(|| err.to_string(), ToString::to_string)
}

/// Configuration problems exit with 2; everything else with 1.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if matches!(err.downcast_ref::<ShadeError>(), Some(ShadeError::Config(_)))
        || matches!(
            err.downcast_ref::<BuildError>(),
            Some(BuildError::InvalidConfig(_))
        )
    {
        return 2;
    }
    1
}

fn reason_name(err: &eyre::Report) -> &'static str {
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingTransmitter => "MissingTransmitter",
            BuildError::InvalidConfig(_) => "InvalidConfig",
        };
    }
    match err.downcast_ref::<ShadeError>() {
        Some(ShadeError::Config(_)) => "Config",
        Some(ShadeError::Timeout) => "Timeout",
        Some(ShadeError::Transmission(_)) => "Transmission",
        Some(ShadeError::Persistence(_)) => "Persistence",
        None => "Error",
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    serde_json::json!({ "reason": reason_name(err), "message": humanize(err) }).to_string()
}
