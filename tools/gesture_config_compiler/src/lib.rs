use std::{fmt::Write as _, fs, path::Path};

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigCompilerError {
    #[error("failed to read {path}: {message}")]
    Io { path: String, message: String },
    #[error("parse error: {0}")]
    Parse(String),
    #[error("validation error: {0}")]
    Validation(String),
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct GestureConfigFile {
    pub tuning: TuningSection,
    pub swipe: SwipeSection,
    pub hold: HoldSection,
    pub pinch: PinchSection,
    pub interrupt: InterruptSection,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TuningSection {
    pub sensitivity: f64,
    pub edge_margin: f64,
    pub timeout_ms: u32,
    pub long_press_delay_ms: u32,
    pub base_duration_ms: u32,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SwipeSection {
    pub threshold: f64,
    pub edge_threshold: f64,
    pub min_lock_distance: f64,
    pub incorrect_drag_tolerance: f64,
    pub initial_tolerance: f64,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct HoldSection {
    pub tolerance: f64,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PinchSection {
    pub threshold: f64,
    pub incorrect_drag_tolerance: f64,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct InterruptSection {
    pub finger_count: u32,
}

pub fn parse_gestures_file(path: &Path) -> Result<GestureConfigFile, ConfigCompilerError> {
    let raw = fs::read_to_string(path).map_err(|e| ConfigCompilerError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    parse_gestures_str(&raw)
}

pub fn parse_gestures_str(raw: &str) -> Result<GestureConfigFile, ConfigCompilerError> {
    toml::from_str(raw).map_err(|e| ConfigCompilerError::Parse(e.to_string()))
}

pub fn validate_config(config: &GestureConfigFile) -> Result<(), ConfigCompilerError> {
    let tuning = &config.tuning;
    if !(tuning.sensitivity.is_finite() && tuning.sensitivity > 0.0) {
        return Err(validation("tuning.sensitivity must be a finite value > 0"));
    }
    if !(tuning.edge_margin.is_finite() && tuning.edge_margin >= 0.0) {
        return Err(validation("tuning.edge_margin must be a finite value >= 0"));
    }
    for (name, value) in [
        ("tuning.timeout_ms", tuning.timeout_ms),
        ("tuning.long_press_delay_ms", tuning.long_press_delay_ms),
        ("tuning.base_duration_ms", tuning.base_duration_ms),
    ] {
        if value == 0 {
            return Err(validation(&format!("{name} must be > 0")));
        }
    }

    let swipe = &config.swipe;
    let distances = [
        swipe.threshold,
        swipe.edge_threshold,
        swipe.min_lock_distance,
        swipe.incorrect_drag_tolerance,
        swipe.initial_tolerance,
    ];
    if distances.iter().any(|d| !(d.is_finite() && *d > 0.0)) {
        return Err(validation("all swipe distances must be positive"));
    }
    if swipe.threshold < swipe.min_lock_distance {
        return Err(validation(
            "swipe.threshold must be >= swipe.min_lock_distance",
        ));
    }
    if swipe.edge_threshold < swipe.min_lock_distance {
        return Err(validation(
            "swipe.edge_threshold must be >= swipe.min_lock_distance",
        ));
    }

    if !(config.hold.tolerance.is_finite() && config.hold.tolerance > 0.0) {
        return Err(validation("hold.tolerance must be > 0"));
    }

    let pinch = &config.pinch;
    if !(pinch.threshold.is_finite() && pinch.threshold > 1.0) {
        return Err(validation("pinch.threshold must be > 1.0"));
    }
    if !(pinch.incorrect_drag_tolerance.is_finite() && pinch.incorrect_drag_tolerance > 0.0) {
        return Err(validation("pinch.incorrect_drag_tolerance must be > 0"));
    }

    if config.interrupt.finger_count < 2 {
        return Err(validation("interrupt.finger_count must be >= 2"));
    }

    Ok(())
}

pub fn render_generated_config(config: &GestureConfigFile) -> String {
    let tuning = &config.tuning;
    let swipe = &config.swipe;
    let mut out = String::new();

    out.push_str("// @generated by gesture_config_compiler from config/gestures.toml\n");
    out.push_str("pub const GESTURE_ENGINE_CONFIG: EngineConfig = EngineConfig {\n");

    out.push_str("    tuning: TuningConfig {\n");
    push_field(&mut out, "sensitivity", float(tuning.sensitivity));
    push_field(&mut out, "edge_margin", float(tuning.edge_margin));
    push_field(&mut out, "timeout_ms", tuning.timeout_ms.to_string());
    push_field(
        &mut out,
        "long_press_delay_ms",
        tuning.long_press_delay_ms.to_string(),
    );
    push_field(
        &mut out,
        "base_duration_ms",
        tuning.base_duration_ms.to_string(),
    );
    out.push_str("    },\n");

    out.push_str("    swipe: SwipeConfig {\n");
    push_field(&mut out, "threshold", float(swipe.threshold));
    push_field(&mut out, "edge_threshold", float(swipe.edge_threshold));
    push_field(&mut out, "min_lock_distance", float(swipe.min_lock_distance));
    push_field(
        &mut out,
        "incorrect_drag_tolerance",
        float(swipe.incorrect_drag_tolerance),
    );
    push_field(&mut out, "initial_tolerance", float(swipe.initial_tolerance));
    out.push_str("    },\n");

    out.push_str("    hold: HoldConfig {\n");
    push_field(&mut out, "tolerance", float(config.hold.tolerance));
    out.push_str("    },\n");

    out.push_str("    pinch: PinchConfig {\n");
    push_field(&mut out, "threshold", float(config.pinch.threshold));
    push_field(
        &mut out,
        "incorrect_drag_tolerance",
        float(config.pinch.incorrect_drag_tolerance),
    );
    out.push_str("    },\n");

    out.push_str("    interrupt: InterruptConfig {\n");
    push_field(
        &mut out,
        "finger_count",
        config.interrupt.finger_count.to_string(),
    );
    out.push_str("    },\n");

    out.push_str("};\n");
    out
}

pub fn generate_from_path(path: &Path) -> Result<String, ConfigCompilerError> {
    let config = parse_gestures_file(path)?;
    validate_config(&config)?;
    Ok(render_generated_config(&config))
}

fn push_field(out: &mut String, name: &str, value: String) {
    let _ = writeln!(out, "        {name}: {value},");
}

// Debug formatting keeps a trailing `.0` so the literal stays an f64.
fn float(value: f64) -> String {
    format!("{value:?}")
}

fn validation(message: &str) -> ConfigCompilerError {
    ConfigCompilerError::Validation(message.to_string())
}
