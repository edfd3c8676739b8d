#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TuningConfig {
    pub sensitivity: f64,
    pub edge_margin: f64,
    pub timeout_ms: u32,
    pub long_press_delay_ms: u32,
    pub base_duration_ms: u32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SwipeConfig {
    pub threshold: f64,
    pub edge_threshold: f64,
    pub min_lock_distance: f64,
    pub incorrect_drag_tolerance: f64,
    pub initial_tolerance: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HoldConfig {
    pub tolerance: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PinchConfig {
    pub threshold: f64,
    pub incorrect_drag_tolerance: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InterruptConfig {
    pub finger_count: u32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EngineConfig {
    pub tuning: TuningConfig,
    pub swipe: SwipeConfig,
    pub hold: HoldConfig,
    pub pinch: PinchConfig,
    pub interrupt: InterruptConfig,
}

include!(concat!(env!("OUT_DIR"), "/gesture_config.rs"));

pub fn active_config() -> &'static EngineConfig {
    &GESTURE_ENGINE_CONFIG
}

impl Default for EngineConfig {
    fn default() -> Self {
        *active_config()
    }
}
