// @generated by gesture_config_compiler from config/gestures.toml
pub const GESTURE_ENGINE_CONFIG: EngineConfig = EngineConfig {
    tuning: TuningConfig {
        sensitivity: 1.0,
        edge_margin: 10.0,
        timeout_ms: 400,
        long_press_delay_ms: 400,
        base_duration_ms: 400,
    },
    swipe: SwipeConfig {
        threshold: 150.0,
        edge_threshold: 450.0,
        min_lock_distance: 30.0,
        incorrect_drag_tolerance: 150.0,
        initial_tolerance: 40.0,
    },
    hold: HoldConfig {
        tolerance: 150.0,
    },
    pinch: PinchConfig {
        threshold: 1.5,
        incorrect_drag_tolerance: 200.0,
    },
    interrupt: InterruptConfig {
        finger_count: 3,
    },
};
