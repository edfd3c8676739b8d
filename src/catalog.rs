//! Builders for the gesture chains a touch shell usually registers.

use crate::{
    action::{Action, ChainSignal, DragParams, NO_TIMEOUT},
    chain::Gesture,
    config::EngineConfig,
    types::GestureKind,
};

const EDGE_RELEASE_FACTOR: f64 = 1.5;

pub fn swipe_params(config: &EngineConfig) -> DragParams {
    DragParams {
        threshold: config.swipe.threshold,
        move_tolerance: config.swipe.incorrect_drag_tolerance,
        initial_tolerance: config.swipe.initial_tolerance,
        min_lock_distance: config.swipe.min_lock_distance,
        timeout: config.tuning.timeout_ms,
    }
}

pub fn edge_params(config: &EngineConfig) -> DragParams {
    DragParams {
        threshold: config.swipe.edge_threshold,
        ..swipe_params(config)
    }
}

/// Time allowed between an edge drag reaching its threshold and the release.
pub fn edge_release_timeout(config: &EngineConfig) -> u32 {
    let scaled =
        f64::from(config.tuning.base_duration_ms) * EDGE_RELEASE_FACTOR * config.tuning.sensitivity;
    scaled.round().clamp(0.0, f64::from(u32::MAX - 1)) as u32
}

/// Gate in front of the swipe drag: enough fingers must land within the base
/// duration. One-finger drags are left to the edge chain.
fn swipe_fingers(config: &EngineConfig) -> Action {
    Action::multi_down(config.interrupt.finger_count, config.tuning.base_duration_ms)
        .on_complete(ChainSignal::InhibitForwarding)
}

/// Multi-finger swipe that reports once the fingers lift.
pub fn swipe(config: &EngineConfig) -> Gesture {
    Gesture::new(
        GestureKind::Swipe,
        vec![
            swipe_fingers(config),
            Action::drag(swipe_params(config)),
            Action::liftoff(NO_TIMEOUT),
        ],
    )
}

/// Swipe that also starts a drag as soon as the threshold is crossed, e.g. for
/// workspace swipe emulation.
pub fn swipe_drag(config: &EngineConfig) -> Gesture {
    Gesture::new(
        GestureKind::Swipe,
        vec![
            swipe_fingers(config),
            Action::drag(swipe_params(config)).on_complete(ChainSignal::BeginDrag),
            Action::liftoff(NO_TIMEOUT),
        ],
    )
}

/// Swipe that only reports when its centroid started inside an edge margin.
pub fn edge_swipe(config: &EngineConfig) -> Gesture {
    Gesture::new(
        GestureKind::EdgeSwipe,
        vec![
            Action::drag(edge_params(config)),
            Action::liftoff(edge_release_timeout(config)),
        ],
    )
}

pub fn edge_swipe_drag(config: &EngineConfig) -> Gesture {
    Gesture::new(
        GestureKind::EdgeSwipe,
        vec![
            Action::drag(edge_params(config)).on_complete(ChainSignal::BeginDrag),
            Action::liftoff(edge_release_timeout(config)),
        ],
    )
}

pub fn tap(config: &EngineConfig) -> Gesture {
    Gesture::new(
        GestureKind::Tap,
        vec![Action::tap(
            config.hold.tolerance,
            config.tuning.long_press_delay_ms,
        )],
    )
}

/// Long press that turns into a drag and ends on the next contact change.
pub fn long_press(config: &EngineConfig) -> Gesture {
    Gesture::new(
        GestureKind::LongPress,
        vec![
            Action::long_press(config.hold.tolerance, config.tuning.long_press_delay_ms)
                .on_complete(ChainSignal::BeginDrag),
            Action::touch_up_or_down(NO_TIMEOUT),
        ],
    )
}

pub fn pinch(config: &EngineConfig) -> Gesture {
    Gesture::new(
        GestureKind::Pinch,
        vec![
            Action::pinch(config.pinch.threshold, config.pinch.incorrect_drag_tolerance)
                .on_complete(ChainSignal::BeginDrag),
            Action::lift_all(NO_TIMEOUT),
        ],
    )
}

/// Several fingers landing quickly: stop forwarding the touch stream to
/// clients so they do not act on it.
pub fn interrupt(config: &EngineConfig) -> Gesture {
    Gesture::new(
        GestureKind::Interrupt,
        vec![Action::multi_down(
            config.interrupt.finger_count,
            config.tuning.base_duration_ms,
        )
        .on_complete(ChainSignal::InhibitForwarding)],
    )
}

/// Every standard chain, in the order a manager should evaluate them.
pub fn standard_set(config: &EngineConfig) -> Vec<Gesture> {
    vec![
        interrupt(config),
        swipe(config),
        edge_swipe(config),
        tap(config),
        long_press(config),
        pinch(config),
    ]
}
