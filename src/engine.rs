use statig::blocking::IntoStateMachineExt as _;

mod machine;

use machine::{DispatchContext, DispatchHsm, HsmEvent};

use crate::{
    catalog,
    chain::Gesture,
    config::{active_config, EngineConfig},
    state::GestureState,
    types::{
        CompletedGesture, Direction, FingerId, GestureKind, MonitorArea, Point, TouchEvent,
        TouchEventKind,
    },
};

/// Everything a dispatched event produced, in emission order.
#[derive(Clone, Debug, PartialEq)]
pub enum GestureEvent {
    Completed {
        time: u32,
        gesture: CompletedGesture,
    },
    Cancelled {
        time: u32,
        kind: GestureKind,
    },
    DragBegin {
        time: u32,
        drag: CompletedGesture,
    },
    DragUpdate {
        time: u32,
        position: Point,
    },
    DragEnd {
        time: u32,
        drag: CompletedGesture,
        cancelled: bool,
    },
    /// Call [`GestureManager::on_timer`] at `deadline`.
    ArmTimer {
        deadline: u32,
        delay: u32,
    },
    StopTimer,
    /// Raw touches of this interaction should no longer reach clients, and
    /// the ones already forwarded should be cancelled.
    CancelForwarded {
        time: u32,
    },
}

impl GestureEvent {
    pub fn label(&self) -> &'static str {
        match self {
            GestureEvent::Completed { .. } => "completed",
            GestureEvent::Cancelled { .. } => "cancelled",
            GestureEvent::DragBegin { .. } => "drag_begin",
            GestureEvent::DragUpdate { .. } => "drag_update",
            GestureEvent::DragEnd { .. } => "drag_end",
            GestureEvent::ArmTimer { .. } => "arm_timer",
            GestureEvent::StopTimer => "stop_timer",
            GestureEvent::CancelForwarded { .. } => "cancel_forwarded",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DispatchOutput {
    /// Whether the host should keep the raw event away from clients.
    pub consume: bool,
    pub events: Vec<GestureEvent>,
}

impl DispatchOutput {
    pub fn completed(&self) -> impl Iterator<Item = &CompletedGesture> {
        self.events.iter().filter_map(|event| match event {
            GestureEvent::Completed { gesture, .. } => Some(gesture),
            _ => None,
        })
    }

    pub fn cancelled(&self) -> impl Iterator<Item = GestureKind> + '_ {
        self.events.iter().filter_map(|event| match event {
            GestureEvent::Cancelled { kind, .. } => Some(*kind),
            _ => None,
        })
    }

    pub fn timer_request(&self) -> Option<(u32, u32)> {
        self.events.iter().rev().find_map(|event| match event {
            GestureEvent::ArmTimer { deadline, delay } => Some((*deadline, *delay)),
            _ => None,
        })
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DispatchStateId {
    #[default]
    Idle,
    Touching,
    Dragging,
}

/// Snapshot of the most recent dispatch, for logging and replay tooling.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DispatchTrace {
    pub time: u32,
    pub event: Option<TouchEventKind>,
    pub state_id: DispatchStateId,
    pub fingers: usize,
    pub running: usize,
    pub completed: usize,
    pub cancelled: usize,
    pub ignored: bool,
}

/// Registry of gesture chains fed from one touch surface.
pub struct GestureManager {
    machine: statig::blocking::StateMachine<DispatchHsm>,
}

impl GestureManager {
    pub fn new(area: MonitorArea) -> Self {
        Self::with_config(area, *active_config())
    }

    pub fn with_config(area: MonitorArea, config: EngineConfig) -> Self {
        Self {
            machine: DispatchHsm::new(area, config).state_machine(),
        }
    }

    /// Manager with every chain from [`catalog::standard_set`] registered.
    pub fn with_standard_gestures(area: MonitorArea, config: EngineConfig) -> Self {
        let mut manager = Self::with_config(area, config);
        for gesture in catalog::standard_set(&config) {
            manager.add_gesture(gesture);
        }
        manager
    }

    pub fn add_gesture(&mut self, gesture: Gesture) {
        let mut context = DispatchContext {
            incoming: Some(gesture),
            ..DispatchContext::default()
        };
        self.machine
            .handle_with_context(&HsmEvent::Register, &mut context);
    }

    pub fn dispatch(&mut self, event: TouchEvent) -> DispatchOutput {
        let mut context = DispatchContext::default();
        self.machine
            .handle_with_context(&HsmEvent::Touch(event), &mut context);
        context.output
    }

    pub fn on_touch_down(&mut self, time: u32, finger: FingerId, position: Point) -> DispatchOutput {
        self.dispatch(TouchEvent::new(TouchEventKind::Down, time, finger, position))
    }

    pub fn on_touch_move(&mut self, time: u32, finger: FingerId, position: Point) -> DispatchOutput {
        self.dispatch(TouchEvent::new(TouchEventKind::Motion, time, finger, position))
    }

    pub fn on_touch_up(&mut self, time: u32, finger: FingerId, position: Point) -> DispatchOutput {
        self.dispatch(TouchEvent::new(TouchEventKind::Up, time, finger, position))
    }

    /// Host timer expiry. Replays the first tracked finger at its current
    /// position so time-based actions get evaluated.
    pub fn on_timer(&mut self, time: u32) -> DispatchOutput {
        let mut context = DispatchContext::default();
        self.machine
            .handle_with_context(&HsmEvent::Timer { time }, &mut context);
        context.output
    }

    pub fn set_sensitivity(&mut self, sensitivity: f64) {
        let mut context = DispatchContext::default();
        self.machine
            .handle_with_context(&HsmEvent::SetSensitivity(sensitivity), &mut context);
    }

    pub fn find_swipe_edges(&self, point: Point) -> Direction {
        self.machine.inner().find_swipe_edges(point)
    }

    pub fn state(&self) -> &GestureState {
        self.machine.inner().state()
    }

    pub fn gestures(&self) -> &[Gesture] {
        self.machine.inner().gestures()
    }

    pub fn config(&self) -> &EngineConfig {
        self.machine.inner().config()
    }

    pub fn area(&self) -> MonitorArea {
        self.machine.inner().area()
    }

    pub fn is_consuming(&self) -> bool {
        self.machine.inner().inhibit()
    }

    pub fn active_drag(&self) -> Option<CompletedGesture> {
        self.machine.inner().active_drag()
    }

    pub fn last_trace(&self) -> DispatchTrace {
        self.machine.inner().last_trace()
    }
}

#[cfg(test)]
mod tests;
