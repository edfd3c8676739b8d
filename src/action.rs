use log::warn;

use crate::{
    state::GestureState,
    types::{Direction, PinchDirection, TouchEvent, TouchEventKind},
};

/// Timeout value that never elapses.
pub const NO_TIMEOUT: u32 = u32::MAX;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionStatus {
    Running,
    Completed,
    Cancelled,
}

/// Signals raised mid-chain by [`Action::OnComplete`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChainSignal {
    BeginDrag,
    InhibitForwarding,
}

/// Host timer the engine wants armed. The host answers by calling
/// `GestureManager::on_timer` once `delay` has passed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimerRequest {
    pub now: u32,
    pub delay: u32,
}

/// Side effects collected while one gesture processes one event.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ActionEffects {
    pub timer: Option<TimerRequest>,
    pub signals: heapless::Vec<ChainSignal, 4>,
}

impl ActionEffects {
    pub fn request_timer(&mut self, now: u32, delay: u32) {
        self.timer = Some(TimerRequest { now, delay });
    }

    pub fn signal(&mut self, signal: ChainSignal) {
        if self.signals.push(signal).is_err() {
            warn!("chain signal {signal:?} dropped, effect buffer full");
        }
    }
}

/// Read-only inputs of one action step.
#[derive(Clone, Copy, Debug)]
pub struct ActionInput<'a> {
    pub state: &'a GestureState,
    pub event: &'a TouchEvent,
    pub sensitivity: f64,
}

impl ActionInput<'_> {
    fn elapsed_since(&self, start_time: u32) -> u32 {
        self.event.time.saturating_sub(start_time)
    }

    fn any_finger_beyond(&self, tolerance: f64) -> bool {
        let limit = tolerance / self.sensitivity;
        self.state
            .fingers()
            .any(|(_, finger)| finger.drag().length_squared() > limit)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragParams {
    pub threshold: f64,
    pub move_tolerance: f64,
    pub initial_tolerance: f64,
    pub min_lock_distance: f64,
    pub timeout: u32,
}

/// Drag of all fingers together in one direction, locked once the centroid
/// moved far enough.
#[derive(Clone, Debug, PartialEq)]
pub struct MultiFingerDrag {
    pub params: DragParams,
    start_time: u32,
    target: Direction,
    finger_count: u32,
}

impl MultiFingerDrag {
    pub fn new(params: DragParams) -> Self {
        Self {
            params,
            start_time: 0,
            target: Direction::NONE,
            finger_count: 0,
        }
    }

    pub fn target(&self) -> Direction {
        self.target
    }

    /// Fingers on the surface at the last update. `reset` keeps it.
    pub fn finger_count(&self) -> u32 {
        self.finger_count
    }

    fn reset(&mut self, time: u32) {
        self.start_time = time;
        self.target = Direction::NONE;
    }

    fn update(&mut self, input: &ActionInput<'_>) -> ActionStatus {
        let params = &self.params;
        if input.elapsed_since(self.start_time) > params.timeout {
            return ActionStatus::Cancelled;
        }
        self.finger_count = input.state.len() as u32;

        match input.event.kind {
            TouchEventKind::Up => return ActionStatus::Cancelled,
            TouchEventKind::Down => {
                let settled = input
                    .state
                    .fingers()
                    .all(|(_, finger)| finger.drag().length() <= params.initial_tolerance);
                return if settled {
                    ActionStatus::Running
                } else {
                    ActionStatus::Cancelled
                };
            }
            TouchEventKind::Motion => {}
        }

        // A finger that joined late must not jump on its first move.
        if let Some(finger) = input.state.finger(input.event.finger) {
            let first_move = finger.previous == finger.origin;
            if finger.down_time > self.start_time
                && first_move
                && finger.drag().length() > params.initial_tolerance
            {
                return ActionStatus::Cancelled;
            }
        }

        let Some(centroid) = input.state.centroid() else {
            return ActionStatus::Running;
        };
        if self.target.is_empty() && centroid.drag().length() >= params.min_lock_distance {
            self.target = Direction::dominant(centroid.drag());
        }
        if self.target.is_empty() {
            return ActionStatus::Running;
        }

        let slipped = input
            .state
            .fingers()
            .any(|(_, finger)| finger.incorrect_drag_distance(self.target) > params.move_tolerance);
        if slipped {
            return ActionStatus::Cancelled;
        }

        if centroid.drag_distance(self.target) >= params.threshold / input.sensitivity {
            ActionStatus::Completed
        } else {
            ActionStatus::Running
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Liftoff {
    pub timeout: u32,
    start_time: u32,
}

impl Liftoff {
    pub fn new(timeout: u32) -> Self {
        Self {
            timeout,
            start_time: 0,
        }
    }

    fn update(&mut self, input: &ActionInput<'_>) -> ActionStatus {
        if input.elapsed_since(self.start_time) > self.timeout {
            return ActionStatus::Cancelled;
        }
        match input.event.kind {
            TouchEventKind::Up => ActionStatus::Completed,
            TouchEventKind::Down => ActionStatus::Cancelled,
            TouchEventKind::Motion => ActionStatus::Running,
        }
    }
}

/// `tolerance` is compared against the squared drag of each finger.
#[derive(Clone, Debug, PartialEq)]
pub struct MultiFingerTap {
    pub tolerance: f64,
    pub timeout: u32,
    start_time: u32,
}

impl MultiFingerTap {
    pub fn new(tolerance: f64, timeout: u32) -> Self {
        Self {
            tolerance,
            timeout,
            start_time: 0,
        }
    }

    fn update(&mut self, input: &ActionInput<'_>) -> ActionStatus {
        if input.elapsed_since(self.start_time) > self.timeout {
            return ActionStatus::Cancelled;
        }
        match input.event.kind {
            TouchEventKind::Up => ActionStatus::Completed,
            TouchEventKind::Motion if input.any_finger_beyond(self.tolerance) => {
                ActionStatus::Cancelled
            }
            _ => ActionStatus::Running,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct MultiFingerDown {
    pub min_fingers: u32,
    pub timeout: u32,
    start_time: u32,
}

impl MultiFingerDown {
    pub fn new(min_fingers: u32, timeout: u32) -> Self {
        Self {
            min_fingers,
            timeout,
            start_time: 0,
        }
    }

    fn update(&mut self, input: &ActionInput<'_>) -> ActionStatus {
        if input.elapsed_since(self.start_time) > self.timeout {
            return ActionStatus::Cancelled;
        }
        match input.event.kind {
            TouchEventKind::Up => ActionStatus::Cancelled,
            TouchEventKind::Down if input.state.len() as u32 >= self.min_fingers => {
                ActionStatus::Completed
            }
            _ => ActionStatus::Running,
        }
    }
}

/// Completes by surviving `delay` without lifting or drifting. Every down
/// restarts the wait and asks the host for a timer.
#[derive(Clone, Debug, PartialEq)]
pub struct LongPress {
    pub tolerance: f64,
    pub delay: u32,
    start_time: u32,
    finger_count: u32,
}

impl LongPress {
    pub fn new(tolerance: f64, delay: u32) -> Self {
        Self {
            tolerance,
            delay,
            start_time: 0,
            finger_count: 0,
        }
    }

    pub fn finger_count(&self) -> u32 {
        self.finger_count
    }

    fn reset(&mut self, time: u32) {
        self.start_time = time;
        self.finger_count = 0;
    }

    fn update(&mut self, input: &ActionInput<'_>, effects: &mut ActionEffects) -> ActionStatus {
        if input.elapsed_since(self.start_time) >= self.delay {
            return ActionStatus::Completed;
        }
        match input.event.kind {
            TouchEventKind::Motion if input.any_finger_beyond(self.tolerance) => {
                ActionStatus::Cancelled
            }
            TouchEventKind::Motion => ActionStatus::Running,
            TouchEventKind::Down => {
                self.start_time = input.event.time;
                self.finger_count = input.state.len() as u32;
                effects.request_timer(input.event.time, self.delay);
                ActionStatus::Running
            }
            TouchEventKind::Up => ActionStatus::Cancelled,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LiftAll {
    pub timeout: u32,
    start_time: u32,
}

impl LiftAll {
    pub fn new(timeout: u32) -> Self {
        Self {
            timeout,
            start_time: 0,
        }
    }

    fn update(&mut self, input: &ActionInput<'_>) -> ActionStatus {
        if input.elapsed_since(self.start_time) > self.timeout {
            return ActionStatus::Cancelled;
        }
        match input.event.kind {
            TouchEventKind::Up if input.state.remaining_after(input.event) == 0 => {
                ActionStatus::Completed
            }
            _ => ActionStatus::Running,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TouchUpOrDown {
    pub timeout: u32,
    start_time: u32,
}

impl TouchUpOrDown {
    pub fn new(timeout: u32) -> Self {
        Self {
            timeout,
            start_time: 0,
        }
    }

    fn update(&mut self, input: &ActionInput<'_>) -> ActionStatus {
        if input.elapsed_since(self.start_time) > self.timeout {
            return ActionStatus::Cancelled;
        }
        match input.event.kind {
            TouchEventKind::Up | TouchEventKind::Down => ActionStatus::Completed,
            TouchEventKind::Motion => ActionStatus::Running,
        }
    }
}

/// Spread or squeeze of the fingers around their centroid. `threshold` is the
/// scale ratio at sensitivity 1.0.
#[derive(Clone, Debug, PartialEq)]
pub struct Pinch {
    pub threshold: f64,
    pub move_tolerance: f64,
    finger_count: u32,
    result: Option<PinchDirection>,
}

impl Pinch {
    pub fn new(threshold: f64, move_tolerance: f64) -> Self {
        Self {
            threshold,
            move_tolerance,
            finger_count: 0,
            result: None,
        }
    }

    pub fn finger_count(&self) -> u32 {
        self.finger_count
    }

    pub fn result(&self) -> Option<PinchDirection> {
        self.result
    }

    fn reset(&mut self) {
        self.finger_count = 0;
        self.result = None;
    }

    fn update(&mut self, input: &ActionInput<'_>) -> ActionStatus {
        match input.event.kind {
            TouchEventKind::Up => return ActionStatus::Cancelled,
            TouchEventKind::Down => {
                self.finger_count = input.state.len() as u32;
                return ActionStatus::Running;
            }
            TouchEventKind::Motion => {}
        }

        let Some(centroid) = input.state.centroid() else {
            return ActionStatus::Running;
        };
        if centroid.drag().length() > self.move_tolerance {
            return ActionStatus::Cancelled;
        }

        let ratio = 1.0 + (self.threshold - 1.0) / input.sensitivity;
        let scale = input.state.pinch_scale();
        self.result = if scale >= ratio {
            Some(PinchDirection::Out)
        } else if scale <= 1.0 / ratio {
            Some(PinchDirection::In)
        } else {
            None
        };
        match self.result {
            Some(_) => ActionStatus::Completed,
            None => ActionStatus::Running,
        }
    }
}

/// One recognition step of a gesture chain.
#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    MultiFingerDrag(MultiFingerDrag),
    Liftoff(Liftoff),
    MultiFingerTap(MultiFingerTap),
    MultiFingerDown(MultiFingerDown),
    LongPress(LongPress),
    LiftAll(LiftAll),
    TouchUpOrDown(TouchUpOrDown),
    Pinch(Pinch),
    /// Runs `inner` and raises `signal` when it completes.
    OnComplete {
        inner: Box<Action>,
        signal: ChainSignal,
    },
}

impl Action {
    pub fn drag(params: DragParams) -> Self {
        Action::MultiFingerDrag(MultiFingerDrag::new(params))
    }

    pub fn liftoff(timeout: u32) -> Self {
        Action::Liftoff(Liftoff::new(timeout))
    }

    pub fn tap(tolerance: f64, timeout: u32) -> Self {
        Action::MultiFingerTap(MultiFingerTap::new(tolerance, timeout))
    }

    pub fn multi_down(min_fingers: u32, timeout: u32) -> Self {
        Action::MultiFingerDown(MultiFingerDown::new(min_fingers, timeout))
    }

    pub fn long_press(tolerance: f64, delay: u32) -> Self {
        Action::LongPress(LongPress::new(tolerance, delay))
    }

    pub fn lift_all(timeout: u32) -> Self {
        Action::LiftAll(LiftAll::new(timeout))
    }

    pub fn touch_up_or_down(timeout: u32) -> Self {
        Action::TouchUpOrDown(TouchUpOrDown::new(timeout))
    }

    pub fn pinch(threshold: f64, move_tolerance: f64) -> Self {
        Action::Pinch(Pinch::new(threshold, move_tolerance))
    }

    pub fn on_complete(self, signal: ChainSignal) -> Self {
        Action::OnComplete {
            inner: Box::new(self),
            signal,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Action::MultiFingerDrag(_) => "multi_finger_drag",
            Action::Liftoff(_) => "liftoff",
            Action::MultiFingerTap(_) => "multi_finger_tap",
            Action::MultiFingerDown(_) => "multi_finger_down",
            Action::LongPress(_) => "long_press",
            Action::LiftAll(_) => "lift_all",
            Action::TouchUpOrDown(_) => "touch_up_or_down",
            Action::Pinch(_) => "pinch",
            Action::OnComplete { inner, .. } => inner.name(),
        }
    }

    /// Restarts the action at `time`. Only touches action-local state.
    pub fn reset(&mut self, time: u32) {
        match self {
            Action::MultiFingerDrag(drag) => drag.reset(time),
            Action::Liftoff(action) => action.start_time = time,
            Action::MultiFingerTap(action) => action.start_time = time,
            Action::MultiFingerDown(action) => action.start_time = time,
            Action::LongPress(action) => action.reset(time),
            Action::LiftAll(action) => action.start_time = time,
            Action::TouchUpOrDown(action) => action.start_time = time,
            Action::Pinch(pinch) => pinch.reset(),
            Action::OnComplete { inner, .. } => inner.reset(time),
        }
    }

    pub fn update(&mut self, input: &ActionInput<'_>, effects: &mut ActionEffects) -> ActionStatus {
        match self {
            Action::MultiFingerDrag(drag) => drag.update(input),
            Action::Liftoff(action) => action.update(input),
            Action::MultiFingerTap(action) => action.update(input),
            Action::MultiFingerDown(action) => action.update(input),
            Action::LongPress(action) => action.update(input, effects),
            Action::LiftAll(action) => action.update(input),
            Action::TouchUpOrDown(action) => action.update(input),
            Action::Pinch(pinch) => pinch.update(input),
            Action::OnComplete { inner, signal } => {
                let status = inner.update(input, effects);
                if status == ActionStatus::Completed {
                    effects.signal(*signal);
                }
                status
            }
        }
    }

    pub fn as_drag(&self) -> Option<&MultiFingerDrag> {
        match self {
            Action::MultiFingerDrag(drag) => Some(drag),
            Action::OnComplete { inner, .. } => inner.as_drag(),
            _ => None,
        }
    }

    pub fn as_pinch(&self) -> Option<&Pinch> {
        match self {
            Action::Pinch(pinch) => Some(pinch),
            Action::OnComplete { inner, .. } => inner.as_pinch(),
            _ => None,
        }
    }

    pub fn as_long_press(&self) -> Option<&LongPress> {
        match self {
            Action::LongPress(press) => Some(press),
            Action::OnComplete { inner, .. } => inner.as_long_press(),
            _ => None,
        }
    }

    pub fn arms_timer(&self) -> bool {
        match self {
            Action::LongPress(_) => true,
            Action::OnComplete { inner, .. } => inner.arms_timer(),
            _ => false,
        }
    }
}
