use log::{debug, info};
use statig::prelude::*;

use super::{DispatchOutput, DispatchStateId, DispatchTrace, GestureEvent};
use crate::{
    action::{Action, ActionEffects, ChainSignal},
    chain::{ChainStep, Gesture, Life},
    config::EngineConfig,
    state::GestureState,
    types::{
        CompletedGesture, Direction, GestureKind, MonitorArea, Point, TouchEvent, TouchEventKind,
    },
};

#[derive(Clone, Copy, Debug)]
pub(super) enum HsmEvent {
    Touch(TouchEvent),
    Timer { time: u32 },
    Register,
    SetSensitivity(f64),
}

#[derive(Default)]
pub(super) struct DispatchContext {
    pub(super) incoming: Option<Gesture>,
    pub(super) output: DispatchOutput,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct ActiveDrag {
    owner: usize,
    gesture: CompletedGesture,
}

#[derive(Default)]
struct StepTally {
    completed: usize,
    cancelled: usize,
}

pub(super) struct DispatchHsm {
    config: EngineConfig,
    area: MonitorArea,
    state: GestureState,
    gestures: Vec<Gesture>,
    inhibit: bool,
    drag: Option<ActiveDrag>,
    last_trace: DispatchTrace,
}

impl DispatchHsm {
    pub(super) fn new(area: MonitorArea, config: EngineConfig) -> Self {
        Self {
            config,
            area,
            state: GestureState::new(),
            gestures: Vec::new(),
            inhibit: false,
            drag: None,
            last_trace: DispatchTrace::default(),
        }
    }

    pub(super) fn state(&self) -> &GestureState {
        &self.state
    }

    pub(super) fn gestures(&self) -> &[Gesture] {
        &self.gestures
    }

    pub(super) fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub(super) fn area(&self) -> MonitorArea {
        self.area
    }

    pub(super) fn inhibit(&self) -> bool {
        self.inhibit
    }

    pub(super) fn active_drag(&self) -> Option<CompletedGesture> {
        self.drag.map(|drag| drag.gesture)
    }

    pub(super) fn last_trace(&self) -> DispatchTrace {
        self.last_trace
    }

    pub(super) fn find_swipe_edges(&self, point: Point) -> Direction {
        self.area.swipe_edges(point, self.config.tuning.edge_margin)
    }

    fn accepts(&self, event: &TouchEvent) -> bool {
        let known = self.state.contains(event.finger);
        match event.kind {
            TouchEventKind::Down => !known,
            TouchEventKind::Motion | TouchEventKind::Up => known,
        }
    }

    fn timer_event(&self, time: u32) -> Option<TouchEvent> {
        let (finger, tracked) = self.state.first()?;
        Some(TouchEvent::new(
            TouchEventKind::Motion,
            time,
            finger,
            tracked.current,
        ))
    }

    /// One physical finger on an empty surface starts a new interaction.
    fn begin_interaction(&mut self, context: &mut DispatchContext, time: u32) {
        self.inhibit = false;
        if let Some(stale) = self.drag.take() {
            context.output.events.push(GestureEvent::DragEnd {
                time,
                drag: stale.gesture,
                cancelled: true,
            });
        }
        for gesture in &mut self.gestures {
            if gesture.life() == Life::Running {
                debug!("restarting unfinished {} chain", gesture.kind().label());
                gesture.reset(time);
            }
        }
    }

    /// Runs one accepted event through state and every chain. Downs are
    /// applied before the chains run, motions and ups after.
    fn process(&mut self, context: &mut DispatchContext, event: &TouchEvent) {
        if event.kind == TouchEventKind::Down {
            self.state.update(event);
            if self.state.len() == 1 {
                self.begin_interaction(context, event.time);
            }
        }

        let sensitivity = self.config.tuning.sensitivity;
        let margin = self.config.tuning.edge_margin;
        let mut tally = StepTally::default();
        let Self {
            state,
            gestures,
            inhibit,
            drag,
            area,
            ..
        } = self;
        let output = &mut context.output;
        let view = state.projected(event);

        for (index, gesture) in gestures.iter_mut().enumerate() {
            let mut effects = ActionEffects::default();
            let step = gesture.update(&view, event, sensitivity, &mut effects);

            if let Some(timer) = effects.timer {
                output.events.push(GestureEvent::ArmTimer {
                    deadline: timer.now.saturating_add(timer.delay).saturating_add(1),
                    delay: timer.delay,
                });
            }

            for signal in effects.signals.iter().copied() {
                match signal {
                    ChainSignal::BeginDrag => {
                        if drag.is_some() {
                            continue;
                        }
                        let Some(description) = describe(gesture, &view, area, margin) else {
                            debug!("{} drag has no description", gesture.kind().label());
                            continue;
                        };
                        *drag = Some(ActiveDrag {
                            owner: index,
                            gesture: description,
                        });
                        *inhibit = true;
                        output.events.push(GestureEvent::DragBegin {
                            time: event.time,
                            drag: description,
                        });
                    }
                    ChainSignal::InhibitForwarding => {
                        if !*inhibit {
                            output
                                .events
                                .push(GestureEvent::CancelForwarded { time: event.time });
                        }
                        *inhibit = true;
                    }
                }
            }

            let (finished, cancelled) = match step {
                ChainStep::Advanced { finished } => {
                    if gesture.action(finished).is_some_and(Action::arms_timer) {
                        output.events.push(GestureEvent::StopTimer);
                    }
                    continue;
                }
                ChainStep::Completed { finished } => (finished, false),
                ChainStep::Cancelled { at } => (at, true),
                ChainStep::Ignored | ChainStep::Running => continue,
            };

            if gesture.action(finished).is_some_and(Action::arms_timer) {
                output.events.push(GestureEvent::StopTimer);
            }
            if let Some(owned) = drag.filter(|active| active.owner == index) {
                *drag = None;
                output.events.push(GestureEvent::DragEnd {
                    time: event.time,
                    drag: owned.gesture,
                    cancelled,
                });
            }

            if cancelled {
                tally.cancelled += 1;
                output.events.push(GestureEvent::Cancelled {
                    time: event.time,
                    kind: gesture.kind(),
                });
                continue;
            }

            tally.completed += 1;
            let description = describe(gesture, &view, area, margin);
            gesture.notify_complete(description.as_ref());
            match description {
                Some(description) => {
                    info!("gesture completed: {description}");
                    *inhibit = true;
                    output.events.push(GestureEvent::Completed {
                        time: event.time,
                        gesture: description,
                    });
                }
                None => debug!(
                    "{} chain completed without a description",
                    gesture.kind().label()
                ),
            }
        }
        drop(view);

        if event.kind != TouchEventKind::Down {
            self.state.update(event);
        }
        context.output.consume = self.inhibit;
        self.record_trace(event, tally);
    }

    fn next_state_id(&self) -> DispatchStateId {
        if self.state.is_empty() {
            DispatchStateId::Idle
        } else if self.drag.is_some() {
            DispatchStateId::Dragging
        } else {
            DispatchStateId::Touching
        }
    }

    fn settle(&mut self, current: DispatchStateId) -> Outcome<State> {
        let next = self.next_state_id();
        self.last_trace.state_id = next;
        if next == current {
            return Handled;
        }
        match next {
            DispatchStateId::Idle => Transition(State::idle()),
            DispatchStateId::Touching => Transition(State::touching()),
            DispatchStateId::Dragging => Transition(State::dragging()),
        }
    }

    fn record_trace(&mut self, event: &TouchEvent, tally: StepTally) {
        self.last_trace = DispatchTrace {
            time: event.time,
            event: Some(event.kind),
            state_id: self.last_trace.state_id,
            fingers: self.state.len(),
            running: self
                .gestures
                .iter()
                .filter(|gesture| gesture.life() == Life::Running)
                .count(),
            completed: tally.completed,
            cancelled: tally.cancelled,
            ignored: false,
        };
    }

    fn ignore(&mut self, event: &TouchEvent) {
        debug!(
            "ignoring {:?} for finger {} at {}",
            event.kind, event.finger, event.time
        );
        self.last_trace.time = event.time;
        self.last_trace.event = Some(event.kind);
        self.last_trace.completed = 0;
        self.last_trace.cancelled = 0;
        self.last_trace.ignored = true;
    }

    fn handle_touch(
        &mut self,
        context: &mut DispatchContext,
        event: &TouchEvent,
        current: DispatchStateId,
    ) -> Outcome<State> {
        if !self.accepts(event) {
            self.ignore(event);
            return Handled;
        }
        self.process(context, event);
        if current == DispatchStateId::Dragging {
            self.push_drag_update(context, event.time);
        }
        self.settle(current)
    }

    fn push_drag_update(&self, context: &mut DispatchContext, time: u32) {
        if self.drag.is_none() {
            return;
        }
        if let Some(centroid) = self.state.centroid() {
            context.output.events.push(GestureEvent::DragUpdate {
                time,
                position: centroid.current,
            });
        }
    }
}

/// Structured description of what `gesture` recognized, read from its
/// actions and the state the chain just observed.
fn describe(
    gesture: &Gesture,
    view: &GestureState,
    area: &MonitorArea,
    margin: f64,
) -> Option<CompletedGesture> {
    let actions = gesture.actions();
    match gesture.kind() {
        GestureKind::Swipe => {
            let drag = actions.iter().find_map(Action::as_drag)?;
            if drag.target().is_empty() {
                return None;
            }
            Some(CompletedGesture::Swipe {
                direction: drag.target(),
                fingers: view.len() as u32,
            })
        }
        GestureKind::EdgeSwipe => {
            let drag = actions.iter().find_map(Action::as_drag)?;
            let origin = area.swipe_edges(view.centroid()?.origin, margin);
            if origin.is_empty() || drag.target().is_empty() {
                return None;
            }
            Some(CompletedGesture::EdgeSwipe {
                origin,
                direction: drag.target(),
                fingers: view.len() as u32,
            })
        }
        GestureKind::Tap => Some(CompletedGesture::Tap {
            fingers: view.len() as u32,
        }),
        GestureKind::LongPress => {
            let fingers = actions
                .iter()
                .find_map(Action::as_long_press)
                .map_or(view.len() as u32, |press| press.finger_count());
            Some(CompletedGesture::LongPress { fingers })
        }
        GestureKind::Pinch => {
            let pinch = actions.iter().find_map(Action::as_pinch)?;
            Some(CompletedGesture::Pinch {
                direction: pinch.result()?,
                fingers: pinch.finger_count(),
            })
        }
        GestureKind::Interrupt => None,
    }
}

#[state_machine(initial = "State::idle()")]
impl DispatchHsm {
    #[state(superstate = "registry")]
    fn idle(&mut self, context: &mut DispatchContext, event: &HsmEvent) -> Outcome<State> {
        match event {
            HsmEvent::Touch(touch) => self.handle_touch(context, touch, DispatchStateId::Idle),
            HsmEvent::Timer { .. } => Handled,
            _ => Super,
        }
    }

    #[state(superstate = "registry")]
    fn touching(&mut self, context: &mut DispatchContext, event: &HsmEvent) -> Outcome<State> {
        match event {
            HsmEvent::Touch(touch) => {
                self.handle_touch(context, touch, DispatchStateId::Touching)
            }
            HsmEvent::Timer { time } => match self.timer_event(*time) {
                Some(touch) => self.handle_touch(context, &touch, DispatchStateId::Touching),
                None => Handled,
            },
            _ => Super,
        }
    }

    #[state(superstate = "registry")]
    fn dragging(&mut self, context: &mut DispatchContext, event: &HsmEvent) -> Outcome<State> {
        match event {
            HsmEvent::Touch(touch) => {
                self.handle_touch(context, touch, DispatchStateId::Dragging)
            }
            HsmEvent::Timer { time } => match self.timer_event(*time) {
                Some(touch) => self.handle_touch(context, &touch, DispatchStateId::Dragging),
                None => Handled,
            },
            _ => Super,
        }
    }

    #[superstate]
    fn registry(&mut self, context: &mut DispatchContext, event: &HsmEvent) -> Outcome<State> {
        match event {
            HsmEvent::Register => {
                if let Some(gesture) = context.incoming.take() {
                    debug!("registered {} chain", gesture.kind().label());
                    self.gestures.push(gesture);
                }
                Handled
            }
            HsmEvent::SetSensitivity(sensitivity) => {
                self.config.tuning.sensitivity = *sensitivity;
                Handled
            }
            _ => Handled,
        }
    }
}
