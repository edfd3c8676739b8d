use core::fmt;

use log::trace;

use crate::{
    action::{Action, ActionEffects, ActionInput, ActionStatus},
    state::GestureState,
    types::{CompletedGesture, GestureKind, TouchEvent, TouchEventKind},
};

/// Runs whenever the last action completes. The argument is `None` when the
/// chain recognized nothing reportable, e.g. an interrupt.
pub type CompleteCallback = Box<dyn FnMut(Option<&CompletedGesture>)>;
pub type CancelCallback = Box<dyn FnMut()>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Life {
    /// Registered but never started.
    Idle,
    Running,
    Completed,
    Cancelled,
}

/// What one event did to a chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChainStep {
    Ignored,
    Running,
    Advanced { finished: usize },
    Completed { finished: usize },
    Cancelled { at: usize },
}

/// Ordered actions run one after another; the chain completes with its last
/// action and dies with any cancelled one.
pub struct Gesture {
    kind: GestureKind,
    actions: Vec<Action>,
    cursor: usize,
    life: Life,
    on_complete: Option<CompleteCallback>,
    on_cancel: Option<CancelCallback>,
}

impl Gesture {
    pub fn new(kind: GestureKind, actions: Vec<Action>) -> Self {
        Self {
            kind,
            actions,
            cursor: 0,
            life: Life::Idle,
            on_complete: None,
            on_cancel: None,
        }
    }

    pub fn on_complete(mut self, callback: impl FnMut(Option<&CompletedGesture>) + 'static) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }

    pub fn on_cancel(mut self, callback: impl FnMut() + 'static) -> Self {
        self.on_cancel = Some(Box::new(callback));
        self
    }

    pub fn kind(&self) -> GestureKind {
        self.kind
    }

    pub fn life(&self) -> Life {
        self.life
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn action(&self, index: usize) -> Option<&Action> {
        self.actions.get(index)
    }

    pub fn current(&self) -> Option<&Action> {
        match self.life {
            Life::Running => self.actions.get(self.cursor),
            _ => None,
        }
    }

    pub fn is_terminated(&self) -> bool {
        self.life != Life::Running
    }

    pub fn reset(&mut self, time: u32) {
        self.cursor = 0;
        for action in &mut self.actions {
            action.reset(time);
        }
        self.life = Life::Running;
    }

    /// Feeds `event` to the current action. `state` is the view actions are
    /// allowed to see for this event.
    pub fn update(
        &mut self,
        state: &GestureState,
        event: &TouchEvent,
        sensitivity: f64,
        effects: &mut ActionEffects,
    ) -> ChainStep {
        if self.is_terminated() && event.kind == TouchEventKind::Down && state.len() == 1 {
            self.reset(event.time);
        }
        if self.is_terminated() {
            return ChainStep::Ignored;
        }

        let cursor = self.cursor;
        let Some(action) = self.actions.get_mut(cursor) else {
            self.life = Life::Completed;
            return ChainStep::Completed { finished: cursor };
        };
        let input = ActionInput {
            state,
            event,
            sensitivity,
        };

        match action.update(&input, effects) {
            ActionStatus::Running => ChainStep::Running,
            ActionStatus::Completed => {
                trace!(
                    "{} chain: {} completed at {}",
                    self.kind.label(),
                    action.name(),
                    event.time
                );
                self.cursor += 1;
                match self.actions.get_mut(self.cursor) {
                    Some(next) => {
                        next.reset(event.time);
                        ChainStep::Advanced { finished: cursor }
                    }
                    None => {
                        self.life = Life::Completed;
                        ChainStep::Completed { finished: cursor }
                    }
                }
            }
            ActionStatus::Cancelled => {
                trace!(
                    "{} chain: {} cancelled at {}",
                    self.kind.label(),
                    action.name(),
                    event.time
                );
                self.life = Life::Cancelled;
                if let Some(callback) = self.on_cancel.as_mut() {
                    callback();
                }
                ChainStep::Cancelled { at: cursor }
            }
        }
    }

    pub(crate) fn notify_complete(&mut self, gesture: Option<&CompletedGesture>) {
        if let Some(callback) = self.on_complete.as_mut() {
            callback(gesture);
        }
    }
}

impl fmt::Debug for Gesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gesture")
            .field("kind", &self.kind)
            .field("actions", &self.actions)
            .field("cursor", &self.cursor)
            .field("life", &self.life)
            .finish_non_exhaustive()
    }
}
