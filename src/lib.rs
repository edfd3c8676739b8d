//! Touch gesture recognition: raw touch events go in, completed gestures,
//! drag progress and cancellations come out.

pub mod action;
pub mod binding;
pub mod catalog;
pub mod chain;
pub mod codec;
pub mod config;
pub mod engine;
pub mod state;
pub mod types;

pub use binding::{BindingTable, PatternError};
pub use chain::Gesture;
pub use config::{active_config, EngineConfig};
pub use engine::{DispatchOutput, GestureEvent, GestureManager};
pub use types::{
    CompletedGesture, Direction, FingerId, GestureKind, MonitorArea, PinchDirection, Point,
    TouchEvent, TouchEventKind,
};
