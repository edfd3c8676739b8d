//! Parsing of binding keys such as `swipe:3:l` or `edge:d:u` into the
//! [`CompletedGesture`] they name, plus a small lookup table for hosts that
//! map gestures to commands.

use core::str::FromStr;

use thiserror::Error;

use crate::types::{CompletedGesture, Direction, PinchDirection};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PatternError {
    #[error("empty gesture pattern")]
    Empty,
    #[error("unknown gesture kind `{0}`")]
    UnknownKind(String),
    #[error("`{kind}` takes {expected} fields after the kind, got {found}")]
    FieldCount {
        kind: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("invalid finger count `{0}`")]
    FingerCount(String),
    #[error("invalid direction `{0}`, expected letters from `lrud`")]
    Direction(String),
    #[error("invalid edge `{0}`, expected exactly one of `lrud`")]
    Edge(String),
    #[error("invalid pinch direction `{0}`, expected `i` or `o`")]
    PinchDirection(String),
}

fn expect_fields(
    kind: &'static str,
    fields: &[&str],
    expected: usize,
) -> Result<(), PatternError> {
    if fields.len() == expected {
        Ok(())
    } else {
        Err(PatternError::FieldCount {
            kind,
            expected,
            found: fields.len(),
        })
    }
}

fn fingers(field: &str) -> Result<u32, PatternError> {
    match field.parse::<u32>() {
        Ok(count) if count > 0 => Ok(count),
        _ => Err(PatternError::FingerCount(field.to_owned())),
    }
}

fn direction(field: &str) -> Result<Direction, PatternError> {
    Direction::from_letters(field)
        .filter(|direction| !direction.is_empty())
        .ok_or_else(|| PatternError::Direction(field.to_owned()))
}

fn edge(field: &str) -> Result<Direction, PatternError> {
    Direction::from_letters(field)
        .filter(|edge| edge.bits().count_ones() == 1)
        .ok_or_else(|| PatternError::Edge(field.to_owned()))
}

/// Edge keys carry no finger count, so parsed edge swipes report one finger.
impl FromStr for CompletedGesture {
    type Err = PatternError;

    fn from_str(pattern: &str) -> Result<Self, Self::Err> {
        let pattern = pattern.trim();
        if pattern.is_empty() {
            return Err(PatternError::Empty);
        }
        let mut parts = pattern.split(':');
        let kind = parts.next().unwrap_or_default();
        let fields: Vec<&str> = parts.collect();

        match kind {
            "swipe" => {
                expect_fields("swipe", &fields, 2)?;
                Ok(CompletedGesture::Swipe {
                    fingers: fingers(fields[0])?,
                    direction: direction(fields[1])?,
                })
            }
            "edge" => {
                expect_fields("edge", &fields, 2)?;
                Ok(CompletedGesture::EdgeSwipe {
                    origin: edge(fields[0])?,
                    direction: direction(fields[1])?,
                    fingers: 1,
                })
            }
            "tap" => {
                expect_fields("tap", &fields, 1)?;
                Ok(CompletedGesture::Tap {
                    fingers: fingers(fields[0])?,
                })
            }
            "longpress" => {
                expect_fields("longpress", &fields, 1)?;
                Ok(CompletedGesture::LongPress {
                    fingers: fingers(fields[0])?,
                })
            }
            "pinch" => {
                expect_fields("pinch", &fields, 2)?;
                Ok(CompletedGesture::Pinch {
                    fingers: fingers(fields[0])?,
                    direction: PinchDirection::from_letter(fields[1])
                        .ok_or_else(|| PatternError::PinchDirection(fields[1].to_owned()))?,
                })
            }
            other => Err(PatternError::UnknownKind(other.to_owned())),
        }
    }
}

/// Whether `gesture` triggers a binding registered for `pattern`. Edge swipes
/// match on origin and direction only.
pub fn matches(pattern: &CompletedGesture, gesture: &CompletedGesture) -> bool {
    match (pattern, gesture) {
        (
            CompletedGesture::EdgeSwipe {
                origin, direction, ..
            },
            CompletedGesture::EdgeSwipe {
                origin: seen_origin,
                direction: seen_direction,
                ..
            },
        ) => origin == seen_origin && direction == seen_direction,
        _ => pattern == gesture,
    }
}

/// Ordered list of `pattern -> payload` bindings.
#[derive(Clone, Debug, Default)]
pub struct BindingTable<T> {
    entries: Vec<(CompletedGesture, T)>,
}

impl<T> BindingTable<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn bind(&mut self, pattern: &str, payload: T) -> Result<(), PatternError> {
        let pattern = pattern.parse()?;
        self.entries.push((pattern, payload));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every payload bound to `gesture`, in registration order.
    pub fn lookup<'a>(&'a self, gesture: &'a CompletedGesture) -> impl Iterator<Item = &'a T> + 'a {
        self.entries
            .iter()
            .filter(move |(pattern, _)| matches(pattern, gesture))
            .map(|(_, payload)| payload)
    }
}
