//! Fixed-layout record for shipping drag begin/update/end across a process or
//! plugin boundary.
//!
//! Layout, little-endian:
//!
//! | offset | type | field      |
//! |--------|------|------------|
//! | 0      | u32  | version    |
//! | 4      | u32  | event kind |
//! | 8      | f64  | x          |
//! | 16     | f64  | y          |

use thiserror::Error;

use crate::{engine::GestureEvent, types::Point};

pub const VERSION: u32 = 0;
pub const RECORD_LEN: usize = 24;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum DragPhase {
    Begin = 0,
    Update = 1,
    End = 2,
}

impl DragPhase {
    pub const fn from_u32(value: u32) -> Option<DragPhase> {
        match value {
            0 => Some(DragPhase::Begin),
            1 => Some(DragPhase::Update),
            2 => Some(DragPhase::End),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragMessage {
    pub phase: DragPhase,
    pub x: f64,
    pub y: f64,
}

#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("record is {0} bytes, need 24")]
    TooShort(usize),
    #[error("record version {found}, expected 0")]
    VersionMismatch { found: u32 },
    #[error("unknown drag event kind {0}")]
    UnknownKind(u32),
}

impl DragMessage {
    pub const fn new(phase: DragPhase, x: f64, y: f64) -> Self {
        Self { phase, x, y }
    }

    /// Drag record for an engine event. `position` is where the drag is now;
    /// begin and end events carry no position of their own.
    pub fn from_event(event: &GestureEvent, position: Point) -> Option<DragMessage> {
        let phase = match event {
            GestureEvent::DragBegin { .. } => DragPhase::Begin,
            GestureEvent::DragUpdate { position, .. } => {
                return Some(DragMessage::new(DragPhase::Update, position.x, position.y));
            }
            GestureEvent::DragEnd { .. } => DragPhase::End,
            _ => return None,
        };
        Some(DragMessage::new(phase, position.x, position.y))
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn encode(&self) -> [u8; RECORD_LEN] {
        let mut out = [0u8; RECORD_LEN];
        out[0..4].copy_from_slice(&VERSION.to_le_bytes());
        out[4..8].copy_from_slice(&(self.phase as u32).to_le_bytes());
        out[8..16].copy_from_slice(&self.x.to_le_bytes());
        out[16..24].copy_from_slice(&self.y.to_le_bytes());
        out
    }

    /// Bytes past the record are ignored.
    pub fn try_decode(bytes: &[u8]) -> Result<DragMessage, DecodeError> {
        let Some(record) = bytes.first_chunk::<RECORD_LEN>() else {
            return Err(DecodeError::TooShort(bytes.len()));
        };
        let word = |at: usize| {
            u32::from_le_bytes([record[at], record[at + 1], record[at + 2], record[at + 3]])
        };
        let float = |at: usize| {
            let mut raw = [0u8; 8];
            raw.copy_from_slice(&record[at..at + 8]);
            f64::from_le_bytes(raw)
        };

        let version = word(0);
        if version != VERSION {
            return Err(DecodeError::VersionMismatch { found: version });
        }
        let kind = word(4);
        let phase = DragPhase::from_u32(kind).ok_or(DecodeError::UnknownKind(kind))?;
        Ok(DragMessage::new(phase, float(8), float(16)))
    }

    pub fn decode(bytes: &[u8]) -> Option<DragMessage> {
        Self::try_decode(bytes).ok()
    }
}
