use std::{borrow::Cow, collections::BTreeMap};

use crate::types::{Direction, FingerId, Point, TouchEvent, TouchEventKind};

/// Position history of one contact. The centroid of a [`GestureState`] is
/// expressed with the same type.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Finger {
    pub origin: Point,
    pub previous: Point,
    pub current: Point,
    pub down_time: u32,
}

impl Finger {
    pub fn new(time: u32, position: Point) -> Self {
        Self {
            origin: position,
            previous: position,
            current: position,
            down_time: time,
        }
    }

    pub fn delta(&self) -> Point {
        self.current - self.previous
    }

    pub fn drag(&self) -> Point {
        self.current - self.origin
    }

    pub fn has_moved(&self) -> bool {
        self.current != self.origin
    }

    /// Signed length of the drag projected onto `direction`.
    pub fn drag_distance(&self, direction: Direction) -> f64 {
        direction
            .unit_vector()
            .map_or(0.0, |unit| self.drag().dot(unit))
    }

    /// Part of the drag that does not go towards `direction`: the whole drag
    /// when it points backwards, otherwise its perpendicular component.
    pub fn incorrect_drag_distance(&self, direction: Direction) -> f64 {
        let drag = self.drag();
        let Some(unit) = direction.unit_vector() else {
            return drag.length();
        };
        let along = drag.dot(unit);
        if along < 0.0 {
            drag.length()
        } else {
            (drag - unit * along).length()
        }
    }

    fn move_to(&mut self, position: Point) {
        self.previous = self.current;
        self.current = position;
    }
}

/// Every finger currently on the surface, keyed by touch id.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GestureState {
    fingers: BTreeMap<FingerId, Finger>,
}

impl GestureState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.fingers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fingers.is_empty()
    }

    pub fn contains(&self, id: FingerId) -> bool {
        self.fingers.contains_key(&id)
    }

    pub fn finger(&self, id: FingerId) -> Option<&Finger> {
        self.fingers.get(&id)
    }

    pub fn fingers(&self) -> impl Iterator<Item = (FingerId, &Finger)> {
        self.fingers.iter().map(|(id, finger)| (*id, finger))
    }

    /// Lowest tracked id, used when an event has to be synthesized.
    pub fn first(&self) -> Option<(FingerId, &Finger)> {
        self.fingers.iter().next().map(|(id, finger)| (*id, finger))
    }

    /// Applies `event` and reports whether it changed anything. A down for a
    /// tracked id and a motion or up for an unknown id are ignored.
    pub fn update(&mut self, event: &TouchEvent) -> bool {
        match event.kind {
            TouchEventKind::Down => {
                if self.fingers.contains_key(&event.finger) {
                    return false;
                }
                self.fingers
                    .insert(event.finger, Finger::new(event.time, event.position));
                true
            }
            TouchEventKind::Motion => match self.fingers.get_mut(&event.finger) {
                Some(finger) => {
                    finger.move_to(event.position);
                    true
                }
                None => false,
            },
            TouchEventKind::Up => self.fingers.remove(&event.finger).is_some(),
        }
    }

    /// View handed to actions. A motion is visible to them before it lands in
    /// the stored state; downs are already applied and ups are applied later.
    pub fn projected(&self, event: &TouchEvent) -> Cow<'_, GestureState> {
        if event.kind != TouchEventKind::Motion || !self.contains(event.finger) {
            return Cow::Borrowed(self);
        }
        let mut view = self.clone();
        view.update(event);
        Cow::Owned(view)
    }

    /// Fingers left once `event` has been applied.
    pub fn remaining_after(&self, event: &TouchEvent) -> usize {
        match event.kind {
            TouchEventKind::Up if self.contains(event.finger) => self.len() - 1,
            _ => self.len(),
        }
    }

    pub fn centroid(&self) -> Option<Finger> {
        if self.fingers.is_empty() {
            return None;
        }
        let count = self.fingers.len() as f64;
        let mut sum = Finger::new(u32::MAX, Point::ZERO);
        for finger in self.fingers.values() {
            sum.origin = sum.origin + finger.origin;
            sum.previous = sum.previous + finger.previous;
            sum.current = sum.current + finger.current;
            sum.down_time = sum.down_time.min(finger.down_time);
        }
        Some(Finger {
            origin: sum.origin / count,
            previous: sum.previous / count,
            current: sum.current / count,
            down_time: sum.down_time,
        })
    }

    /// Mean distance from the centroid now, relative to the same measure at
    /// touch-down. 1.0 when the fingers started on top of each other.
    pub fn pinch_scale(&self) -> f64 {
        let Some(center) = self.centroid() else {
            return 1.0;
        };
        let mut origin_span = 0.0;
        let mut current_span = 0.0;
        for finger in self.fingers.values() {
            origin_span += (finger.origin - center.origin).length();
            current_span += (finger.current - center.current).length();
        }
        if origin_span <= f64::EPSILON {
            1.0
        } else {
            current_span / origin_span
        }
    }
}
