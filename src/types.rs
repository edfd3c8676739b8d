use core::{
    fmt,
    ops::{Add, BitOr, BitOrAssign, Div, Mul, Sub},
};

pub type FingerId = i32;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f64 {
        self.length_squared().sqrt()
    }

    pub fn length_squared(self) -> f64 {
        self.x * self.x + self.y * self.y
    }

    pub fn dot(self, other: Point) -> f64 {
        self.x * other.x + self.y * other.y
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;

    fn mul(self, rhs: f64) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

impl Div<f64> for Point {
    type Output = Point;

    fn div(self, rhs: f64) -> Point {
        Point::new(self.x / rhs, self.y / rhs)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TouchEventKind {
    Down,
    Motion,
    Up,
}

/// One raw per-finger event as delivered by the host, already mapped into the
/// coordinate space of the monitor the engine was built for.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TouchEvent {
    pub kind: TouchEventKind,
    pub time: u32,
    pub finger: FingerId,
    pub position: Point,
}

impl TouchEvent {
    pub fn down(time: u32, finger: FingerId, x: f64, y: f64) -> Self {
        Self::new(TouchEventKind::Down, time, finger, Point::new(x, y))
    }

    pub fn motion(time: u32, finger: FingerId, x: f64, y: f64) -> Self {
        Self::new(TouchEventKind::Motion, time, finger, Point::new(x, y))
    }

    pub fn up(time: u32, finger: FingerId, x: f64, y: f64) -> Self {
        Self::new(TouchEventKind::Up, time, finger, Point::new(x, y))
    }

    pub const fn new(kind: TouchEventKind, time: u32, finger: FingerId, position: Point) -> Self {
        Self {
            kind,
            time,
            finger,
            position,
        }
    }
}

/// Bitmask over the four screen directions. Screen space grows downwards, so
/// `UP` means decreasing `y`.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Direction(u32);

impl Direction {
    pub const NONE: Direction = Direction(0);
    pub const LEFT: Direction = Direction(1 << 0);
    pub const RIGHT: Direction = Direction(1 << 1);
    pub const UP: Direction = Direction(1 << 2);
    pub const DOWN: Direction = Direction(1 << 3);

    const ALL_BITS: u32 = 0b1111;
    const LETTERS: [(Direction, char); 4] = [
        (Direction::LEFT, 'l'),
        (Direction::RIGHT, 'r'),
        (Direction::UP, 'u'),
        (Direction::DOWN, 'd'),
    ];

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn from_bits(bits: u32) -> Option<Direction> {
        if bits & !Self::ALL_BITS == 0 {
            Some(Direction(bits))
        } else {
            None
        }
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn contains(self, other: Direction) -> bool {
        self.0 & other.0 == other.0
    }

    /// Axis with the larger displacement wins; equal magnitudes resolve to the
    /// horizontal axis. A zero vector has no direction.
    pub fn dominant(vector: Point) -> Direction {
        if vector.x == 0.0 && vector.y == 0.0 {
            return Direction::NONE;
        }
        if vector.x.abs() >= vector.y.abs() {
            if vector.x < 0.0 {
                Direction::LEFT
            } else {
                Direction::RIGHT
            }
        } else if vector.y < 0.0 {
            Direction::UP
        } else {
            Direction::DOWN
        }
    }

    /// Normalized sum of the unit vectors of every set bit. `None` when no bit
    /// is set or opposite bits cancel out.
    pub fn unit_vector(self) -> Option<Point> {
        let mut sum = Point::ZERO;
        if self.contains(Direction::LEFT) {
            sum.x -= 1.0;
        }
        if self.contains(Direction::RIGHT) {
            sum.x += 1.0;
        }
        if self.contains(Direction::UP) {
            sum.y -= 1.0;
        }
        if self.contains(Direction::DOWN) {
            sum.y += 1.0;
        }
        let length = sum.length();
        if length == 0.0 {
            None
        } else {
            Some(sum / length)
        }
    }

    pub fn letters(self) -> heapless::String<4> {
        let mut out = heapless::String::new();
        for (direction, letter) in Self::LETTERS {
            if self.contains(direction) {
                // capacity covers every letter
                let _ = out.push(letter);
            }
        }
        out
    }

    /// Inverse of [`Direction::letters`]; accepts letters in any order but
    /// rejects unknown or repeated letters.
    pub fn from_letters(letters: &str) -> Option<Direction> {
        let mut out = Direction::NONE;
        for ch in letters.chars() {
            let (direction, _) = Self::LETTERS.iter().find(|(_, letter)| *letter == ch)?;
            if out.contains(*direction) {
                return None;
            }
            out |= *direction;
        }
        Some(out)
    }
}

impl BitOr for Direction {
    type Output = Direction;

    fn bitor(self, rhs: Direction) -> Direction {
        Direction(self.0 | rhs.0)
    }
}

impl BitOrAssign for Direction {
    fn bitor_assign(&mut self, rhs: Direction) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.letters())
    }
}

impl fmt::Debug for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Direction({:?})", self.letters().as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PinchDirection {
    In,
    Out,
}

impl PinchDirection {
    pub const fn letter(self) -> char {
        match self {
            PinchDirection::In => 'i',
            PinchDirection::Out => 'o',
        }
    }

    pub fn from_letter(letter: &str) -> Option<PinchDirection> {
        match letter {
            "i" => Some(PinchDirection::In),
            "o" => Some(PinchDirection::Out),
            _ => None,
        }
    }
}

/// Rectangle of the monitor the touch device is mapped onto.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MonitorArea {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl MonitorArea {
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// Edges whose margin band contains `point`. Both bounds are inclusive, so
    /// a point can match two edges in a corner.
    pub fn swipe_edges(&self, point: Point, margin: f64) -> Direction {
        let mut edges = Direction::NONE;
        if point.x <= self.x + margin {
            edges |= Direction::LEFT;
        }
        if point.x >= self.x + self.w - margin {
            edges |= Direction::RIGHT;
        }
        if point.y <= self.y + margin {
            edges |= Direction::UP;
        }
        if point.y >= self.y + self.h - margin {
            edges |= Direction::DOWN;
        }
        edges
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GestureKind {
    Swipe,
    EdgeSwipe,
    Tap,
    LongPress,
    Pinch,
    /// Forwarding interrupt raised when several fingers land at once.
    Interrupt,
}

impl GestureKind {
    pub const fn label(self) -> &'static str {
        match self {
            GestureKind::Swipe => "swipe",
            GestureKind::EdgeSwipe => "edge",
            GestureKind::Tap => "tap",
            GestureKind::LongPress => "longpress",
            GestureKind::Pinch => "pinch",
            GestureKind::Interrupt => "interrupt",
        }
    }
}

/// Description of a recognized gesture, also used to describe an in-progress
/// drag. Renders to the canonical binding key, e.g. `swipe:3:l`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CompletedGesture {
    Swipe {
        direction: Direction,
        fingers: u32,
    },
    EdgeSwipe {
        origin: Direction,
        direction: Direction,
        fingers: u32,
    },
    Tap {
        fingers: u32,
    },
    LongPress {
        fingers: u32,
    },
    Pinch {
        direction: PinchDirection,
        fingers: u32,
    },
}

impl CompletedGesture {
    pub const fn kind(&self) -> GestureKind {
        match self {
            CompletedGesture::Swipe { .. } => GestureKind::Swipe,
            CompletedGesture::EdgeSwipe { .. } => GestureKind::EdgeSwipe,
            CompletedGesture::Tap { .. } => GestureKind::Tap,
            CompletedGesture::LongPress { .. } => GestureKind::LongPress,
            CompletedGesture::Pinch { .. } => GestureKind::Pinch,
        }
    }

    pub const fn direction(&self) -> Direction {
        match self {
            CompletedGesture::Swipe { direction, .. }
            | CompletedGesture::EdgeSwipe { direction, .. } => *direction,
            _ => Direction::NONE,
        }
    }

    pub const fn finger_count(&self) -> u32 {
        match self {
            CompletedGesture::Swipe { fingers, .. }
            | CompletedGesture::EdgeSwipe { fingers, .. }
            | CompletedGesture::Tap { fingers }
            | CompletedGesture::LongPress { fingers }
            | CompletedGesture::Pinch { fingers, .. } => *fingers,
        }
    }

    pub const fn edge_origin(&self) -> Option<Direction> {
        match self {
            CompletedGesture::EdgeSwipe { origin, .. } => Some(*origin),
            _ => None,
        }
    }

    pub const fn pinch_direction(&self) -> Option<PinchDirection> {
        match self {
            CompletedGesture::Pinch { direction, .. } => Some(*direction),
            _ => None,
        }
    }
}

impl fmt::Display for CompletedGesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = self.kind().label();
        match self {
            CompletedGesture::Swipe { direction, fingers } => {
                write!(f, "{label}:{fingers}:{direction}")
            }
            CompletedGesture::EdgeSwipe {
                origin, direction, ..
            } => write!(f, "{label}:{origin}:{direction}"),
            CompletedGesture::Tap { fingers } | CompletedGesture::LongPress { fingers } => {
                write!(f, "{label}:{fingers}")
            }
            CompletedGesture::Pinch { direction, fingers } => {
                write!(f, "{label}:{fingers}:{}", direction.letter())
            }
        }
    }
}
