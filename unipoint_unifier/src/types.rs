// Copyright 2025 the Unipoint Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types: pointer identifiers, raw input records, and the unified event.

use kurbo::Point;
use unipoint_event_state::direction::Direction;

/// Key of one concurrently active pointer session.
///
/// Mouse buttons use reserved constants so that a button press and its release
/// always meet, whichever device event carried them. Touch contacts and pen
/// strokes use the session id assigned by the platform.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PointerId {
    /// Left (primary) mouse button.
    LeftMouse,
    /// Right (secondary) mouse button.
    RightMouse,
    /// The mouse cursor with no button involved; used for hover, enter and exit.
    Mouse,
    /// A touch or pen contact identified by its platform session id.
    Session(u64),
}

impl PointerId {
    /// Whether this is one of the reserved mouse-button identifiers.
    pub const fn is_mouse_button(self) -> bool {
        matches!(self, Self::LeftMouse | Self::RightMouse)
    }

    /// Whether this is a touch or pen session.
    pub const fn is_session(self) -> bool {
        matches!(self, Self::Session(_))
    }
}

/// Physical mouse button reported by the platform.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Primary button.
    Left,
    /// Middle button or wheel click.
    Middle,
    /// Secondary button.
    Right,
    /// Any other button, by platform index.
    Other(u16),
}

impl MouseButton {
    /// Map a DOM-style button index (`0` left, `1` middle, `2` right).
    pub const fn from_index(index: u16) -> Self {
        match index {
            0 => Self::Left,
            1 => Self::Middle,
            2 => Self::Right,
            other => Self::Other(other),
        }
    }

    /// The tracked identifier for this button.
    ///
    /// Only the left and right buttons produce pointer sessions.
    pub const fn pointer_id(self) -> Option<PointerId> {
        match self {
            Self::Left => Some(PointerId::LeftMouse),
            Self::Right => Some(PointerId::RightMouse),
            Self::Middle | Self::Other(_) => None,
        }
    }
}

/// Kind of device that produced a signal.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum DeviceClass {
    /// A mouse or trackpad.
    Mouse,
    /// A finger on a touch screen.
    Touch,
    /// A stylus.
    Pen,
    /// Not reported.
    #[default]
    Unknown,
}

impl DeviceClass {
    /// Map the numeric pointer types used by legacy pointer-event platforms
    /// (`2` touch, `3` pen, `4` mouse).
    pub const fn from_legacy_code(code: u32) -> Self {
        match code {
            2 => Self::Touch,
            3 => Self::Pen,
            4 => Self::Mouse,
            _ => Self::Unknown,
        }
    }
}

bitflags::bitflags! {
    /// Keyboard modifiers held while a pointer signal was produced.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// Shift key.
        const SHIFT = 0b0000_0001;
        /// Alt/Option key.
        const ALT   = 0b0000_0010;
        /// Control key.
        const CTRL  = 0b0000_0100;
        /// Meta/Command/Super key.
        const META  = 0b0000_1000;
    }
}

/// Integer-rounded position in page coordinates.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Position {
    /// Horizontal coordinate.
    pub x: i32,
    /// Vertical coordinate.
    pub y: i32,
}

impl Position {
    /// Create a position from integer coordinates.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Round a floating-point position to the nearest integers.
    ///
    /// Out-of-range values saturate and NaN becomes zero.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "float to int casts saturate, which is the intended clamping"
    )]
    pub fn from_point(point: Point) -> Self {
        let rounded = point.round();
        Self {
            x: rounded.x as i32,
            y: rounded.y as i32,
        }
    }

    /// The position as a `kurbo` point.
    pub fn to_point(self) -> Point {
        Point::new(f64::from(self.x), f64::from(self.y))
    }

    /// Manhattan distance to `other`.
    pub fn manhattan_distance(self, other: Self) -> u32 {
        self.x.abs_diff(other.x).saturating_add(self.y.abs_diff(other.y))
    }
}

/// Opaque reference to the element a raw signal originated from.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetId(pub u64);

/// Identifier of a surface registered with an
/// [`InputCoordinator`](crate::coordinator::InputCoordinator).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(pub(crate) u32);

/// A low-level pointer signal as delivered by the platform.
///
/// Everything except the position and timestamp is optional; absent fields
/// take neutral defaults when the signal is unified.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RawPointer {
    /// Page position, possibly fractional.
    pub position: Point,
    /// Element the platform reported as the signal target.
    pub target: Option<TargetId>,
    /// Held modifier keys, when the platform reports them.
    pub modifiers: Option<Modifiers>,
    /// Contact pressure, when the platform reports it.
    pub pressure: Option<f32>,
    /// Device class of the signal.
    pub device: DeviceClass,
    /// Timestamp in milliseconds.
    pub time: u64,
}

impl RawPointer {
    /// Create a raw signal with only a position and a timestamp.
    pub fn new(position: Point, time: u64) -> Self {
        Self {
            position,
            target: None,
            modifiers: None,
            pressure: None,
            device: DeviceClass::Unknown,
            time,
        }
    }

    /// Set the originating target.
    pub fn with_target(mut self, target: TargetId) -> Self {
        self.target = Some(target);
        self
    }

    /// Set the held modifiers.
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = Some(modifiers);
        self
    }

    /// Set the contact pressure.
    pub fn with_pressure(mut self, pressure: f32) -> Self {
        self.pressure = Some(pressure);
        self
    }

    /// Set the device class.
    pub fn with_device(mut self, device: DeviceClass) -> Self {
        self.device = device;
        self
    }
}

/// Pressure reported when the device does not measure it.
pub const DEFAULT_PRESSURE: f32 = 0.5;

/// A normalized pointer event as seen by a
/// [`Destination`](crate::destination::Destination).
///
/// The same record type is used for every device; [`UnifiedPointerEvent::device`]
/// tells them apart. Events are built from a per-session stub that the engine
/// refills for each dispatch, so fields that a given transition does not touch
/// (for example `dx`/`dy` on release) keep the value of the previous dispatch
/// of the same session.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct UnifiedPointerEvent {
    /// Session the event belongs to.
    pub identifier: PointerId,
    /// Device class of the originating signal.
    pub device: DeviceClass,
    /// Rounded page position.
    pub position: Position,
    /// Element the signal originated from.
    pub target: Option<TargetId>,
    /// Held modifier keys.
    pub modifiers: Modifiers,
    /// Contact pressure in `[0, 1]`.
    pub pressure: f32,
    /// Timestamp of the originating signal in milliseconds.
    pub time: u64,
    /// Number of live pointer sessions when the event was produced.
    pub touch_counter: usize,
    /// Number of presses dispatched in the same batch as this session's press.
    pub group_size: usize,
    /// Drag direction, once enough movement has been seen.
    pub direction: Option<Direction>,
    /// Horizontal movement since the previous drag event of the session.
    pub dx: i32,
    /// Vertical movement since the previous drag event of the session.
    pub dy: i32,
    /// Where the session was pressed; set on release-side events.
    pub press_position: Option<Position>,
}

impl Default for UnifiedPointerEvent {
    fn default() -> Self {
        Self {
            identifier: PointerId::Mouse,
            device: DeviceClass::Unknown,
            position: Position::default(),
            target: None,
            modifiers: Modifiers::empty(),
            pressure: DEFAULT_PRESSURE,
            time: 0,
            touch_counter: 0,
            group_size: 0,
            direction: None,
            dx: 0,
            dy: 0,
            press_position: None,
        }
    }
}

impl UnifiedPointerEvent {
    /// Build an event for `identifier` from a raw signal.
    pub fn from_raw(identifier: PointerId, raw: &RawPointer) -> Self {
        let mut event = Self::default();
        event.fill_from(identifier, raw);
        event
    }

    /// Refill the signal-derived fields from `raw`.
    ///
    /// Copies the rounded position, target, modifiers (empty when absent),
    /// pressure (0.5 when absent or not a number, clamped to `[0, 1]`), device
    /// and timestamp. Session bookkeeping fields are left as they are.
    pub fn fill_from(&mut self, identifier: PointerId, raw: &RawPointer) {
        self.identifier = identifier;
        self.device = raw.device;
        self.position = Position::from_point(raw.position);
        self.target = raw.target;
        self.modifiers = raw.modifiers.unwrap_or_default();
        self.pressure = match raw.pressure {
            Some(p) if !p.is_nan() => p.clamp(0.0, 1.0),
            _ => DEFAULT_PRESSURE,
        };
        self.time = raw.time;
    }

    /// Whether the event can trigger a primary action: not the right mouse
    /// button, and exactly one live session.
    pub fn is_action(&self) -> bool {
        self.identifier != PointerId::RightMouse && self.touch_counter == 1
    }
}
