use tessel_core::math::Vec2;
pub use tessel_winit::event::{KeyCode, PhysicalKey, SmolStr};

/// Input device class of an event.
///
/// Ordered so that everything from [`DeviceType::Mouse`] up is spatially
/// routed: `device >= DeviceType::Mouse` means "mouse-class".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DeviceType {
    Keyboard,
    Mouse,
    MouseLeftButton,
    MouseRightButton,
    MouseMiddleButton,
}

impl DeviceType {
    pub const ALL: [DeviceType; 5] = [
        DeviceType::Keyboard,
        DeviceType::Mouse,
        DeviceType::MouseLeftButton,
        DeviceType::MouseRightButton,
        DeviceType::MouseMiddleButton,
    ];

    #[inline]
    pub fn is_mouse(self) -> bool {
        self >= DeviceType::Mouse
    }

    /// A button device falls back to the generic mouse.
    pub fn fallback(self) -> Option<DeviceType> {
        match self {
            DeviceType::MouseLeftButton
            | DeviceType::MouseRightButton
            | DeviceType::MouseMiddleButton => Some(DeviceType::Mouse),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

impl MouseButton {
    pub fn device(self) -> DeviceType {
        match self {
            MouseButton::Left => DeviceType::MouseLeftButton,
            MouseButton::Right => DeviceType::MouseRightButton,
            MouseButton::Middle => DeviceType::MouseMiddleButton,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    KeyPressed,
    KeyReleased,
    MouseMoved,
    MousePressed,
    MouseReleased,
    MouseEntered,
    MouseLeaved,
    MouseClicked,
}

impl EventKind {
    pub fn is_key(self) -> bool {
        matches!(self, EventKind::KeyPressed | EventKind::KeyReleased)
    }
}

/// Pointer reading carried by mouse-class events.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseEvent {
    /// Window-absolute position, never rewritten during routing.
    pub pos: Vec2,
    /// Working position in the frame of the widget currently handling the event.
    pub relative: Vec2,
    /// Movement since the previous reading.
    pub delta: Vec2,
    pub button: Option<MouseButton>,
}

impl MouseEvent {
    pub fn new(pos: Vec2) -> Self {
        MouseEvent {
            pos,
            relative: pos,
            delta: Vec2::ZERO,
            button: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeyEvent {
    pub key: PhysicalKey,
    pub text: Option<SmolStr>,
}

/// A single dispatch pass of one input.
///
/// `R` identifies the handlers the event has visited; the trail only ever
/// grows, and a consumed event is never handled again.
#[derive(Debug, Clone)]
pub struct InputEvent<R> {
    pub kind: EventKind,
    pub device: DeviceType,
    pub mouse: MouseEvent,
    pub key: Option<KeyEvent>,
    consumed: bool,
    visited: Vec<R>,
}

impl<R> InputEvent<R> {
    fn new(kind: EventKind, device: DeviceType, mouse: MouseEvent, key: Option<KeyEvent>) -> Self {
        InputEvent {
            kind,
            device,
            mouse,
            key,
            consumed: false,
            visited: Vec::new(),
        }
    }

    pub fn mouse_moved(pos: Vec2, delta: Vec2) -> Self {
        let mouse = MouseEvent {
            delta,
            ..MouseEvent::new(pos)
        };
        Self::new(EventKind::MouseMoved, DeviceType::Mouse, mouse, None)
    }

    pub fn mouse_button(kind: EventKind, pos: Vec2, button: MouseButton) -> Self {
        let mouse = MouseEvent {
            button: Some(button),
            ..MouseEvent::new(pos)
        };
        Self::new(kind, button.device(), mouse, None)
    }

    pub fn mouse_pressed(pos: Vec2, button: MouseButton) -> Self {
        Self::mouse_button(EventKind::MousePressed, pos, button)
    }

    pub fn mouse_released(pos: Vec2, button: MouseButton) -> Self {
        Self::mouse_button(EventKind::MouseReleased, pos, button)
    }

    pub fn mouse_clicked(pos: Vec2, button: MouseButton) -> Self {
        Self::mouse_button(EventKind::MouseClicked, pos, button)
    }

    /// Hover transitions, synthesized by the dispatcher.
    pub fn hover(kind: EventKind, pos: Vec2) -> Self {
        Self::new(kind, DeviceType::Mouse, MouseEvent::new(pos), None)
    }

    pub fn key(kind: EventKind, event: KeyEvent) -> Self {
        Self::new(kind, DeviceType::Keyboard, MouseEvent::new(Vec2::ZERO), Some(event))
    }

    #[inline]
    pub fn is_mouse(&self) -> bool {
        self.device.is_mouse()
    }

    #[inline]
    pub fn is_consumed(&self) -> bool {
        self.consumed
    }

    pub fn consume(&mut self) {
        self.consumed = true;
    }

    pub fn visited(&self) -> &[R] {
        &self.visited
    }

    pub fn visit(&mut self, receiver: R) {
        self.visited.push(receiver);
    }
}

impl<R: PartialEq> InputEvent<R> {
    pub fn has_visited(&self, receiver: &R) -> bool {
        self.visited.contains(receiver)
    }
}
