use tessel_core::geometry::Size;
use tessel_core::math::Vec2;
pub use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent as WinitEvent};
pub use winit::keyboard::*;

use std::collections::VecDeque;

/// Pixels scrolled per wheel line.
pub const LINE_SCROLL_DELTA: f32 = 10.0;

/// Per-window queue of native events waiting for the next frame.
///
/// Window-level events (close, resize, focus) jump the queue. Input events
/// keep their arrival order, since a button press must be seen at the cursor
/// position that preceded it; only runs of consecutive cursor moves are
/// collapsed into the latest one.
pub struct EventQueue {
    priority: VecDeque<Event>,
    pending: VecDeque<Event>,
    stats: EventStats,
}

impl EventQueue {
    pub fn new() -> Self {
        Self {
            priority: VecDeque::with_capacity(8),
            pending: VecDeque::with_capacity(64),
            stats: EventStats::default(),
        }
    }

    /// Queue an event translated from the native event loop.
    pub fn push(&mut self, event: Event) {
        self.stats.events_received += 1;

        match event {
            Event::CloseRequested | Event::WindowResized(_) | Event::Focused(_) => {
                self.priority.push_back(event);
            }
            Event::MouseMoved(pos) => match self.pending.back_mut() {
                Some(Event::MouseMoved(last)) => {
                    *last = pos;
                    self.stats.events_coalesced += 1;
                }
                _ => self.pending.push_back(event),
            },
            _ => self.pending.push_back(event),
        }
    }

    /// Take everything queued so far, priority events first.
    pub fn drain(&mut self) -> EventBatch {
        let mut events = Vec::with_capacity(self.priority.len() + self.pending.len());
        events.extend(self.priority.drain(..));
        events.extend(self.pending.drain(..));

        self.stats.events_processed += events.len();

        EventBatch { events }
    }

    pub fn len(&self) -> usize {
        self.priority.len() + self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> &EventStats {
        &self.stats
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// Events handed to the application for one frame.
pub struct EventBatch {
    events: Vec<Event>,
}

impl EventBatch {
    pub fn new(events: Vec<Event>) -> Self {
        EventBatch { events }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Offer every event to `handler`; consumed events are removed from the batch.
    pub fn dispatch<H>(&mut self, mut handler: H)
    where
        H: FnMut(&Event) -> HandleStatus,
    {
        self.events.retain(|event| !handler(event).is_consumed());
    }
}

#[derive(Default, Debug, Clone)]
pub struct EventStats {
    pub events_received: usize,
    pub events_processed: usize,
    /// Cursor moves folded into a later move.
    pub events_coalesced: usize,
}

#[derive(Debug, Clone)]
pub enum Event {
    /// Window resized to a new logical size.
    WindowResized(Size<u32>),
    ScaleFactorChanged(f64),
    Focused(bool),
    CloseRequested,
    MouseButtonDown(MouseButton),
    MouseButtonUp(MouseButton),
    /// Wheel movement in logical pixels.
    MouseScrolled(Vec2),
    /// Cursor position in logical coordinates, unclamped.
    MouseMoved(Vec2),
    MouseEntered,
    MouseLeft,
    KeyInput(KeyEvent),
}

#[derive(Debug, Clone)]
pub struct KeyEvent {
    pub physical_key: PhysicalKey,
    pub logical_key: Key,
    pub text: Option<SmolStr>,
    pub state: ElementState,
    pub repeat: bool,
}

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct HandleStatus: u8 {
        const HANDLED = 0b00000001;
        const CONSUMED = 0b00000010;
    }
}

impl HandleStatus {
    pub const fn is_consumed(&self) -> bool {
        self.contains(Self::CONSUMED)
    }

    pub const fn is_handled(&self) -> bool {
        self.contains(Self::HANDLED)
    }

    pub const fn consumed() -> Self {
        Self::HANDLED.union(Self::CONSUMED)
    }

    pub const fn handled() -> Self {
        Self::HANDLED
    }

    pub const fn ignored() -> Self {
        Self::empty()
    }
}

impl Event {
    pub(crate) fn from_winit(event: WinitEvent, scale_factor: f64) -> Option<Self> {
        match event {
            WinitEvent::Resized(size) => Some(Event::WindowResized(Size::new(
                (size.width as f64 / scale_factor) as u32,
                (size.height as f64 / scale_factor) as u32,
            ))),
            WinitEvent::ScaleFactorChanged { scale_factor, .. } => {
                Some(Event::ScaleFactorChanged(scale_factor))
            }
            WinitEvent::Focused(focus) => Some(Event::Focused(focus)),
            WinitEvent::CloseRequested => Some(Event::CloseRequested),
            WinitEvent::MouseInput { state, button, .. } => match state {
                ElementState::Pressed => Some(Event::MouseButtonDown(button)),
                ElementState::Released => Some(Event::MouseButtonUp(button)),
            },
            WinitEvent::MouseWheel { delta, .. } => Some(Event::MouseScrolled(match delta {
                MouseScrollDelta::LineDelta(x, y) => Vec2::new(x, y) * LINE_SCROLL_DELTA,
                MouseScrollDelta::PixelDelta(delta) => Vec2::new(
                    (delta.x / scale_factor) as f32,
                    (delta.y / scale_factor) as f32,
                ),
            })),
            WinitEvent::CursorMoved { position, .. } => Some(Event::MouseMoved(Vec2::new(
                (position.x / scale_factor) as f32,
                (position.y / scale_factor) as f32,
            ))),
            WinitEvent::CursorEntered { .. } => Some(Event::MouseEntered),
            WinitEvent::CursorLeft { .. } => Some(Event::MouseLeft),
            WinitEvent::KeyboardInput { event, .. } => Some(Event::KeyInput(KeyEvent {
                physical_key: event.physical_key,
                logical_key: event.logical_key,
                text: event.text,
                state: event.state,
                repeat: event.repeat,
            })),
            WinitEvent::Moved(_) | WinitEvent::TouchpadPressure { .. } => None,
            unknown => {
                tracing::trace!("unhandled window event: {:?}", unknown);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_events_first() {
        let mut queue = EventQueue::new();
        queue.push(Event::MouseButtonDown(MouseButton::Left));
        queue.push(Event::CloseRequested);

        let batch = queue.drain();
        let events: Vec<_> = batch.iter().collect();
        assert!(matches!(events[0], Event::CloseRequested));
        assert!(matches!(events[1], Event::MouseButtonDown(MouseButton::Left)));
    }

    #[test]
    fn test_consecutive_moves_coalesce() {
        let mut queue = EventQueue::new();
        queue.push(Event::MouseMoved(Vec2::new(1.0, 1.0)));
        queue.push(Event::MouseMoved(Vec2::new(2.0, 2.0)));
        queue.push(Event::MouseMoved(Vec2::new(3.0, 3.0)));

        assert_eq!(queue.len(), 1);
        assert_eq!(queue.stats().events_coalesced, 2);

        let batch = queue.drain();
        assert!(matches!(batch.iter().next(), Some(Event::MouseMoved(p)) if *p == Vec2::new(3.0, 3.0)));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_moves_keep_order_around_presses() {
        let mut queue = EventQueue::new();
        queue.push(Event::MouseMoved(Vec2::new(1.0, 1.0)));
        queue.push(Event::MouseButtonDown(MouseButton::Left));
        queue.push(Event::MouseMoved(Vec2::new(5.0, 5.0)));

        let batch = queue.drain();
        let events: Vec<_> = batch.iter().collect();
        assert_eq!(events.len(), 3);
        assert!(matches!(events[0], Event::MouseMoved(p) if *p == Vec2::new(1.0, 1.0)));
        assert!(matches!(events[1], Event::MouseButtonDown(_)));
        assert!(matches!(events[2], Event::MouseMoved(p) if *p == Vec2::new(5.0, 5.0)));
    }

    #[test]
    fn test_dispatch_removes_consumed() {
        let mut batch = EventBatch::new(vec![
            Event::MouseEntered,
            Event::CloseRequested,
            Event::MouseLeft,
        ]);

        batch.dispatch(|event| match event {
            Event::MouseEntered | Event::MouseLeft => HandleStatus::consumed(),
            _ => HandleStatus::handled(),
        });

        assert_eq!(batch.len(), 1);
        assert!(matches!(batch.iter().next(), Some(Event::CloseRequested)));
    }

    #[test]
    fn test_handle_status() {
        assert!(HandleStatus::consumed().is_handled());
        assert!(HandleStatus::consumed().is_consumed());
        assert!(!HandleStatus::handled().is_consumed());
        assert!(!HandleStatus::ignored().is_handled());
    }
}
