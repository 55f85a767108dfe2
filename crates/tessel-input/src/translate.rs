use tessel_core::math::{Vec2, clamp_to_bounds};
use tessel_core::profiling::profile_function;
use tessel_winit::event::{ElementState, Event, EventBatch, HandleStatus};

use crate::dispatcher::InputDispatcher;
use crate::event::{KeyEvent, MouseButton};

/// Map a native button; anything beyond the three standard buttons acts
/// as the left button.
pub fn convert_button(button: tessel_winit::event::MouseButton) -> MouseButton {
    use tessel_winit::event::MouseButton as Native;

    match button {
        Native::Left => MouseButton::Left,
        Native::Right => MouseButton::Right,
        Native::Middle => MouseButton::Middle,
        Native::Back | Native::Forward | Native::Other(_) => MouseButton::Left,
    }
}

/// Turns native window events into [`InputDispatcher`] calls.
///
/// Tracks the raw cursor reading so every move carries its delta, and the
/// window size so every position handed on lies inside the window.
#[derive(Debug, Clone)]
pub struct InputTranslator {
    size: Vec2,
    cursor: Vec2,
}

impl InputTranslator {
    pub fn new(size: Vec2) -> Self {
        InputTranslator {
            size,
            cursor: Vec2::ZERO,
        }
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    /// Raw cursor position of the last reading, possibly outside the window.
    pub fn cursor(&self) -> Vec2 {
        self.cursor
    }

    fn clamped_cursor(&self) -> Vec2 {
        clamp_to_bounds(self.cursor, self.size)
    }

    pub fn resize(&mut self, size: Vec2, dispatcher: &mut dyn InputDispatcher) {
        self.size = size;
        dispatcher.resize(size);
    }

    pub fn inject_mouse_move(&mut self, pos: Vec2, dispatcher: &mut dyn InputDispatcher) {
        let delta = pos - self.cursor;
        self.cursor = pos;
        dispatcher.dispatch_mouse_moved(self.clamped_cursor(), delta);
    }

    pub fn inject_mouse_button(
        &mut self,
        button: tessel_winit::event::MouseButton,
        state: ElementState,
        dispatcher: &mut dyn InputDispatcher,
    ) {
        let pos = self.clamped_cursor();
        let button = convert_button(button);
        match state {
            ElementState::Pressed => dispatcher.dispatch_mouse_pressed(pos, button),
            ElementState::Released => dispatcher.dispatch_mouse_released(pos, button),
        }
    }

    pub fn inject_key(
        &mut self,
        event: &tessel_winit::event::KeyEvent,
        dispatcher: &mut dyn InputDispatcher,
    ) {
        let key = KeyEvent {
            key: event.physical_key,
            text: event.text.clone(),
        };
        match event.state {
            ElementState::Pressed => dispatcher.dispatch_key_pressed(key),
            ElementState::Released => dispatcher.dispatch_key_released(key),
        }
    }

    /// Feed every input event of `events` to `dispatcher`; those events are
    /// consumed, everything else is left in the batch.
    pub fn handle_events(&mut self, events: &mut EventBatch, dispatcher: &mut dyn InputDispatcher) {
        profile_function!();

        events.dispatch(|event| match event {
            Event::WindowResized(size) => {
                self.resize(size.to_vec2(), dispatcher);
                HandleStatus::handled()
            }
            Event::MouseMoved(pos) => {
                self.inject_mouse_move(*pos, dispatcher);
                HandleStatus::consumed()
            }
            Event::MouseButtonDown(button) => {
                self.inject_mouse_button(*button, ElementState::Pressed, dispatcher);
                HandleStatus::consumed()
            }
            Event::MouseButtonUp(button) => {
                self.inject_mouse_button(*button, ElementState::Released, dispatcher);
                HandleStatus::consumed()
            }
            Event::KeyInput(key) => {
                self.inject_key(key, dispatcher);
                HandleStatus::consumed()
            }
            Event::MouseLeft => {
                dispatcher.pointer_left();
                HandleStatus::consumed()
            }
            _ => HandleStatus::ignored(),
        });
    }
}
