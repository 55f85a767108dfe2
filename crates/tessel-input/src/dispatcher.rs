use tessel_core::math::Vec2;

use crate::event::{KeyEvent, MouseButton};

/// Receiver of translated input.
///
/// Positions are window-absolute logical pixels, already clamped to the
/// window. Implemented by the UI window, which turns each call into an
/// input event and routes it through the widget tree.
pub trait InputDispatcher {
    fn dispatch_key_pressed(&mut self, event: KeyEvent);

    fn dispatch_key_released(&mut self, event: KeyEvent);

    fn dispatch_mouse_moved(&mut self, pos: Vec2, delta: Vec2);

    fn dispatch_mouse_pressed(&mut self, pos: Vec2, button: MouseButton);

    fn dispatch_mouse_released(&mut self, pos: Vec2, button: MouseButton);

    /// The window was resized to `size` logical pixels.
    #[allow(unused_variables)]
    fn resize(&mut self, size: Vec2) {}

    /// The cursor left the window.
    fn pointer_left(&mut self) {}
}
