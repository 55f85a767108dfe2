//! Widget state flags and lifecycle.

use bitflags::bitflags;

bitflags! {
    /// Interaction state of a widget. Every change re-resolves the frame skin.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct WidgetState: u32 {
        /// Pointer is over the widget.
        const FOCUSED   = 1 << 0;
        /// A mouse button is held on the widget.
        const TRIGGERED = 1 << 1;
        const ACTIVATED = 1 << 2;
        const SELECTED  = 1 << 3;
        const DISABLED  = 1 << 4;
        /// Keyboard input starts at this widget.
        const ACTIVE    = 1 << 5;
        /// Current controller of at least one input device.
        const CONTROL   = 1 << 6;
        /// One of the widget's controls is modal.
        const MODAL     = 1 << 7;
        const DRAGGED   = 1 << 8;
    }
}

/// Lifecycle of a widget, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Lifecycle {
    Constructed,
    InTree,
    Destroying,
    Destroyed,
}

impl Lifecycle {
    pub fn is_alive(self) -> bool {
        self < Lifecycle::Destroying
    }
}
