//! Input events and the translation of native window events into them.

pub mod dispatcher;
pub mod event;
pub mod translate;

pub use dispatcher::InputDispatcher;
pub use event::{DeviceType, EventKind, InputEvent, KeyEvent, MouseButton, MouseEvent};
pub use translate::InputTranslator;
