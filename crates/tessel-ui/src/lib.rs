//! Tessel UI
//!
//! A retained-mode widget tree: widgets with frames, styles resolved along
//! their runtime type chain, interaction state flags, and input routing with
//! control delegation between widgets.
//!
//! ## Example
//! ```ignore
//! let mut window = UiWindow::with_styles(StyleTable::new(), Vec2::new(800.0, 600.0));
//! let root = window.sheet().root();
//! let button = window
//!     .sheet_mut()
//!     .create(WidgetParams::new().parent(root).content("OK"))?;
//! window.next_frame();
//! ```

pub mod adapter;
pub mod control;
pub mod error;
pub mod frame;
pub mod image;
mod layout;
mod routing;
pub mod sheet;
pub mod state;
pub mod style;
pub mod widget;
pub mod window;

pub use adapter::{EventCx, InputAdapter, UiEvent};
pub use control::{ControlEntry, ControlGraph, ControlMode, ControlNode, ControlSwitch, ControlTier};
pub use error::{UiError, UiResult};
pub use frame::{Frame, FrameDirty, FrameKind};
pub use image::{Image, ImageCatalog, ImageSource};
pub use routing::MAX_CONTROL_HOPS;
pub use sheet::RootSheet;
pub use state::{Lifecycle, WidgetState};
pub use style::{Color, InkStyle, Opacity, Style, StyleTable};
pub use widget::{Widget, WidgetId, WidgetParams};
pub use window::UiWindow;
