//! Tessel - a retained-mode UI toolkit
//!
//! Tessel keeps a tree of widgets per window and routes input through it:
//!
//! - **Typed widgets**: behaviors declare a runtime type chain used for safe
//!   upcasts and for style lookup
//! - **Styles and skins**: named styles resolved along the type chain, with
//!   per-state skins
//! - **Input control**: widgets can capture a device, modally or not, and
//!   delegate control to other widgets
//! - **Layout**: flexbox layout of widget frames via taffy
//! - **Windowing**: winit windows with frame pacing and event coalescing
//!
//! # Quick Start
//!
//! ```ignore
//! use tessel::prelude::*;
//!
//! fn main() {
//!     ApplicationBuilder::new()
//!         .with_title("Hello")
//!         .run(|sheet| {
//!             let root = sheet.root();
//!             sheet.create(WidgetParams::new().parent(root).content("Hello"))?;
//!             Ok(())
//!         })
//!         .unwrap();
//! }
//! ```

pub mod application;

pub use tessel_core as core;
pub use tessel_core::math;
pub use tessel_input as input;
pub use tessel_ui as ui;
pub use tessel_winit as winit;

pub use application::{ApplicationBuilder, SceneBuilder, UiApplication};
pub use tessel_winit::{
    FrameTime, WindowId,
    app::{App, AppCtx, AppFactory, run_app, run_app_with},
    event::{Event, EventBatch, HandleStatus},
    window::{Window, WindowDescriptor},
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::application::{ApplicationBuilder, UiApplication};

    pub use tessel_core::config::Config;
    pub use tessel_core::math::Vec2;
    pub use tessel_core::object::{Type, TypeObject, Typed, downcast, upcast};

    pub use tessel_input::{DeviceType, EventKind, MouseButton};

    pub use tessel_ui::{
        Color, ControlMode, ControlTier, EventCx, FrameKind, ImageCatalog, InkStyle, InputAdapter, Opacity,
        RootSheet, Style, StyleTable, UiError, UiEvent, UiResult, UiWindow, Widget, WidgetId, WidgetParams,
        WidgetState,
    };

    pub use tessel_winit::{
        FrameTime, WindowId,
        app::{App, AppCtx, run_app},
        event::{Event, EventBatch, HandleStatus},
        window::{Window, WindowDescriptor},
    };
}
