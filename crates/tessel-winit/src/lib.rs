//! Tessel window backend.
//!
//! Owns the native window and event loop, queues native window events per
//! window, and drives the blocking per-frame cycle: poll, dispatch, render,
//! present, then sleep to cap the frame rate.

pub mod app;
pub mod event;
pub mod time;
pub mod window;

pub use winit::window::WindowId;

pub use time::FrameTime;
