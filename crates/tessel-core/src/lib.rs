//! Tessel Core
//!
//! Shared building blocks for the Tessel UI toolkit: the runtime type registry
//! used for safe upcasts and style lookup, math and geometry types, hash
//! collections, logging, profiling and configuration.

pub mod alloc;
pub mod config;
pub mod geometry;
pub mod logging;
pub mod math;
pub mod object;
pub mod profiling;

pub use object::{Type, TypeObject, Typed, downcast, downcast_mut, upcast, upcast_mut};
