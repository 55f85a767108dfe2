//! Hash collections used across Tessel.
//!
//! Re-exports of AHash-backed maps and sets, which are faster than the
//! standard SipHash collections for the small integer and string keys the
//! widget tree uses.

pub use ahash::{AHashMap as HashMap, AHashSet as HashSet, RandomState};
