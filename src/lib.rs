//! # Pad Bridge Library
//!
//! A controller input abstraction layer: physical game controllers in,
//! normalized per-poll input events out.
//!
//! This library resolves configurable virtual axes (real analog axes,
//! button pairs acting as digital axes, hat directions) and remappable
//! virtual buttons against two backends: a single OS joystick bound by
//! stable GUID identity, and a console-style multi-controller merge of
//! one gamepad plus up to four wireless remotes.

pub mod axis;
pub mod backend;
pub mod config;
pub mod error;
pub mod mapping;
pub mod resolve;
pub mod snapshot;
