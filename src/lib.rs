//! cliploop - continuous random-clip playback
//!
//! The library holds the playback core (controller, prefetch queue, history
//! and timer), the HTTP client for the clip backend, cache-status polling and
//! configuration. The binary wires them to a headless surface driven from
//! stdin.

pub mod backend;
pub mod config;
pub mod playback;
pub mod session;
pub mod sync;
