//! Input routing over the composed scene.
//!
//! Seats and device objects live in the protocol layer; this module only
//! answers which surface a point lands on.

pub mod focus;
