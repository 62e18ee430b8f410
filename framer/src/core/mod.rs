//! Deterministic, pure logic shared by the framing runtime.
//!
//! Core modules must be free of side effects. They operate on plain values and
//! handles and return deterministic outputs suitable for tests.

pub mod link;
pub mod outline;
pub mod types;
