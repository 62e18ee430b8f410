//! File I/O for the engine binary.

pub mod config;
