//! Cooperative tasker protocol and hierarchical frame state machine engine.
//!
//! A [`house::House`] owns framers, frames and a path-keyed [`store::Store`].
//! Each framer is a tasker pumped one control token at a time by an external
//! driver; while running it keeps an active outline of nested frames and moves
//! between them through guarded transitions. Auxiliary framers run nested
//! inside the frames that own them, either for the life of the frame or as
//! conditional suspensions.
//!
//! - **[`core`]**: Pure types and outline algebra. No side effects.
//! - **[`tasking`]**: The control protocol shared by every tasker kind.
//! - **[`house`]**, **[`cloning`]**, **[`framing`]**: building, resolving and
//!   running framers over the arena.
//! - **[`io`]**: Config files for the binary.
//!
//! Acts are opaque behaviors supplied by the embedding application through
//! [`act::Actor`]. [`actors`] holds a few reference ones.

pub mod act;
pub mod actors;
pub mod cloning;
pub mod core;
pub mod drive;
pub mod error;
pub mod frame;
pub mod framer;
pub mod framing;
pub mod house;
pub mod io;
pub mod logging;
pub mod scenario;
pub mod store;
pub mod tasking;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
