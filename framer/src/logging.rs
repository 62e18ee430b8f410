//! Development-time tracing for the engine.
//!
//! # Separation of Concerns
//!
//! - **Tracing (this module)**: runtime events from the library (framer
//!   starts and stops, refused starts, transitions, forced re-entries,
//!   conditional aux engage/release, clone creation). Filtered by `RUST_LOG`,
//!   written to stderr, never persisted.
//!
//! - **Cycle reports (`drive`)**: the product output of `framer run`. One JSON
//!   line per cycle on stdout, then the outcome and a store snapshot. Always
//!   written, unaffected by `RUST_LOG`.
//!
//! - **Store state mirror (`store`)**: per-framer `elapsed`, `recurred`,
//!   `active` and `human` fields that acts can read. Part of the data model,
//!   not a log.
//!
//! The library never installs a subscriber. Only the binary calls [`init`].

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber for development logging.
///
/// Reads `RUST_LOG`. Defaults to `warn` if unset.
/// Output: stderr, compact format.
///
/// # Example
/// ```bash
/// RUST_LOG=framer=info framer run traffic
/// RUST_LOG=framer::framing=debug framer run mission
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
