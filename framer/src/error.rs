//! Error types for building, resolving and running framers.
//!
//! Guard failures are not errors: a refused start or transition is a normal
//! outcome reported through `Status` and logging.

use thiserror::Error;

use crate::core::types::{ActionContext, Schedule};

/// Kind of a late-bound link that failed to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    First,
    Next,
    Transit,
    Aux,
    Clone,
}

impl std::fmt::Display for LinkKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            LinkKind::First => "first frame",
            LinkKind::Next => "next frame",
            LinkKind::Transit => "transition target",
            LinkKind::Aux => "aux framer",
            LinkKind::Clone => "clone original",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Error)]
pub enum FramingError {
    #[error("register error: {0}")]
    Register(String),

    #[error("unresolved {kind} '{name}' in {scope}")]
    Resolve {
        kind: LinkKind,
        name: String,
        scope: String,
    },

    #[error("framer '{name}' has schedule {found}, expected {expected} (in {scope})")]
    Schedule {
        name: String,
        expected: Schedule,
        found: Schedule,
        scope: String,
    },

    #[error("recursive aux: framer '{name}' would contain itself (via {path})")]
    RecursiveAux { name: String, path: String },

    #[error("clone error: {0}")]
    Clone(String),

    #[error("structure error: {0}")]
    Structure(String),

    #[error("{actor} {context} act failed in {scope}")]
    Act {
        actor: String,
        context: ActionContext,
        scope: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    #[error("invalid store path '{0}'")]
    Store(String),

    #[error("unknown {kind} '{name}'")]
    Unknown { kind: &'static str, name: String },
}

/// Convenience result type for framing operations.
pub type FramingResult<T> = Result<T, FramingError>;

impl FramingError {
    pub(crate) fn act(
        actor: &str,
        context: ActionContext,
        scope: String,
        source: anyhow::Error,
    ) -> Self {
        FramingError::Act {
            actor: actor.to_string(),
            context,
            scope,
            source: source.into(),
        }
    }

    pub(crate) fn unknown(kind: &'static str, name: impl Into<String>) -> Self {
        FramingError::Unknown {
            kind,
            name: name.into(),
        }
    }
}

/// Render `err` and its sources as one `: `-separated line.
pub fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_error_names_link_and_scope() {
        let err = FramingError::Resolve {
            kind: LinkKind::Transit,
            name: "Missing".to_string(),
            scope: "frame 'A' of framer 'F'".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "unresolved transition target 'Missing' in frame 'A' of framer 'F'"
        );
    }

    #[test]
    fn act_error_keeps_source() {
        let err = FramingError::act(
            "poke",
            ActionContext::Enact,
            "frame 'A' of framer 'F'".to_string(),
            anyhow::anyhow!("boom"),
        );
        let source = std::error::Error::source(&err).expect("source");
        assert_eq!(source.to_string(), "boom");
        assert_eq!(err.to_string(), "poke enact act failed in frame 'A' of framer 'F'");
    }

    #[test]
    fn error_chain_joins_sources() {
        let err = FramingError::act(
            "poke",
            ActionContext::Exact,
            "frame 'B' of framer 'G'".to_string(),
            anyhow::anyhow!("store refused"),
        );
        assert_eq!(
            error_chain(&err),
            "poke exact act failed in frame 'B' of framer 'G': store refused"
        );
    }
}
