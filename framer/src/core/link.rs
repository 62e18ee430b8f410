//! Late-bound references that start life as names and are resolved to handles.

/// A reference authored by name and bound to a handle during resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Link<T> {
    Unresolved(String),
    Resolved(T),
}

impl<T: Copy> Link<T> {
    pub fn named(name: impl Into<String>) -> Self {
        Link::Unresolved(name.into())
    }

    /// The handle, once resolved.
    pub fn resolved(&self) -> Option<T> {
        match self {
            Link::Resolved(handle) => Some(*handle),
            Link::Unresolved(_) => None,
        }
    }

    /// The authored name, while still unresolved.
    pub fn name(&self) -> Option<&str> {
        match self {
            Link::Unresolved(name) => Some(name.as_str()),
            Link::Resolved(_) => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Link::Resolved(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unresolved_link_exposes_name_only() {
        let link: Link<usize> = Link::named("next");
        assert_eq!(link.name(), Some("next"));
        assert_eq!(link.resolved(), None);
        assert!(!link.is_resolved());
    }

    #[test]
    fn resolved_link_exposes_handle_only() {
        let link = Link::Resolved(7usize);
        assert_eq!(link.resolved(), Some(7));
        assert_eq!(link.name(), None);
    }
}
