//! Outline diffing for frame transitions.
//!
//! Outlines are root-first sequences of frame handles. Comparison is always by
//! handle identity: two distinct frames sharing a name never compare equal.

/// Frames to exit, enter, or forcibly re-enter for one transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExEn<T> {
    /// Uncommon suffix of the current outline, root-first. Exit in reverse.
    pub exits: Vec<T>,
    /// Uncommon suffix of the target outline, root-first.
    pub enters: Vec<T>,
    /// Suffix of the current outline from the target down, root-first.
    /// Non-empty only when the target is already on the current outline.
    pub reexens: Vec<T>,
}

impl<T> ExEn<T> {
    /// True when the transition changes nothing.
    pub fn is_empty(&self) -> bool {
        self.exits.is_empty() && self.enters.is_empty() && self.reexens.is_empty()
    }
}

/// Length of the shared prefix of two outlines.
pub fn common_len<T: PartialEq>(near: &[T], far: &[T]) -> usize {
    near.iter()
        .zip(far.iter())
        .take_while(|(left, right)| left == right)
        .count()
}

/// Split two outlines at their first divergence.
///
/// Returns `(exits, enters)`: the uncommon suffixes of `near` and `far`.
pub fn uncommon<T: PartialEq + Copy>(near: &[T], far: &[T]) -> (Vec<T>, Vec<T>) {
    let split = common_len(near, far);
    (near[split..].to_vec(), far[split..].to_vec())
}

/// Compute the exit/enter/re-enter sets for a transition from the outline
/// `nears` to the frame `far`, whose own full outline is `far_outline`.
///
/// When `far` is already on `nears`, the transition is a forced re-entry of
/// everything from `far` down, and `exits`/`enters` are empty.
pub fn exen<T: PartialEq + Copy>(nears: &[T], far: T, far_outline: &[T]) -> ExEn<T> {
    let bound = nears.len().min(far_outline.len());
    let mut split = 0;
    while split < bound {
        if nears[split] == far {
            return ExEn {
                exits: Vec::new(),
                enters: Vec::new(),
                reexens: nears[split..].to_vec(),
            };
        }
        if nears[split] != far_outline[split] {
            break;
        }
        split += 1;
    }

    ExEn {
        exits: nears[split..].to_vec(),
        enters: far_outline[split..].to_vec(),
        reexens: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uncommon_splits_at_first_divergence() {
        let (exits, enters) = uncommon(&[1, 2, 3], &[1, 4, 5]);
        assert_eq!(exits, vec![2, 3]);
        assert_eq!(enters, vec![4, 5]);
    }

    #[test]
    fn uncommon_handles_prefix_relation() {
        let (exits, enters) = uncommon(&[1, 2], &[1, 2, 3]);
        assert!(exits.is_empty());
        assert_eq!(enters, vec![3]);
    }

    #[test]
    fn uncommon_of_disjoint_outlines_is_everything() {
        let (exits, enters) = uncommon(&[1, 2], &[3]);
        assert_eq!(exits, vec![1, 2]);
        assert_eq!(enters, vec![3]);
    }

    #[test]
    fn exen_sibling_transition_exits_and_enters_uncommon_suffixes() {
        // R -> A -> A1 active, target B (outline R, B, B1).
        let result = exen(&[0, 1, 2], 3, &[0, 3, 4]);
        assert_eq!(result.exits, vec![1, 2]);
        assert_eq!(result.enters, vec![3, 4]);
        assert!(result.reexens.is_empty());
    }

    #[test]
    fn exen_to_self_is_forced_reentry() {
        let result = exen(&[0, 1], 1, &[0, 1]);
        assert!(result.exits.is_empty());
        assert!(result.enters.is_empty());
        assert_eq!(result.reexens, vec![1]);
    }

    #[test]
    fn exen_to_ancestor_reenters_suffix_from_ancestor() {
        // Active R -> A -> A2 where A's primary under is A1.
        let result = exen(&[0, 1, 5], 1, &[0, 1, 2]);
        assert!(result.exits.is_empty());
        assert!(result.enters.is_empty());
        assert_eq!(result.reexens, vec![1, 5]);
    }

    #[test]
    fn exen_to_ancestor_along_primary_path_reenters_everything_below() {
        let result = exen(&[0, 1, 2], 1, &[0, 1, 2]);
        assert_eq!(result.reexens, vec![1, 2]);
    }

    #[test]
    fn exen_to_descendant_enters_only_new_frames() {
        // Active R -> A (A is a leaf in the active outline), target A's child A2.
        let result = exen(&[0, 1], 5, &[0, 1, 5]);
        assert!(result.exits.is_empty());
        assert_eq!(result.enters, vec![5]);
        assert!(result.reexens.is_empty());
    }

    #[test]
    fn exen_partitions_outlines_around_common_prefix() {
        let nears = [0, 1, 2, 3];
        let far_outline = [0, 1, 7, 8];
        let result = exen(&nears, 7, &far_outline);
        let prefix = common_len(&nears, &far_outline);
        assert_eq!(prefix, 2);

        let mut rebuilt_near = nears[..prefix].to_vec();
        rebuilt_near.extend(&result.exits);
        assert_eq!(rebuilt_near, nears);

        let mut rebuilt_far = far_outline[..prefix].to_vec();
        rebuilt_far.extend(&result.enters);
        assert_eq!(rebuilt_far, far_outline);

        assert!(result.exits.iter().all(|frame| !result.enters.contains(frame)));
    }

    #[test]
    fn empty_exen_reports_empty() {
        let result: ExEn<u8> = ExEn {
            exits: Vec::new(),
            enters: Vec::new(),
            reexens: Vec::new(),
        };
        assert!(result.is_empty());
    }
}
