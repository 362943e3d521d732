/// A resumption point in an emitted match routine.
///
/// Whenever the compiler emits code that may later need to be retried or
/// undone, it registers a backtrack operation and emits a push of its tag
/// onto the track stack. The match routine's dispatcher pops tags and runs
/// the resumption code registered for each.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct BacktrackOperation {
    tag: usize,
    op_id: usize,
    secondary: bool,
}

impl BacktrackOperation {
    /// The tag pushed on the track stack. Tags are dense, starting at `0`.
    pub fn tag(&self) -> usize {
        self.tag
    }

    /// The id of the operation this resumes.
    pub fn op_id(&self) -> usize {
        self.op_id
    }

    /// Loops have two resumption points. The primary one retries the loop
    /// with adjusted state, while the secondary one undoes the loop's
    /// bookkeeping and keeps backtracking.
    pub fn is_secondary(&self) -> bool {
        self.secondary
    }
}

/// The append-only set of backtrack operations of one compilation.
#[derive(Clone, Debug, Default)]
pub(crate) struct Registry {
    ops: Vec<BacktrackOperation>,
}

impl Registry {
    pub(crate) fn new() -> Registry {
        Registry::default()
    }

    /// Return the tag for resuming `op_id` at the given site, allocating
    /// one if this is the first request.
    pub(crate) fn tag(&mut self, op_id: usize, secondary: bool) -> usize {
        if let Some(op) = self
            .ops
            .iter()
            .find(|op| op.op_id == op_id && op.secondary == secondary)
        {
            return op.tag;
        }
        let tag = self.ops.len();
        self.ops.push(BacktrackOperation { tag, op_id, secondary });
        tag
    }

    pub(crate) fn into_operations(self) -> Vec<BacktrackOperation> {
        self.ops
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_are_dense_and_stable() {
        let mut reg = Registry::new();
        assert_eq!(0, reg.tag(3, false));
        assert_eq!(1, reg.tag(3, true));
        assert_eq!(2, reg.tag(7, false));
        assert_eq!(1, reg.tag(3, true));
        let ops = reg.into_operations();
        assert_eq!(3, ops.len());
        assert!(ops.iter().enumerate().all(|(i, op)| op.tag() == i));
        assert!(ops[1].is_secondary());
        assert_eq!(7, ops[2].op_id());
    }
}
