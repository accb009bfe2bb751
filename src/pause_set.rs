use std::collections::HashSet;

use crate::events::PauseReason;

/// Active pause requests.
///
/// `None` is the "no specific reason" slot used by callers that pause or play
/// without naming a reason. It never collides with a named [`PauseReason`].
#[derive(Debug, Clone, Default)]
pub struct PauseSet {
    active: HashSet<Option<PauseReason>>,
}

impl PauseSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when the reason was not already active.
    pub fn insert(&mut self, reason: Option<PauseReason>) -> bool {
        self.active.insert(reason)
    }

    /// Returns `true` when the reason was active.
    pub fn remove(&mut self, reason: Option<PauseReason>) -> bool {
        self.active.remove(&reason)
    }

    pub fn contains(&self, reason: Option<PauseReason>) -> bool {
        self.active.contains(&reason)
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<PauseReason>> + '_ {
        self.active.iter().copied()
    }
}
