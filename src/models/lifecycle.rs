//! Allowed-transition tables for stateful records

use std::fmt::Debug;

/// A state enum whose legal moves are listed in one table.
///
/// A state with no outgoing transition is terminal.
pub trait Lifecycle: Copy + Eq + Debug + 'static {
    const TRANSITIONS: &'static [(Self, Self)];

    fn can_transition_to(self, next: Self) -> bool {
        Self::TRANSITIONS
            .iter()
            .any(|&(from, to)| from == self && to == next)
    }

    fn is_terminal(self) -> bool {
        !Self::TRANSITIONS.iter().any(|&(from, _)| from == self)
    }
}
