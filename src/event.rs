//! Event selectors returned to the trap-entry caller.

/// What, if anything, the virtualization layer must additionally be told
/// after an interrupt has been handled.
///
/// Contract: a handler that returns anything other than [`Event::None`]
/// has performed end-of-interrupt (priority drop) but has *not* directly
/// deactivated the line. Deactivation responsibility transfers to the
/// caller chain, which completes the interrupt's lifecycle as part of
/// injecting it into the guest. [`Event::owes_deactivation`] makes that
/// hand-off queryable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Nothing further to do; the line is fully retired.
    None,
    /// The virtual timer fired while a virtual CPU context was active.
    VTimer,
}

impl Event {
    /// True if the handler deferred direct deactivation to the caller.
    pub fn owes_deactivation(self) -> bool {
        self != Self::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deactivation_ownership() {
        assert!(!Event::None.owes_deactivation());
        assert!(Event::VTimer.owes_deactivation());
    }
}
