//! Submission ordering tokens.
//!
//! Every structure request gets a [`Ticket`] when it is submitted. Tickets
//! only ever increase, so comparing two of them tells which submission is
//! newer regardless of the order their results come back in.

use std::fmt;

/// Monotonic identifier of one structure submission.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default,
)]
pub struct Ticket(u64);

impl Ticket {
    /// The ticket issued after this one.
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// Raw sequence number.
    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
