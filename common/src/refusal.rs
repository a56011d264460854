//! Non-fatal refusals reported by the coordination primitives.
//!
//! A refusal leaves the primitive in exactly the state it had before the
//! call. The primitive logs it where it happens; callers decide whether to
//! care. Invariant violations (leaving a name that was never entered, for
//! example) are not refusals and panic instead.

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Refusal {
    /// An exclusivity name was entered while already entered.
    #[error("'{name}' is already entered")]
    DuplicateEntry { name: String },
    /// A counter was decremented at zero.
    #[error("cannot decrement past zero")]
    CounterUnderflow,
    /// A conditional increment found the counter at its maximum.
    #[error("limit of {max} reached")]
    LimitReached { max: u64 },
}

pub type RefusalResult<T> = Result<T, Refusal>;
