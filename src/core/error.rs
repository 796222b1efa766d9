//! Errors produced by the promise machinery itself.
//!
//! These are distinct from user rejection reasons, which are opaque
//! [`Value`](super::Value)s the machinery never inspects.

use thiserror::Error;

/// Errors raised by the resolution algorithm and the combinators.
///
/// `SelfResolution` travels the rejection channel of the promise it
/// concerns. `NotAList` is a usage error surfaced synchronously from
/// [`Promise::all`](super::Promise::all). `NotAThenable` rejects an
/// aggregate whose input item cannot carry observers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PromiseError {
    /// A promise was resolved with itself.
    #[error("a promise cannot be resolved with itself")]
    SelfResolution,

    /// `all` was given an input without a length.
    #[error("all() accepts a list of values")]
    NotAList,

    /// A combinator tried to attach observers to a value with no `then`.
    #[error("{0} is not a thenable")]
    NotAThenable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_are_stable() {
        assert_eq!(
            PromiseError::SelfResolution.to_string(),
            "a promise cannot be resolved with itself"
        );
        assert_eq!(
            PromiseError::NotAList.to_string(),
            "all() accepts a list of values"
        );
        assert_eq!(
            PromiseError::NotAThenable("3".into()).to_string(),
            "3 is not a thenable"
        );
    }
}
