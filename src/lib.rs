//! Eventual: a deferred/eventual-value primitive
//!
//! A promise is an object representing a computation that will eventually
//! succeed with a value or fail with a reason, exactly once, with
//! observers attached before or after that outcome is known. This crate
//! is the entire state machine: construction, settlement, thenable
//! assimilation, deferred callback scheduling, chaining, and the standard
//! combinators (`all`, `race`, `resolve`, `reject`).
//!
//! # Core Concepts
//!
//! - **Settlement**: the one-time transition from pending to fulfilled or
//!   rejected, guarded by first-call-wins latches
//! - **Thenables**: any value exposing a callable `then` is treated as
//!   promise-compatible and assimilated
//! - **Scheduling turns**: callbacks never run synchronously; everything
//!   goes through the pluggable scheduling primitive
//!
//! Execution is single-threaded and cooperative. The default scheduler is
//! a drainable FIFO microtask queue; embedders with a real execution loop
//! inject their own via [`set_scheduler`]. Rejections that complete a
//! scheduling turn with no observer are reported to an overridable
//! diagnostic hook.
//!
//! # Example
//!
//! ```rust
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use eventual::{run_microtasks, Promise, Value};
//!
//! let chain = Promise::resolve(Value::from(1))
//!     .then_fulfilled(|value| {
//!         let n = value.as_data().and_then(|d| d.as_i64()).unwrap_or(0);
//!         Ok(Value::from(n + 1))
//!     })
//!     .then_fulfilled(|_| Err(Value::from("e")))
//!     .then_rejected(|reason| Ok(reason));
//!
//! let seen = Rc::new(RefCell::new(None));
//! let slot = seen.clone();
//! chain.then_fulfilled(move |value| {
//!     *slot.borrow_mut() = Some(value);
//!     Ok(Value::Undefined)
//! });
//!
//! run_microtasks();
//! assert_eq!(*seen.borrow(), Some(Value::from("e")));
//! ```

pub mod combinators;
pub mod core;
pub mod report;
pub mod scheduler;

// Re-export commonly used types
pub use crate::core::{
    callback, Callback, Completion, Promise, PromiseError, PromiseState, SettleFn, Thenable, Value,
};
pub use crate::report::{reset_unhandled_rejection_hook, set_unhandled_rejection_hook};
pub use crate::scheduler::{
    pending_jobs, reset_scheduler, run_later, run_microtasks, run_one_turn, set_scheduler, Job,
};
