//! Core promise state machine.
//!
//! This module contains the whole settlement core:
//! - The [`Promise`] handle, construction, and the chaining API
//! - The resolution algorithm (plain values, adoption, assimilation)
//! - The [`Value`] tagged union and the [`Thenable`] contract
//! - Observer records and their scheduled dispatch
//!
//! Everything here transitions state exactly once and defers every
//! callback to a later scheduling turn.

mod error;
mod handler;
mod promise;
mod state;
mod value;

pub use error::PromiseError;
pub use promise::Promise;
pub use state::PromiseState;
pub use value::{callback, Callback, Completion, SettleFn, Thenable, Value};
