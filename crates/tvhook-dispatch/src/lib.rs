//! Order dispatch pipeline for tvhook.
//!
//! Turns one raw webhook delivery into at most one venue order:
//! authenticate -> validate -> route -> dedupe -> dry-run or execute.
//! See [`OrderDispatcher`] for the exact check order.

pub mod context;
pub mod dispatcher;
pub mod error;
pub mod state;

pub use context::RequestContext;
pub use dispatcher::OrderDispatcher;
pub use error::{DispatchError, DispatchResult};
pub use state::{DispatchOutcome, DispatchState};
