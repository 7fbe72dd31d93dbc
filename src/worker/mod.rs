//! Invocation handling and message delivery

pub mod deliver;
pub mod handler;

pub use handler::{InvocationHandler, InvocationOutcome};
