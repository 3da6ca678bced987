//! Query resolution and dispatch for squ.
//!
//! This module turns a [`QuerySource`] into SQL text, runs it on the chosen
//! backend, and builds view DDL.

mod dispatcher;
mod source;
pub mod view;

pub use dispatcher::Squ;
pub use source::QuerySource;
