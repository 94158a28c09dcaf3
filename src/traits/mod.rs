//! Core traits for disposable resources.

mod dispose;

pub use dispose::{AsyncDispose, Dispose};
