//! Service layer for wildlog
//!
//! [`ObservationController`] is the single screen a host renders: it gates on
//! location permission, tracks add mode, and keeps the in-memory observation
//! list in step with the persisted one.

#![allow(missing_docs, reason = "Internal crate with self-explanatory API")]
#![allow(clippy::missing_errors_doc, reason = "Errors are self-explanatory from Result types")]
#![allow(clippy::implicit_return, reason = "Implicit return is idiomatic Rust")]
#![allow(clippy::question_mark_used, reason = "? operator is idiomatic Rust")]
#![allow(clippy::min_ident_chars, reason = "Short error vars are idiomatic")]

mod controller;
mod error;
mod screen;
mod share;

pub use controller::ObservationController;
pub use error::ServiceError;
pub use screen::ScreenState;
pub use share::share_text;
