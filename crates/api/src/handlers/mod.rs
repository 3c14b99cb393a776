//! Request handlers.
//!
//! Each submodule provides async handler functions for a single resource.
//! Handlers normalise and validate input, delegate to the matching
//! repository in `taskboard_db` and map errors via [`AppError`].
//!
//! [`AppError`]: crate::error::AppError

pub mod project;
pub mod task;
pub mod user;
