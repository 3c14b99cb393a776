//! Domain logic shared by the TaskBoard database and API crates.
//!
//! Nothing in here touches the database: vocabularies, validation, tag
//! handling and due-date classification are all pure functions so they
//! can be unit-tested in isolation.

pub mod error;
pub mod patch;
pub mod tags;
pub mod task;
pub mod types;
pub mod validation;
