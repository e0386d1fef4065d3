//! Data Transfer Objects
//!
//! Request bodies accepted by the specd API. DTOs are deliberately looser than
//! the domain types so that validation, not decoding, reports missing fields.

pub mod job_spec;
