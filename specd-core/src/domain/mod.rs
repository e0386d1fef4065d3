//! Core domain types
//!
//! This module contains the domain structures shared across specd crates.
//! The server persists them, the client and CLI read them back.

pub mod job_run;
pub mod job_spec;
