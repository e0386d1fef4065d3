//! specd Core
//!
//! Core types and abstractions for the specd job specification service.
//!
//! This crate contains:
//! - Domain types: Job Specifications, their definitions, and Job Runs
//! - DTOs: the candidate body accepted on creation
//! - Pagination: cursor parsing and the paginated response envelope
//! - Presenter: the wire representation of a Job Specification

pub mod domain;
pub mod dto;
pub mod error;
pub mod pagination;
pub mod presenter;
