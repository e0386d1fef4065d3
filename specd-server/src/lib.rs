//! specd Server
//!
//! HTTP service exposing job specifications: paginated listing, validated
//! creation and lookup with run history.

pub mod api;
pub mod app;
pub mod config;
pub mod db;
pub mod repository;
pub mod service;
pub mod validation;
