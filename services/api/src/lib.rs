//! services/api/src/lib.rs
//!
//! The HTTP service around `scripture_core`: configuration, storage and
//! provider adapters, and the axum web layer.

pub mod adapters;
pub mod config;
pub mod error;
pub mod web;
