//! Core types shared across Ordo facilities
//!
//! This crate provides the small vocabulary used by both the error and the
//! logging facilities:
//!
//! - **Correlation types**: RequestId, TraceId
//! - **Schema constants**: canonical field keys and event names

pub mod correlation;
pub mod schema;

pub use correlation::{RequestId, TraceId};
