//! Core types shared across navtree facilities
//!
//! This crate provides the canonical schema constants used by the logging
//! facility in `navtree-core` and by anything that consumes its events.

pub mod schema;
