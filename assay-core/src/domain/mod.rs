//! Core domain types
//!
//! This module contains the core domain structures used across the Assay
//! engine. These types represent the fundamental business entities and are
//! shared between the engine (for persistence and execution) and the front
//! ends (for display).

pub mod pipeline;
pub mod project;
pub mod run;
pub mod step;
