//! Data Transfer Objects rendered by front ends
//!
//! DTOs are flattened views of domain entities, shaped for display and for
//! the JSON output format. They carry everything a front end needs to show
//! progress, failures, and resumability without touching the engine again.

pub mod report;
