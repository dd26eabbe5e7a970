//! Assay Core
//!
//! Core types for the Assay analysis platform.
//!
//! This crate contains:
//! - Domain types: Core business entities (Project, Run, StepRecord, PipelineDefinition)
//! - DTOs: Report types rendered by front ends

pub mod domain;
pub mod dto;
