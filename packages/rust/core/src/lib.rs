//! Core pipeline orchestration for enrichmail.
//!
//! This crate ties together input loading, address extraction, sequential
//! verification, classification, and report assembly into the end-to-end
//! [`pipeline::enrich_file`] workflow.

pub mod pipeline;
pub mod runner;
