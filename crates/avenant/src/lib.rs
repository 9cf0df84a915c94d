//! Contract amendment (avenant) workflow engine.
//!
//! The crate tracks proposed changes to employment contracts as before/after
//! snapshots, gates their lifecycle, derives the payroll impact of salary
//! changes, and enforces per-year caps on salary advances.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
