//! Quality module - acceptance checks for freshly fetched bar series.

mod quality_gate;

pub use quality_gate::{QualityCheck, QualityGate, QualityGateConfig, QualityIssue, QualityReport};
