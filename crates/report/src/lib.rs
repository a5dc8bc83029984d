//! larder-report: severity-graded summary of a pipeline run.
//!
//! The report is purely derived from a [`PipelineOutcome`]; it never
//! feeds back into acceptance decisions. One struct backs both the
//! machine-readable JSON form and the Markdown narrative, so their
//! counts always agree.
//!
//! [`PipelineOutcome`]: larder_core::PipelineOutcome

pub mod markdown;
pub mod report;

pub use report::{
    build_report, ReportOptions, RuleExample, RuleSummary, SeverityTotal, ValidationReport,
    DEFAULT_EXAMPLE_LIMIT,
};
