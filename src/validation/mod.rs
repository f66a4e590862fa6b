//! Content validation: completeness across languages and structural
//! consistency of existing translations.
//!
//! - `validator`: English slugs vs. every target language (`ValidationReport`)
//! - `consistency`: field sets, section counts and staleness (`ConsistencyReport`)
//! - `structure`: markdown body shape used by the consistency rules
//! - `report`: serializable result types

mod consistency;
mod report;
mod structure;
mod validator;

pub use consistency::{
    ConsistencyChecker, ConsistencyIssue, ConsistencyOptions, ConsistencyReport,
    ConsistencySummary, IssueKind, Severity, REQUIRED_FIELDS,
};
pub use report::{
    MissingTranslationEntry, MissingTranslationReport, ValidationReport, ValidationResult,
    ValidationSummary,
};
pub use structure::BodyStructure;
pub use validator::{ContentValidator, PipelineHealth};
