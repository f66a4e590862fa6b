//! Multilingual content validation for the Statex website.
//!
//! - `content`: content types, the path table and the markdown accessor
//! - `validation`: translation completeness and structural consistency
//! - `alerts`: rule engine turning findings into dashboard alerts
//! - `abtest`: deterministic experiment variant assignment
//! - `dashboard`: HTTP surface over the above

pub mod abtest;
pub mod alerts;
pub mod config;
pub mod content;
pub mod dashboard;
pub mod error;
pub mod i18n;
pub mod scheduler;
pub mod security;
pub mod validation;
