//! Content access: content types, the path table, the accessor capability
//! and its filesystem implementation.
//!
//! Content lives under `src/content/` by default:
//!
//! ```text
//! {root}/blog/{lang}/{slug}.md
//! {root}/pages/{lang}/{slug}.md
//! {root}/pages/{lang}/{services|solutions|legal}/{slug}.md
//! ```

mod accessor;
mod fs;
mod stats;
mod types;

pub use accessor::{parse_date, parse_frontmatter, ContentAccessor, Frontmatter, ParsedContent};
pub use fs::FsContentAccessor;
pub use stats::{collect_stats, ContentStats};
pub use types::{ContentPaths, ContentType, DEFAULT_PATH_TEMPLATES};
