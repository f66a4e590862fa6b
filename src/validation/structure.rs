//! Markdown body structure extraction.
//!
//! Translations should keep the shape of the English source: the same
//! sections, the same links. This module extracts that shape so the
//! consistency checker can compare it.

use pulldown_cmark::{Event, Parser, Tag};
use serde::Serialize;

/// Structural shape of a markdown body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyStructure {
    /// ATX and setext headings
    pub sections: usize,

    /// Inline, reference and autolinks; images and code are not links
    pub links: usize,
}

impl BodyStructure {
    pub fn extract(body: &str) -> Self {
        Parser::new(body).fold(Self::default(), |mut shape, event| {
            match event {
                Event::Start(Tag::Heading { .. }) => shape.sections += 1,
                Event::Start(Tag::Link { .. }) => shape.links += 1,
                _ => {}
            }
            shape
        })
    }
}
