//! Guideline validation for creative documents.
//!
//! [`validate`] is a total, side-effect-free function: the same document
//! always yields the same issue list. Rules are pure predicates evaluated in
//! declaration order, all of them, never short-circuited. An empty result
//! means every guideline is met and callers should surface that as a distinct
//! success state rather than "no issues".

use crate::model::CreativeDocument;

/// Maximum headline length, counted in Unicode code points.
pub const MAX_HEADLINE_CHARS: usize = 40;

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// One violated authoring rule, phrased for the user.
pub struct ValidationIssue {
    pub message: String,
}

impl ValidationIssue {
    fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

type Rule = fn(&CreativeDocument) -> Option<ValidationIssue>;

// Adding a rule means appending here; result ordering follows this slice.
const RULES: &[Rule] = &[headline_length, cta_presence, image_presence];

/// Evaluate every guideline rule against `doc`, in declaration order.
pub fn validate(doc: &CreativeDocument) -> Vec<ValidationIssue> {
    RULES.iter().filter_map(|rule| rule(doc)).collect()
}

fn headline_length(doc: &CreativeDocument) -> Option<ValidationIssue> {
    (doc.headline.chars().count() > MAX_HEADLINE_CHARS)
        .then(|| ValidationIssue::new("Headline too long (max 40 characters)"))
}

fn cta_presence(doc: &CreativeDocument) -> Option<ValidationIssue> {
    doc.cta
        .trim()
        .is_empty()
        .then(|| ValidationIssue::new("CTA is missing"))
}

fn image_presence(doc: &CreativeDocument) -> Option<ValidationIssue> {
    doc.image
        .is_none()
        .then(|| ValidationIssue::new("Product image not uploaded"))
}
