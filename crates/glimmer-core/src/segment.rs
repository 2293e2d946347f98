//! The contract between segments and the host that renders them.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::SegmentError;

/// Placeholder shown in every field when a segment fails after its context resolved.
pub const ERROR_SENTINEL: &str = "ERR";

/// Template-visible fields of a segment's display state.
pub trait DisplayFields {
    /// Every field name the segment exposes.
    const FIELD_NAMES: &'static [&'static str];

    fn fields(&self) -> Vec<(&'static str, String)>;
}

/// Result of one segment evaluation.
#[derive(Debug)]
pub enum Outcome<D> {
    /// The triggering context is absent; the host hides the segment.
    Inapplicable,
    /// Display state derived from a successful parse.
    Ready(D),
    /// Context resolved but something later failed; every field shows the sentinel.
    Failed(SegmentError),
}

impl<D: DisplayFields> Outcome<D> {
    /// Folds a facade result into an outcome, splitting inapplicable from failed.
    pub fn from_result(segment: &str, result: Result<D, SegmentError>) -> Self {
        match result {
            Ok(display) => Outcome::Ready(display),
            Err(e) if e.is_inapplicable() => {
                tracing::debug!("{} segment inapplicable: {}", segment, e);
                Outcome::Inapplicable
            }
            Err(e) => {
                tracing::warn!("{} segment failed: {}", segment, e);
                Outcome::Failed(e)
            }
        }
    }

    pub fn enabled(&self) -> bool {
        !matches!(self, Outcome::Inapplicable)
    }

    pub fn fields(&self) -> BTreeMap<String, String> {
        match self {
            Outcome::Inapplicable => BTreeMap::new(),
            Outcome::Ready(display) => display
                .fields()
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
            Outcome::Failed(_) => D::FIELD_NAMES
                .iter()
                .map(|k| (k.to_string(), ERROR_SENTINEL.to_string()))
                .collect(),
        }
    }

    pub fn error(&self) -> Option<&SegmentError> {
        match self {
            Outcome::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/// Host-facing snapshot of a segment: whether to show it and what to show.
#[derive(Debug, Clone, Serialize)]
pub struct Rendered {
    pub segment: &'static str,
    pub enabled: bool,
    pub template: &'static str,
    pub fields: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Short human-readable form of `error`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<&'static str>,
}

impl Rendered {
    pub fn from_outcome<D: DisplayFields>(
        segment: &'static str,
        template: &'static str,
        outcome: &Outcome<D>,
    ) -> Self {
        Self {
            segment,
            enabled: outcome.enabled(),
            template,
            fields: outcome.fields(),
            error: outcome.error().map(|e| e.to_string()),
            hint: outcome.error().map(SegmentError::user_message),
        }
    }
}

/// A prompt segment.
#[async_trait]
pub trait Segment: Send + Sync {
    fn id(&self) -> &'static str;

    /// Default template the host renders the fields with.
    fn template(&self) -> &'static str;

    async fn render(&self) -> Rendered;
}
