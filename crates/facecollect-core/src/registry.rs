//! Registered face labels and how they are shown.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::ports::{FaceRegistry, Ui};

/// Shown in place of the list when the fetch fails.
pub const FETCH_FAILED_PLACEHOLDER: &str = "Error fetching faces.";

/// Shown when the backend knows no faces yet.
pub const EMPTY_PLACEHOLDER: &str = "None";

/// Labels known to the backend, each with its stable class id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct RegisteredFaceSet {
    ids: BTreeMap<String, i64>,
}

impl RegisteredFaceSet {
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Labels ordered by ascending class id; equal ids fall back to label order.
    pub fn labels_by_id(&self) -> Vec<&str> {
        let mut entries: Vec<(&str, i64)> =
            self.ids.iter().map(|(label, &id)| (label.as_str(), id)).collect();
        // BTreeMap iteration is already label-ordered, so a stable sort keeps ties sorted.
        entries.sort_by_key(|&(_, id)| id);
        entries.into_iter().map(|(label, _)| label).collect()
    }

    /// Comma-separated labels in id order, or `"None"`.
    pub fn render(&self) -> String {
        if self.is_empty() {
            return EMPTY_PLACEHOLDER.to_string();
        }
        self.labels_by_id().join(", ")
    }
}

impl<S: Into<String>> FromIterator<(S, i64)> for RegisteredFaceSet {
    fn from_iter<I: IntoIterator<Item = (S, i64)>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().map(|(label, id)| (label.into(), id)).collect(),
        }
    }
}

/// Fetch the registered faces and render them. Never fails: errors are
/// logged and the placeholder is shown instead.
pub async fn refresh(registry: &dyn FaceRegistry, ui: &dyn Ui) -> Option<RegisteredFaceSet> {
    match registry.fetch().await {
        Ok(set) => {
            tracing::debug!(count = set.len(), "registered faces refreshed");
            ui.set_registered_faces(&set.render());
            Some(set)
        }
        Err(e) => {
            tracing::warn!(error = %e, "failed to fetch registered faces");
            ui.set_registered_faces(FETCH_FAILED_PLACEHOLDER);
            None
        }
    }
}
