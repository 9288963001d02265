//! Discovery of the keyboard layout groups inside a document.

use tracing::{debug, error, warn};

use crate::constants::LAYOUT_CLASS;
use crate::error::OverlayError;
use crate::svg::{NodeId, SvgDocument};

/// A layout group found in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutGroup {
    /// Element id, e.g. "kb-gb"
    pub id: String,
    /// The group element
    pub node: NodeId,
}

/// Known layout groups and which one is currently shown.
///
/// The set of ids is fixed by [`LayoutRegistry::scan`]; it is only rebuilt by
/// scanning again.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayoutRegistry {
    layouts: Vec<LayoutGroup>,
    active: Option<usize>,
}

impl LayoutRegistry {
    /// Creates an empty registry (the state before a document is loaded).
    pub fn new() -> Self {
        Self::default()
    }

    /// Scans `document` for groups carrying the `kblayout` class.
    ///
    /// Ids are collected in document order. The active layout is the first
    /// one that is not hidden. If every layout is hidden an error is logged
    /// and the registry has no active layout; it never picks one itself.
    pub fn scan(document: &SvgDocument) -> Self {
        let mut layouts = Vec::new();
        let mut visible = Vec::new();

        for (node, element) in document.elements() {
            if !element.has_class(LAYOUT_CLASS) {
                continue;
            }
            let Some(id) = element.id() else {
                warn!("Skipping keyboard layout group without an id");
                continue;
            };
            debug!(layout = id, hidden = element.is_hidden(), "Found layout");
            if !element.is_hidden() {
                visible.push(layouts.len());
            }
            layouts.push(LayoutGroup {
                id: id.to_string(),
                node,
            });
        }

        let active = visible.first().copied();
        match (active, visible.len()) {
            (None, _) if !layouts.is_empty() => error!("No active layout found"),
            (Some(index), count) if count > 1 => warn!(
                active = %layouts[index].id,
                visible = count,
                "More than one layout is visible, using the first"
            ),
            _ => {}
        }

        Self { layouts, active }
    }

    /// Layout ids in document order.
    pub fn ids(&self) -> Vec<&str> {
        self.layouts.iter().map(|layout| layout.id.as_str()).collect()
    }

    /// All layout groups in document order.
    pub fn groups(&self) -> &[LayoutGroup] {
        &self.layouts
    }

    /// The id of the visible layout, if any.
    pub fn active_id(&self) -> Option<&str> {
        self.active.map(|index| self.layouts[index].id.as_str())
    }

    /// The id of the visible layout, or [`OverlayError::MissingActiveLayout`].
    pub fn require_active(&self) -> Result<&str, OverlayError> {
        self.active_id().ok_or(OverlayError::MissingActiveLayout)
    }

    /// Checks whether `id` names a known layout.
    pub fn contains(&self, id: &str) -> bool {
        self.layouts.iter().any(|layout| layout.id == id)
    }

    /// True when the document has no layouts.
    pub fn is_empty(&self) -> bool {
        self.layouts.is_empty()
    }

    /// Number of known layouts.
    pub fn len(&self) -> usize {
        self.layouts.len()
    }
}
