//! Key lookup within a layout.
//!
//! Keys are `<g id="key<row>-<col>">` sub-trees (or bare shapes with such an
//! id) below a layout group. The same key id appears once per layout, so
//! lookups are always scoped to a layout id.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::overlay::registry::LayoutRegistry;
use crate::svg::{NodeId, SvgDocument};

/// Shape primitives whose stroke carries a key's colour.
pub const SHAPE_ELEMENTS: &[&str] = &["path", "rect", "ellipse"];

/// Class token some layouts put on key groups.
const KEY_CLASS: &str = "key";

static KEY_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^key(\d+)-(\d+)$").expect("key id pattern is valid"));

static ONCLICK_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*key\(\s*this\s*,\s*(\d+)\s*,\s*(\d+)\s*\)").expect("onclick pattern is valid")
});

/// A key address: matrix row and column.
///
/// Whether a layout counts from 0 or 1 is the layout's business; the address
/// is only ever formatted into an id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct KeyId {
    /// Matrix row
    pub row: u16,
    /// Matrix column
    pub col: u16,
}

impl KeyId {
    /// Creates a key address.
    #[must_use]
    pub const fn new(row: u16, col: u16) -> Self {
        Self { row, col }
    }

    /// The element id for this key, e.g. `key3-5`.
    pub fn element_id(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "key{}-{}", self.row, self.col)
    }
}

impl FromStr for KeyId {
    type Err = String;

    /// Parses `key<row>-<col>`, with or without a leading `#`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s.trim().trim_start_matches('#');
        let caps = KEY_ID_PATTERN
            .captures(id)
            .ok_or_else(|| format!("'{s}' is not a key id (expected key<row>-<col>)"))?;
        let row = caps[1]
            .parse()
            .map_err(|_| format!("Row out of range in key id '{s}'"))?;
        let col = caps[2]
            .parse()
            .map_err(|_| format!("Column out of range in key id '{s}'"))?;
        Ok(Self::new(row, col))
    }
}

/// Typed handle to a key's visual parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyHandle {
    /// The key element itself
    pub element: NodeId,
    /// Shape primitives in document order; the first one defines the key's colour
    pub shapes: Vec<NodeId>,
    /// Text labels in document order
    pub labels: Vec<NodeId>,
    /// Matrix address from the id, or from the `key(this,r,c)` click handler
    pub address: Option<KeyId>,
}

impl KeyHandle {
    fn build(document: &SvgDocument, element: NodeId) -> Self {
        let node = document.element(element);
        let is_shape = node.is_some_and(|e| SHAPE_ELEMENTS.contains(&e.local_name()));
        let address = node.and_then(|e| {
            e.id()
                .and_then(|id| id.parse().ok())
                .or_else(|| e.attribute("onclick").and_then(parse_onclick))
        });
        let shapes = if is_shape {
            vec![element]
        } else {
            document.descendants_named(element, SHAPE_ELEMENTS)
        };
        Self {
            element,
            shapes,
            labels: document.descendants_named(element, &["text"]),
            address,
        }
    }
}

/// Lookup table from layout id and key element id to key handles.
///
/// Built once per scan; the document's structure never changes afterwards,
/// only attribute values do.
#[derive(Debug, Clone, Default)]
pub struct KeyTable {
    layouts: HashMap<String, HashMap<String, KeyHandle>>,
}

impl KeyTable {
    /// Indexes the keys below every layout in `registry`.
    ///
    /// An element is a key when its id matches `key<row>-<col>` or it carries
    /// the `key` class and has an id. Nested keys are not descended into.
    pub fn build(document: &SvgDocument, registry: &LayoutRegistry) -> Self {
        let mut layouts = HashMap::new();
        for group in registry.groups() {
            let mut keys = HashMap::new();
            // Pre-order walk that does not descend into keys
            let mut pending: Vec<NodeId> =
                document.children(group.node).iter().rev().copied().collect();
            while let Some(node) = pending.pop() {
                let key_id = document.element(node).and_then(|e| {
                    e.id()
                        .filter(|id| KEY_ID_PATTERN.is_match(id) || e.has_class(KEY_CLASS))
                });
                match key_id {
                    Some(id) => {
                        keys.entry(id.to_string())
                            .or_insert_with(|| KeyHandle::build(document, node));
                    }
                    None => pending.extend(document.children(node).iter().rev().copied()),
                }
            }
            layouts.insert(group.id.clone(), keys);
        }
        Self { layouts }
    }

    /// Resolves `(row, col)` within `layout`.
    pub fn locate(&self, layout: &str, key: KeyId) -> Option<&KeyHandle> {
        self.locate_by_id(layout, &key.element_id())
    }

    /// Resolves an element id (with or without a leading `#`) within `layout`.
    pub fn locate_by_id(&self, layout: &str, id: &str) -> Option<&KeyHandle> {
        self.layouts
            .get(layout)?
            .get(id.trim_start_matches('#'))
    }

    /// All keys of `layout` (unordered).
    pub fn keys(&self, layout: &str) -> impl Iterator<Item = (&str, &KeyHandle)> {
        self.layouts
            .get(layout)
            .into_iter()
            .flat_map(|keys| keys.iter().map(|(id, handle)| (id.as_str(), handle)))
    }

    /// Number of keys indexed for `layout`.
    pub fn key_count(&self, layout: &str) -> usize {
        self.layouts.get(layout).map_or(0, HashMap::len)
    }
}

/// Reads `(row, col)` from an `onclick="key(this,r,c)"` handler.
fn parse_onclick(handler: &str) -> Option<KeyId> {
    let caps = ONCLICK_PATTERN.captures(handler)?;
    Some(KeyId::new(caps[1].parse().ok()?, caps[2].parse().ok()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    const LAYOUTS: &str = r##"<svg xmlns="http://www.w3.org/2000/svg">
  <g id="kb-gb" class="kblayout">
    <g id="key1-1"><rect stroke="#fff"/><path/><text>Esc</text></g>
    <rect id="key1-2" stroke="#fff"/>
    <g id="enter" class="key" onclick="key(this,4,13)"><ellipse/></g>
    <g id="key0-300"><g id="key0-301"><rect/></g></g>
  </g>
  <g id="kb-us" class="kblayout" display="none">
    <g id="key1-1"><path/><text>Esc</text></g>
  </g>
</svg>"##;

    fn table() -> (SvgDocument, KeyTable) {
        let doc = SvgDocument::parse(LAYOUTS).unwrap();
        let registry = LayoutRegistry::scan(&doc);
        let table = KeyTable::build(&doc, &registry);
        (doc, table)
    }

    #[test]
    fn test_key_id_format_and_parse() {
        assert_eq!(KeyId::new(3, 5).element_id(), "key3-5");
        assert_eq!("key12-0".parse::<KeyId>(), Ok(KeyId::new(12, 0)));
        assert_eq!("#key1-5".parse::<KeyId>(), Ok(KeyId::new(1, 5)));
        assert!("key1".parse::<KeyId>().is_err());
        assert_eq!("key0-300".parse::<KeyId>(), Ok(KeyId::new(0, 300)));
        assert!("key70000-1".parse::<KeyId>().is_err());
        assert!("enter".parse::<KeyId>().is_err());
    }

    #[test]
    fn test_locate_is_scoped_to_layout() {
        let (doc, table) = table();
        let gb = table.locate("kb-gb", KeyId::new(1, 1)).unwrap();
        let us = table.locate("kb-us", KeyId::new(1, 1)).unwrap();
        assert_ne!(gb.element, us.element);
        assert_eq!(gb.shapes.len(), 2);
        assert_eq!(us.shapes.len(), 1);
        assert_eq!(
            doc.element(gb.shapes[0]).unwrap().local_name(),
            "rect",
            "first shape in document order"
        );
        assert!(table.locate("kb-us", KeyId::new(1, 2)).is_none());
    }

    #[test]
    fn test_locate_by_id_and_missing_keys() {
        let (_, table) = table();
        assert!(table.locate_by_id("kb-gb", "#enter").is_some());
        assert!(table.locate_by_id("kb-gb", "key9-9").is_none());
        assert!(table.locate_by_id("kb-xx", "key1-1").is_none());
    }

    #[test]
    fn test_bare_shape_key_is_its_own_shape() {
        let (_, table) = table();
        let key = table.locate("kb-gb", KeyId::new(1, 2)).unwrap();
        assert_eq!(key.shapes, vec![key.element]);
        assert!(key.labels.is_empty());
    }

    #[test]
    fn test_key_counts() {
        let (_, table) = table();
        assert_eq!(table.key_count("kb-gb"), 4);
        assert_eq!(table.key_count("kb-us"), 1);
        assert_eq!(table.keys("kb-gb").count(), 4);
    }

    #[test]
    fn test_nested_keys_are_not_indexed() {
        let (_, table) = table();
        let outer = table.locate("kb-gb", KeyId::new(0, 300)).unwrap();
        assert_eq!(outer.shapes.len(), 1);
        assert!(table.locate("kb-gb", KeyId::new(0, 301)).is_none());
    }

    #[test]
    fn test_key_address_from_id_or_click_handler() {
        let (_, table) = table();
        let by_id = table.locate_by_id("kb-gb", "key0-300").unwrap();
        assert_eq!(by_id.address, Some(KeyId::new(0, 300)));
        let by_handler = table.locate_by_id("kb-gb", "enter").unwrap();
        assert_eq!(by_handler.address, Some(KeyId::new(4, 13)));
    }

    #[test]
    fn test_parse_onclick() {
        assert_eq!(parse_onclick("key(this,3,5)"), Some(KeyId::new(3, 5)));
        assert_eq!(parse_onclick("key( this, 0 , 12 );"), Some(KeyId::new(0, 12)));
        assert_eq!(parse_onclick("alert(1)"), None);
    }
}
