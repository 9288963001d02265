//! Inline `style` attribute handling.
//!
//! SVG editors write presentation properties either as attributes
//! (`stroke="#fff"`) or inside the `style` attribute (`style="stroke:#fff"`).
//! The inline declaration wins when both are present.

/// Parses a `style` attribute into `(property, value)` pairs in source order.
///
/// Empty declarations and declarations without a colon are dropped.
///
/// # Examples
///
/// ```
/// use chroma_overlay::svg::style::parse_declarations;
///
/// let decls = parse_declarations("fill:#222222; stroke : none;");
/// assert_eq!(
///     decls,
///     vec![
///         ("fill".to_string(), "#222222".to_string()),
///         ("stroke".to_string(), "none".to_string()),
///     ]
/// );
/// ```
pub fn parse_declarations(style: &str) -> Vec<(String, String)> {
    style
        .split(';')
        .filter_map(|decl| {
            let (property, value) = decl.split_once(':')?;
            let property = property.trim();
            if property.is_empty() {
                return None;
            }
            Some((property.to_string(), value.trim().to_string()))
        })
        .collect()
}

/// Writes declarations back into `style` attribute form.
pub fn write_declarations(declarations: &[(String, String)]) -> String {
    declarations
        .iter()
        .map(|(property, value)| format!("{property}:{value}"))
        .collect::<Vec<_>>()
        .join(";")
}

/// Looks up one property in a `style` attribute.
pub fn declaration(style: &str, property: &str) -> Option<String> {
    parse_declarations(style)
        .into_iter()
        .rev()
        .find(|(name, _)| name == property)
        .map(|(_, value)| value)
}

/// Replaces the value of `property` if the style already declares it.
///
/// Returns `None` when the property is not declared, leaving the caller to
/// fall back to the presentation attribute.
pub fn replace_declaration(style: &str, property: &str, value: &str) -> Option<String> {
    let mut declarations = parse_declarations(style);
    let mut found = false;
    for (name, current) in &mut declarations {
        if name == property {
            *current = value.to_string();
            found = true;
        }
    }
    found.then(|| write_declarations(&declarations))
}
