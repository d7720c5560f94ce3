/// `$ref` lookup: `[documentId]#[/json/pointer]` resolved against the
/// named sub-documents or the root document.
use serde_json::Value;

use crate::options::ResolveOptions;

/// Split a reference into its document id and decoded pointer segments.
/// The empty leading segment of `#/a/b` is dropped.
pub fn parse_reference(reference: &str) -> (&str, Vec<String>) {
    let (id, pointer) = match reference.split_once('#') {
        Some((id, pointer)) => (id, pointer),
        None => (reference, ""),
    };
    let segments = pointer
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|s| s.replace("~1", "/").replace("~0", "~"))
        .collect();
    (id, segments)
}

/// Locate the subtree a reference points at. `None` when any segment is
/// missing or there is no document to resolve against.
pub fn resolve_reference<'a>(reference: &str, options: &'a ResolveOptions) -> Option<&'a Value> {
    let (id, segments) = parse_reference(reference);

    let named = if id.is_empty() {
        None
    } else {
        options
            .sub_schemas
            .get(id)
            .or_else(|| options.sub_schemas.get(&format!("{id}#")))
    };
    let base = named.or(options.root.as_ref())?;

    tracing::trace!(id, pointer = ?segments, "resolving reference");

    let mut fragment = base;
    for segment in &segments {
        fragment = match fragment {
            Value::Object(map) => map.get(segment.as_str())?,
            Value::Array(list) => list.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(fragment)
}
