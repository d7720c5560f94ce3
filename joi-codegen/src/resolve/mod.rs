/// Schema resolver: lowers a JSON Schema node into the intermediate model.
///
/// [`resolve`] is total: malformed or dangling input degrades to an
/// unconstrained `any` node instead of failing. Only bundle resolution
/// (ordering a whole definitions map) can fail.
mod alternatives;
mod array;
pub mod bundle;
mod object;
pub mod reference;
mod scalar;

use convert_case::{Case, Casing};
use serde_json::{Map, Value};

use crate::ast::{Combinator, Kind, Node};
use crate::options::ResolveOptions;
pub use bundle::{find_section, resolve_bundle, resolve_section, BundleScope};
pub use reference::resolve_reference;

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("document has no '{section}' section to bundle")]
    MissingSection { section: String },
    #[error("'{section}' must be a JSON object")]
    SectionNotObject { section: String },
    #[error("definitions '{first}' and '{second}' both map to label '{label}'")]
    DuplicateLabel {
        label: String,
        first: String,
        second: String,
    },
    #[error("cannot order definitions, unresolved dependencies remain for: {}", .labels.join(", "))]
    UnresolvableDependencies { labels: Vec<String> },
}

/// Read-only state threaded through every resolve call.
#[derive(Clone, Copy)]
pub(crate) struct Context<'a> {
    pub options: &'a ResolveOptions,
    /// Set in bundle mode: pointers at bundle members become references.
    pub bundle: Option<&'a BundleScope>,
    /// `$ref`s currently being inlined, innermost first.
    trail: Option<&'a Trail<'a>>,
}

struct Trail<'a> {
    reference: &'a str,
    parent: Option<&'a Trail<'a>>,
}

impl<'a> Context<'a> {
    pub fn new(options: &'a ResolveOptions, bundle: Option<&'a BundleScope>) -> Self {
        Self {
            options,
            bundle,
            trail: None,
        }
    }

    fn is_expanding(&self, reference: &str) -> bool {
        let mut frame = self.trail;
        while let Some(f) = frame {
            if f.reference == reference {
                return true;
            }
            frame = f.parent;
        }
        false
    }
}

/// Resolve one schema node against the given options.
pub fn resolve(schema: &Value, options: &ResolveOptions) -> Node {
    resolve_with(schema, &Context::new(options, None))
}

pub(crate) fn resolve_with(schema: &Value, ctx: &Context<'_>) -> Node {
    let obj = match schema {
        Value::Object(obj) => obj,
        Value::Bool(false) => {
            let mut node = Node::any();
            node.flags.forbidden = Some(true);
            return node;
        }
        _ => return Node::any(),
    };

    if let Some(reference) = obj.get("$ref").and_then(Value::as_str) {
        return resolve_ref(reference, ctx);
    }

    let mut node = if let Some(values) = untyped_enum(obj) {
        let mut node = Node::any();
        node.valid = Some(values.clone());
        node
    } else if alternatives::is_combinator(obj) {
        alternatives::resolve_alternatives(obj, ctx)
    } else if let Some(Value::Array(types)) = obj.get("type") {
        resolve_type_list(obj, types, ctx)
    } else {
        let type_name = obj
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or_else(|| infer_type(obj));
        let mut node = resolve_type(type_name, obj, ctx);
        if let Some(Value::Array(values)) = obj.get("enum") {
            node.valid = Some(values.clone());
        }
        node
    };

    apply_meta(&mut node, obj);
    node
}

fn resolve_ref(reference: &str, ctx: &Context<'_>) -> Node {
    if let Some(label) = ctx.bundle.and_then(|scope| scope.target_for(reference)) {
        return Node::reference(label);
    }
    if ctx.is_expanding(reference) {
        tracing::warn!(reference, "recursive $ref outside a bundle, inlining stopped");
        return Node::any();
    }
    match resolve_reference(reference, ctx.options) {
        Some(target) => {
            let trail = Trail {
                reference,
                parent: ctx.trail,
            };
            let inner = Context {
                trail: Some(&trail),
                ..*ctx
            };
            resolve_with(target, &inner)
        }
        None => {
            tracing::warn!(reference, "dangling $ref, resolved as any");
            Node::any()
        }
    }
}

fn untyped_enum(obj: &Map<String, Value>) -> Option<&Vec<Value>> {
    if obj.contains_key("type") || obj.contains_key("format") {
        return None;
    }
    obj.get("enum").and_then(Value::as_array)
}

/// `type: [a, b]` becomes `anyOf` over single-typed copies of the node.
/// Metadata stays on the outer alternatives node.
fn resolve_type_list(obj: &Map<String, Value>, types: &[Value], ctx: &Context<'_>) -> Node {
    let variants = types
        .iter()
        .map(|type_name| {
            let mut variant = obj.clone();
            variant.insert("type".into(), type_name.clone());
            for key in ["title", "description", "default"] {
                variant.remove(key);
            }
            resolve_with(&Value::Object(variant), ctx)
        })
        .collect();
    Node::new(Kind::Alternatives(Combinator::AnyOf(variants)))
}

fn resolve_type(type_name: &str, obj: &Map<String, Value>, ctx: &Context<'_>) -> Node {
    match type_name {
        "object" => object::resolve_object(obj, ctx),
        "array" => array::resolve_array(obj, ctx),
        "string" => scalar::resolve_string(obj),
        "number" | "integer" => scalar::resolve_number(obj),
        "boolean" => scalar::resolve_boolean(obj),
        "null" => {
            let mut node = Node::any();
            node.valid = Some(vec![Value::Null]);
            node
        }
        _ => scalar::resolve_any(obj),
    }
}

const OBJECT_KEYS: [&str; 7] = [
    "required",
    "properties",
    "patternProperties",
    "dependencies",
    "minProperties",
    "maxProperties",
    "additionalProperties",
];
const ARRAY_KEYS: [&str; 5] = [
    "items",
    "minItems",
    "maxItems",
    "uniqueItems",
    "additionalItems",
];
const STRING_KEYS: [&str; 3] = ["minLength", "maxLength", "pattern"];
const NUMBER_KEYS: [&str; 5] = [
    "multipleOf",
    "minimum",
    "maximum",
    "exclusiveMinimum",
    "exclusiveMaximum",
];
const STRING_FORMATS: [&str; 12] = [
    "date",
    "time",
    "date-time",
    "email",
    "hostname",
    "ipv4",
    "ipv6",
    "uri",
    "byte",
    "binary",
    "uuid",
    "guid",
];

/// Type implied by the keys present on an untyped node. Object keys are
/// checked before array keys, then string, number and string formats.
pub fn infer_type(obj: &Map<String, Value>) -> &'static str {
    let has_any = |keys: &[&str]| keys.iter().any(|k| obj.contains_key(*k));
    if has_any(&OBJECT_KEYS) {
        "object"
    } else if has_any(&ARRAY_KEYS) {
        "array"
    } else if has_any(&STRING_KEYS) {
        "string"
    } else if has_any(&NUMBER_KEYS) {
        "number"
    } else if obj
        .get("format")
        .and_then(Value::as_str)
        .is_some_and(|f| STRING_FORMATS.contains(&f))
    {
        "string"
    } else {
        "any"
    }
}

fn apply_meta(node: &mut Node, obj: &Map<String, Value>) {
    if let Some(description) = obj.get("description").and_then(Value::as_str) {
        if !description.is_empty() {
            node.description = Some(description.to_string());
        }
    }
    if let Some(title) = obj.get("title").and_then(Value::as_str) {
        if !title.trim().is_empty() {
            node.label = Some(camel_label(title));
        }
    }
    if let Some(default) = obj.get("default") {
        node.default = Some(default.clone());
    }
}

/// Camel-cased, identifier-safe label for a title or definition key. Only
/// ASCII letters and digits survive; everything else separates words.
pub fn camel_label(text: &str) -> String {
    let spaced: String = text
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { ' ' })
        .collect();
    let label = spaced.to_case(Case::Camel);
    match label.chars().next() {
        None => "schema".into(),
        Some(c) if c.is_ascii_digit() => format!("_{label}"),
        Some(_) => label,
    }
}

/// Collapse a min/max pair into `length` when both are equal.
pub(crate) fn collapse_bounds(
    min: Option<u64>,
    max: Option<u64>,
) -> (Option<u64>, Option<u64>, Option<u64>) {
    match (min, max) {
        (Some(lo), Some(hi)) if lo == hi => (None, None, Some(lo)),
        _ => (min, max, None),
    }
}

pub(crate) fn get_u64(obj: &Map<String, Value>, key: &str) -> Option<u64> {
    match obj.get(key)? {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= 0.0)
                .map(|f| f as u64)
        }),
        _ => None,
    }
}
