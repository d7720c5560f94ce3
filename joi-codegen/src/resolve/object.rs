use indexmap::IndexMap;
use serde_json::{Map, Value};

use super::{collapse_bounds, get_u64, resolve_with, Context};
use crate::ast::{Kind, Node, ObjectNode, Pattern, PatternProperty, PatternTarget};

pub(crate) fn resolve_object(obj: &Map<String, Value>, ctx: &Context<'_>) -> Node {
    let mut object = ObjectNode::default();
    let mut keys: IndexMap<String, Node> = IndexMap::new();

    if let Some(Value::Object(properties)) = obj.get("properties") {
        for (name, schema) in properties {
            keys.insert(name.clone(), resolve_with(schema, ctx));
        }
    }

    if let Some(Value::Object(dependencies)) = obj.get("dependencies") {
        for (name, dependency) in dependencies {
            match dependency {
                Value::Array(peers) => {
                    object.with.insert(name.clone(), string_list(peers));
                }
                Value::Object(schema) => {
                    merge_dependency(name, schema, &mut keys, &mut object, ctx);
                }
                _ => {}
            }
        }
    }

    let required = obj
        .get("required")
        .and_then(Value::as_array)
        .map(|names| string_list(names))
        .unwrap_or_default();
    for name in &required {
        match keys.get_mut(name) {
            Some(node) => node.flags.required = Some(true),
            None => {
                keys.insert(name.clone(), Node::any().required());
            }
        }
    }

    if !keys.is_empty() || obj.contains_key("properties") {
        object.keys = Some(keys);
    }

    match obj.get("additionalProperties") {
        None | Some(Value::Bool(true)) => object.unknown = Some(true),
        Some(Value::Bool(false)) => object.unknown = Some(false),
        Some(schema) => object.patterns.push(PatternProperty {
            target: PatternTarget::Regex(Pattern::catch_all()),
            schema: resolve_with(schema, ctx),
        }),
    }

    if let Some(Value::Object(patterns)) = obj.get("patternProperties") {
        for (pattern, schema) in patterns {
            object.patterns.push(PatternProperty {
                target: PatternTarget::Regex(Pattern::new(pattern.as_str())),
                schema: resolve_with(schema, ctx),
            });
        }
    }

    let (min, max, length) = collapse_bounds(
        get_u64(obj, "minProperties"),
        get_u64(obj, "maxProperties"),
    );
    object.min = min;
    object.max = max;
    object.length = length;

    Node::new(Kind::Object(object))
}

/// A schema-valued dependency contributes its `required` names as peers of
/// `name` and its properties to the parent, without overriding declared ones.
fn merge_dependency(
    name: &str,
    schema: &Map<String, Value>,
    keys: &mut IndexMap<String, Node>,
    object: &mut ObjectNode,
    ctx: &Context<'_>,
) {
    if let Some(Value::Array(peers)) = schema.get("required") {
        object
            .with
            .entry(name.to_string())
            .or_default()
            .extend(string_list(peers));
    }

    if let Some(Value::Object(properties)) = schema.get("properties") {
        for (key, property) in properties {
            if !keys.contains_key(key) {
                keys.insert(key.clone(), resolve_with(property, ctx));
            }
        }
    }
}

fn string_list(values: &[Value]) -> Vec<String> {
    values
        .iter()
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect()
}
