use serde_json::{Map, Value};

use super::{get_u64, resolve_with, Context};
use crate::ast::{ArrayNode, Kind, Node};

pub(crate) fn resolve_array(obj: &Map<String, Value>, ctx: &Context<'_>) -> Node {
    let mut array = ArrayNode {
        min: get_u64(obj, "minItems"),
        max: get_u64(obj, "maxItems"),
        unique: obj.get("uniqueItems").and_then(Value::as_bool),
        ..ArrayNode::default()
    };

    match obj.get("items") {
        Some(Value::Array(positional)) => {
            array.ordered = Some(positional.iter().map(|s| resolve_with(s, ctx)).collect());
            array.items = match obj.get("additionalItems") {
                None | Some(Value::Bool(true)) => Some(vec![Node::any()]),
                Some(Value::Bool(false)) => None,
                Some(schema) => Some(vec![resolve_with(schema, ctx)]),
            };
        }
        Some(schema) => array.items = Some(vec![resolve_with(schema, ctx)]),
        None => {}
    }

    Node::new(Kind::Array(array))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{NumberNode, StringNode};
    use crate::options::ResolveOptions;
    use crate::resolve::resolve;
    use serde_json::json;

    fn array_of(schema: Value) -> ArrayNode {
        let options = ResolveOptions::with_root(schema.clone());
        match resolve(&schema, &options).kind {
            Kind::Array(array) => array,
            other => panic!("expected array, got {other:?}"),
        }
    }

    fn number() -> Node {
        Node::new(Kind::Number(NumberNode::default()))
    }

    #[test]
    fn test_list_items() {
        let array = array_of(json!({"type": "array", "items": {"type": "number"}, "minItems": 1}));
        assert_eq!(array.items, Some(vec![number()]));
        assert_eq!(array.ordered, None);
        assert_eq!(array.min, Some(1));
    }

    #[test]
    fn test_tuple_without_additional_items() {
        let array = array_of(json!({
            "type": "array",
            "items": [{"type": "number"}, {"type": "string"}],
            "additionalItems": false
        }));
        let ordered = array.ordered.unwrap();
        assert_eq!(ordered.len(), 2);
        assert_eq!(ordered[0], number());
        assert!(matches!(ordered[1].kind, Kind::String(StringNode { min: Some(0), .. })));
        assert_eq!(array.items, None);
    }

    #[test]
    fn test_tuple_allows_trailing_any_by_default() {
        let array = array_of(json!({"items": [{"type": "number"}]}));
        assert_eq!(array.items, Some(vec![Node::any()]));
    }

    #[test]
    fn test_tuple_with_additional_schema() {
        let array = array_of(json!({"items": [{"type": "boolean"}], "additionalItems": {"type": "number"}}));
        assert_eq!(array.items, Some(vec![number()]));
    }

    #[test]
    fn test_size_bounds_pass_through() {
        let array = array_of(json!({"minItems": 2, "maxItems": 2, "uniqueItems": true}));
        assert_eq!((array.min, array.max, array.length), (Some(2), Some(2), None));
        assert_eq!(array.unique, Some(true));
        assert_eq!(array.items, None);
    }
}
