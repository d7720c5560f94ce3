use serde_json::{Map, Value};

use super::{resolve_with, Context};
use crate::ast::{Combinator, Kind, Node};

const COMBINATORS: [&str; 4] = ["not", "anyOf", "allOf", "oneOf"];

pub(crate) fn is_combinator(obj: &Map<String, Value>) -> bool {
    COMBINATORS.iter().any(|key| obj.contains_key(*key))
}

/// One combinator per node, picked in the order `not`, `anyOf`, `allOf`,
/// `oneOf`. The extension dialect lowers `allOf`/`oneOf` to their own kinds.
pub(crate) fn resolve_alternatives(obj: &Map<String, Value>, ctx: &Context<'_>) -> Node {
    if let Some(inner) = obj.get("not") {
        let negated = resolve_with(inner, ctx);
        return Node::new(Kind::Alternatives(Combinator::Not(Box::new(negated))));
    }

    let resolve_list = |key: &str| -> Option<Vec<Node>> {
        let list = obj.get(key)?.as_array()?;
        Some(list.iter().map(|item| resolve_with(item, ctx)).collect())
    };

    let dialect = ctx.options.dialect;
    if let Some(items) = resolve_list("anyOf") {
        Node::new(Kind::Alternatives(Combinator::AnyOf(items)))
    } else if let Some(items) = resolve_list("allOf") {
        if dialect.use_extension {
            Node::new(Kind::AllOf(items))
        } else {
            Node::new(Kind::Alternatives(Combinator::AllOf(items)))
        }
    } else if let Some(items) = resolve_list("oneOf") {
        if dialect.use_extension {
            Node::new(Kind::OneOf(items))
        } else {
            Node::new(Kind::Alternatives(Combinator::OneOf(items)))
        }
    } else {
        tracing::debug!("combinator keyword without a schema list, resolved as any");
        Node::any()
    }
}
