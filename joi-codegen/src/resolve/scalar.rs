/// Resolvers for the leaf primitives: string, number, boolean, any.
use regex::RegexBuilder;
use serde_json::{Map, Number, Value};

use super::{collapse_bounds, get_u64};
use crate::ast::{BooleanNode, Kind, Node, NumberNode, Pattern, StringFormat, StringNode};

pub const DATE_REGEX: &str = r"(\d{4})-(0[1-9]|1[0-2])-(0[1-9]|[12][0-9]|3[01])";
pub const TIME_REGEX: &str =
    r"([01][0-9]|2[0-3]):([0-5][0-9]):([0-5][0-9]|60)(.[0-9]{3})?(Z|(\+|-)([01][0-9]|2[0-3]):([0-5][0-9]))";
pub const OCTET_REGEX: &str = r"(0x|0X)?[0-9a-fA-F]+";

fn anchored(source: &str) -> Pattern {
    Pattern::case_insensitive(format!("^{source}$"))
}

pub fn date_time_regex() -> String {
    format!("{DATE_REGEX}T{TIME_REGEX}")
}

pub(crate) fn resolve_string(obj: &Map<String, Value>) -> Node {
    let mut string = StringNode::default();
    // Joi rejects '' unless allowed; a named format never accepts it.
    let mut zero_min = true;

    match obj.get("format").and_then(Value::as_str) {
        Some("date") => string.regex = Some(anchored(DATE_REGEX)),
        Some("time") => string.regex = Some(anchored(TIME_REGEX)),
        Some("date-time") => string.regex = Some(anchored(&date_time_regex())),
        Some("binary") => string.regex = Some(anchored(OCTET_REGEX)),
        Some(name) => {
            if let Some(format) = named_format(name) {
                string.format = Some(format);
                zero_min = false;
            }
        }
        None => {}
    }

    if let Some(pattern) = obj.get("pattern").and_then(Value::as_str) {
        string.regex = Some(Pattern::new(pattern));
    }

    if let Some(regex) = &string.regex {
        if !matches_empty(regex) {
            zero_min = false;
        }
    }

    let min_length = get_u64(obj, "minLength");
    let (min, max, length) = collapse_bounds(min_length, get_u64(obj, "maxLength"));
    string.min = min;
    string.max = max;
    string.length = length;

    let mut node_allow = None;
    let implied_zero = (min_length.is_none() && zero_min) || min_length == Some(0);
    if implied_zero && !obj.contains_key("enum") {
        if string.length.is_none() {
            string.min = Some(0);
        }
        node_allow = Some(vec![Value::String(String::new())]);
    }

    let mut node = Node::new(Kind::String(string));
    node.allow = node_allow;
    node
}

fn named_format(name: &str) -> Option<StringFormat> {
    match name {
        "email" => Some(StringFormat::Email),
        "hostname" => Some(StringFormat::Hostname),
        "ipv4" => Some(StringFormat::Ipv4),
        "ipv6" => Some(StringFormat::Ipv6),
        "uri" => Some(StringFormat::Uri),
        "byte" => Some(StringFormat::Base64),
        "uuid" | "guid" => Some(StringFormat::Uuid),
        _ => None,
    }
}

/// Whether the pattern accepts the empty string. Patterns the regex engine
/// rejects are kept as written and assumed not to.
fn matches_empty(pattern: &Pattern) -> bool {
    match RegexBuilder::new(&pattern.source)
        .case_insensitive(pattern.flags.contains('i'))
        .build()
    {
        Ok(regex) => regex.is_match(""),
        Err(error) => {
            tracing::warn!(pattern = %pattern.source, %error, "pattern not checked against ''");
            false
        }
    }
}

fn get_number(obj: &Map<String, Value>, key: &str) -> Option<Number> {
    match obj.get(key) {
        Some(Value::Number(n)) => Some(n.clone()),
        _ => None,
    }
}

/// `exclusiveMinimum: true` (draft 4) repeats `minimum` as the exclusive
/// bound; a number (draft 6) is the exclusive bound itself.
fn exclusive_bound(
    obj: &Map<String, Value>,
    key: &str,
    inclusive: &Option<Number>,
) -> Option<Number> {
    match obj.get(key) {
        Some(Value::Bool(true)) => inclusive.clone(),
        Some(Value::Number(n)) => Some(n.clone()),
        _ => None,
    }
}

pub(crate) fn resolve_number(obj: &Map<String, Value>) -> Node {
    let min = get_number(obj, "minimum");
    let max = get_number(obj, "maximum");
    let number = NumberNode {
        integer: (obj.get("type").and_then(Value::as_str) == Some("integer")).then_some(true),
        greater: exclusive_bound(obj, "exclusiveMinimum", &min),
        less: exclusive_bound(obj, "exclusiveMaximum", &max),
        min,
        max,
        multiple: get_number(obj, "multipleOf"),
    };
    Node::new(Kind::Number(number))
}

pub(crate) fn resolve_boolean(_obj: &Map<String, Value>) -> Node {
    Node::new(Kind::Boolean(BooleanNode::default()))
}

pub(crate) fn resolve_any(_obj: &Map<String, Value>) -> Node {
    Node::any()
}
