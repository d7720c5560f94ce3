/// Per-kind statement generators. Each one writes the constructor call,
/// then its own modifiers, then the modifiers common to every kind.
///
/// Modifier order is fixed: size (`length` or `min`/`max`), regex,
/// format, then [`emit_common`].
use serde_json::{json, Value};

use super::emit::generate_into;
use super::tokens::{Token, TokenWriter};
use crate::ast::{
    ArrayNode, BooleanNode, Combinator, Node, NumberNode, ObjectNode, PatternTarget,
    ReferenceNode, RefMode, StringFormat, StringNode,
};

/// `allow`/`valid`/`invalid`, `default`, `description`, presence flags.
pub fn emit_common(w: &mut TokenWriter, node: &Node) {
    for (name, values) in [
        ("allow", &node.allow),
        ("valid", &node.valid),
        ("invalid", &node.invalid),
    ] {
        if let Some(values) = values {
            w.call_values(name, values);
        }
    }
    if let Some(default) = &node.default {
        w.call1("default", Token::Json(default.clone()));
    }
    if let Some(description) = &node.description {
        w.call1("description", Token::Str(description.clone()));
    }
    w.flag("required", node.flags.required);
    w.flag("optional", node.flags.optional);
    w.flag("forbidden", node.flags.forbidden);
    w.flag("strip", node.flags.strip);
}

/// `.id('anchor')`, always the last link in a chain.
pub fn emit_anchor(w: &mut TokenWriter, node: &Node) {
    if let Some(anchor) = &node.anchor {
        w.call1("id", Token::Str(anchor.clone()));
    }
}

fn emit_size(w: &mut TokenWriter, min: Option<u64>, max: Option<u64>, length: Option<u64>) {
    if let Some(length) = length {
        w.call1("length", Token::Json(json!(length)));
        return;
    }
    if let Some(min) = min {
        w.call1("min", Token::Json(json!(min)));
    }
    if let Some(max) = max {
        w.call1("max", Token::Json(json!(max)));
    }
}

/// Children one per line inside `open`/`close`.
fn emit_list(w: &mut TokenWriter, open: Token, close: Token, items: &[Node]) {
    w.block(open, close, items, |w, item| generate_into(w, item));
}

pub fn emit_any(w: &mut TokenWriter, node: &Node) {
    w.joi("any()");
    emit_common(w, node);
}

pub fn emit_boolean(w: &mut TokenWriter, node: &Node, boolean: &BooleanNode) {
    w.joi("boolean()");
    match boolean.insensitive {
        Some(false) => w.call0("sensitive"),
        Some(true) | None => {}
    }
    emit_common(w, node);
}

pub fn emit_number(w: &mut TokenWriter, node: &Node, number: &NumberNode) {
    w.joi("number()");
    // A draft-4 exclusive bound repeats the inclusive one; only the
    // exclusive form is emitted then.
    if let Some(min) = &number.min {
        if number.greater.as_ref() != Some(min) {
            w.call1("min", Token::Json(Value::Number(min.clone())));
        }
    }
    if let Some(max) = &number.max {
        if number.less.as_ref() != Some(max) {
            w.call1("max", Token::Json(Value::Number(max.clone())));
        }
    }
    if let Some(greater) = &number.greater {
        w.call1("greater", Token::Json(Value::Number(greater.clone())));
    }
    if let Some(less) = &number.less {
        w.call1("less", Token::Json(Value::Number(less.clone())));
    }
    if let Some(multiple) = &number.multiple {
        w.call1("multiple", Token::Json(Value::Number(multiple.clone())));
    }
    w.flag("integer", number.integer);
    emit_common(w, node);
}

pub fn emit_string(w: &mut TokenWriter, node: &Node, string: &StringNode) {
    w.joi("string()");
    emit_size(w, string.min, string.max, string.length);
    if let Some(regex) = &string.regex {
        w.call1("regex", Token::Regex(regex.clone()));
    }
    match string.format {
        Some(StringFormat::Email) => w.call0("email"),
        Some(StringFormat::Hostname) => w.call0("hostname"),
        Some(StringFormat::Ipv4) => w.call1("ip", Token::Json(json!({"version": ["ipv4"]}))),
        Some(StringFormat::Ipv6) => w.call1("ip", Token::Json(json!({"version": ["ipv6"]}))),
        Some(StringFormat::Uri) => w.call0("uri"),
        Some(StringFormat::Base64) => w.call0("base64"),
        Some(StringFormat::Uuid) => w.call0("guid"),
        None => {}
    }
    w.flag("insensitive", string.insensitive);
    w.flag("trim", string.trim);
    w.flag("lowercase", string.lowercase);
    w.flag("uppercase", string.uppercase);
    emit_common(w, node);
}

pub fn emit_array(w: &mut TokenWriter, node: &Node, array: &ArrayNode) {
    w.joi("array()");
    if let Some(ordered) = &array.ordered {
        w.text(".ordered");
        emit_list(w, Token::OpenParen, Token::CloseParen, ordered);
    }
    if let Some(items) = &array.items {
        w.text(".items");
        emit_list(w, Token::OpenParen, Token::CloseParen, items);
    }
    emit_size(w, array.min, array.max, array.length);
    if array.unique == Some(true) {
        w.call0("unique");
    }
    emit_common(w, node);
}

pub fn emit_object(w: &mut TokenWriter, node: &Node, object: &ObjectNode) {
    w.joi("object()");
    if let Some(keys) = &object.keys {
        w.text(".keys");
        w.push(Token::OpenParen);
        w.block(Token::OpenBrace, Token::CloseBrace, keys, |w, (key, child)| {
            w.push(Token::Key(key.clone()));
            w.push(Token::Colon);
            generate_into(w, child);
        });
        w.push(Token::CloseParen);
    }
    emit_size(w, object.min, object.max, object.length);
    for pattern in &object.patterns {
        w.text(".pattern");
        w.push(Token::OpenParen);
        match &pattern.target {
            PatternTarget::Regex(regex) => w.push(Token::Regex(regex.clone())),
            PatternTarget::Schema(schema) => generate_into(w, schema),
        }
        w.push(Token::Comma);
        generate_into(w, &pattern.schema);
        w.push(Token::CloseParen);
    }
    for (key, peers) in &object.with {
        w.text(".with");
        w.push(Token::OpenParen);
        w.push(Token::Str(key.clone()));
        w.push(Token::Comma);
        w.push(Token::Json(Value::from(peers.clone())));
        w.push(Token::CloseParen);
    }
    w.flag("unknown", object.unknown);
    emit_common(w, node);
}

pub fn emit_alternatives(w: &mut TokenWriter, node: &Node, combinator: &Combinator) {
    w.joi("alternatives()");
    match combinator {
        Combinator::Not(inner) => {
            w.text(".when");
            w.push(Token::OpenParen);
            w.joi("alternatives().try");
            w.push(Token::OpenParen);
            generate_into(w, inner);
            w.push(Token::CloseParen);
            w.push(Token::Comma);
            w.block(
                Token::OpenBrace,
                Token::CloseBrace,
                [("then", "any().forbidden()"), ("otherwise", "any()")],
                |w, (key, schema)| {
                    w.push(Token::Key(key.into()));
                    w.push(Token::Colon);
                    w.joi(schema);
                },
            );
            w.push(Token::CloseParen);
        }
        Combinator::AnyOf(items) => {
            w.text(".try");
            emit_list(w, Token::OpenParen, Token::CloseParen, items);
        }
        Combinator::AllOf(items) => {
            w.call1("match", Token::Str("all".into()));
            w.text(".try");
            emit_list(w, Token::OpenParen, Token::CloseParen, items);
        }
        Combinator::OneOf(items) => {
            w.call1("match", Token::Str("one".into()));
            w.text(".try");
            emit_list(w, Token::OpenParen, Token::CloseParen, items);
        }
    }
    emit_common(w, node);
}

/// `Joi.extendedJoi.allOf().items([...])` and its `oneOf` twin.
pub fn emit_extension(w: &mut TokenWriter, node: &Node, constructor: &str, items: &[Node]) {
    w.push(Token::JoiName);
    w.text(".");
    w.push(Token::ExtendedJoiName);
    w.text(format!(".{constructor}().items"));
    w.push(Token::OpenParen);
    emit_list(w, Token::OpenBracket, Token::CloseBracket, items);
    w.push(Token::CloseParen);
    emit_common(w, node);
}

pub fn emit_reference(w: &mut TokenWriter, node: &Node, reference: &ReferenceNode) {
    w.push(match reference.mode {
        RefMode::Direct => Token::Ref,
        RefMode::Lazy => Token::Lazy,
        RefMode::Link => Token::Link,
    });
    w.text(reference.target.clone());
    emit_common(w, node);
}
