/// Top-level composition: dispatches each node to its generator and wraps
/// labeled nodes in a binding declaration.
use super::nodes::*;
use super::tokens::{SchemaType, Token, TokenWriter};
use crate::ast::{Kind, Node};

/// Token stream for one schema expression.
pub fn generate(node: &Node) -> Vec<Token> {
    let mut w = TokenWriter::new();
    generate_into(&mut w, node);
    w.finish()
}

/// Dispatcher shared by the per-kind generators for child nodes.
pub fn generate_into(w: &mut TokenWriter, node: &Node) {
    w.push(Token::OpenSchema);
    match &node.kind {
        Kind::Any => emit_any(w, node),
        Kind::Boolean(boolean) => emit_boolean(w, node, boolean),
        Kind::Number(number) => emit_number(w, node, number),
        Kind::String(string) => emit_string(w, node, string),
        Kind::Array(array) => emit_array(w, node, array),
        Kind::Object(object) => emit_object(w, node, object),
        Kind::Alternatives(combinator) => emit_alternatives(w, node, combinator),
        Kind::AllOf(items) => emit_extension(w, node, "allOf", items),
        Kind::OneOf(items) => emit_extension(w, node, "oneOf", items),
        Kind::Reference(reference) => emit_reference(w, node, reference),
    }
    emit_anchor(w, node);
    w.push(Token::CloseSchema);
}

/// Annotation type for a binding; bare references have none.
pub fn schema_type(kind: &Kind) -> Option<SchemaType> {
    Some(match kind {
        Kind::Any => SchemaType::Any,
        Kind::Array(_) => SchemaType::Array,
        Kind::Boolean(_) => SchemaType::Boolean,
        Kind::Number(_) => SchemaType::Number,
        Kind::Object(_) => SchemaType::Object,
        Kind::String(_) => SchemaType::String,
        Kind::Alternatives(_) => SchemaType::Alternatives,
        Kind::AllOf(_) => SchemaType::AllOf,
        Kind::OneOf(_) => SchemaType::OneOf,
        Kind::Reference(_) => return None,
    })
}

/// A labeled node becomes `const <label>... = <expr>;`. An unlabeled
/// node stays a bare expression.
pub fn generate_statement(node: &Node) -> Vec<Token> {
    let mut w = TokenWriter::new();
    match &node.label {
        Some(label) => {
            w.push(Token::OpenTitle);
            w.text(label.clone());
            w.push(Token::CloseTitle(schema_type(&node.kind)));
            generate_into(&mut w, node);
            w.push(Token::StatementEnd);
        }
        None => generate_into(&mut w, node),
    }
    w.finish()
}

/// One statement per node, in the given order.
pub fn generate_bundle(nodes: &[Node]) -> Vec<Token> {
    nodes.iter().flat_map(generate_statement).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ObjectNode, RefMode, ReferenceNode};

    #[test]
    fn test_generate_is_wrapped_in_schema_markers() {
        let tokens = generate(&Node::any());
        assert_eq!(
            tokens,
            vec![
                Token::OpenSchema,
                Token::JoiName,
                Token::Text(".any()".into()),
                Token::CloseSchema,
            ]
        );
    }

    #[test]
    fn test_statement_with_label() {
        let node = Node::new(Kind::Object(ObjectNode::default())).with_label("address");
        let tokens = generate_statement(&node);
        assert_eq!(&tokens[..3], &[
            Token::OpenTitle,
            Token::Text("address".into()),
            Token::CloseTitle(Some(SchemaType::Object)),
        ]);
        assert_eq!(tokens.last(), Some(&Token::StatementEnd));
    }

    #[test]
    fn test_statement_without_label_is_expression() {
        let tokens = generate_statement(&Node::any());
        assert_eq!(tokens, generate(&Node::any()));
    }

    #[test]
    fn test_reference_statement_has_no_type() {
        let node = Node::reference("address").with_label("billingAddress");
        assert_eq!(generate_statement(&node)[2], Token::CloseTitle(None));
    }

    #[test]
    fn test_anchor_comes_after_common_modifiers() {
        let mut node = Node::new(Kind::Object(ObjectNode {
            keys: Some(
                [(
                    "child".to_string(),
                    Node::new(Kind::Reference(ReferenceNode {
                        target: "tree".into(),
                        mode: RefMode::Link,
                    })),
                )]
                .into_iter()
                .collect(),
            ),
            ..ObjectNode::default()
        }));
        node.description = Some("a tree".into());
        node.anchor = Some("tree".into());
        let tokens = generate(&node);
        let n = tokens.len();
        assert_eq!(tokens[n - 1], Token::CloseSchema);
        assert_eq!(tokens[n - 2], Token::CloseParen);
        assert_eq!(tokens[n - 3], Token::Str("tree".into()));
        assert_eq!(tokens[n - 5], Token::Text(".id".into()));
    }

    #[test]
    fn test_bundle_concatenates_statements() {
        let nodes = vec![
            Node::any().with_label("a"),
            Node::reference("a").with_label("b"),
        ];
        let tokens = generate_bundle(&nodes);
        assert_eq!(tokens.iter().filter(|t| **t == Token::StatementEnd).count(), 2);
        assert!(tokens.contains(&Token::Ref));
    }
}
