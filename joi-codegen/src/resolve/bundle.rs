/// Graph-mode resolution: one labeled node per definition, ordered so every
/// binding is declared before it is used.
use std::collections::HashSet;

use indexmap::{IndexMap, IndexSet};
use serde_json::{Map, Value};

use super::reference::parse_reference;
use super::{camel_label, resolve_with, Context, ResolveError};
use crate::ast::{Node, RefMode};
use crate::options::ResolveOptions;

/// Containers a bundle can be read from, as pointer segments.
const SECTIONS: [(&str, &[&str]); 2] = [
    ("definitions", &["definitions"]),
    ("components.schemas", &["components", "schemas"]),
];

/// Definition keys of the bundle being resolved and the labels they bind to.
#[derive(Debug, Default)]
pub struct BundleScope {
    labels: IndexMap<String, String>,
}

impl BundleScope {
    pub fn new<'a>(keys: impl IntoIterator<Item = &'a String>) -> Result<Self, ResolveError> {
        let mut labels = IndexMap::new();
        let mut owners: IndexMap<String, String> = IndexMap::new();
        for key in keys {
            let label = camel_label(key);
            if let Some(first) = owners.get(&label) {
                return Err(ResolveError::DuplicateLabel {
                    label,
                    first: first.clone(),
                    second: key.clone(),
                });
            }
            owners.insert(label.clone(), key.clone());
            labels.insert(key.clone(), label);
        }
        Ok(Self { labels })
    }

    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }

    /// Label bound by a `#/<section>/<key>` pointer. A key outside the
    /// bundle still yields its label, so ordering reports it as unresolved.
    /// Pointers into a member (`.../<key>/properties/x`) are `None` and get
    /// inlined instead.
    pub fn target_for(&self, reference: &str) -> Option<String> {
        let (id, segments) = parse_reference(reference);
        if !id.is_empty() {
            return None;
        }
        let (key, section) = segments.split_last()?;
        let in_section = SECTIONS
            .iter()
            .any(|(_, path)| section.iter().map(String::as_str).eq(path.iter().copied()));
        if !in_section {
            return None;
        }
        Some(match self.label(key) {
            Some(label) => label.to_string(),
            None => {
                tracing::debug!(reference, "reference to a definition outside the bundle");
                camel_label(key)
            }
        })
    }
}

/// The first bundle container present on the document, with its name.
pub fn find_section(document: &Value) -> Result<(&'static str, &Map<String, Value>), ResolveError> {
    for (name, path) in SECTIONS {
        let mut cursor = Some(document);
        for segment in path {
            cursor = cursor.and_then(|v| v.get(*segment));
        }
        match cursor {
            Some(Value::Object(map)) => return Ok((name, map)),
            Some(_) => {
                return Err(ResolveError::SectionNotObject {
                    section: name.to_string(),
                })
            }
            None => continue,
        }
    }
    Err(ResolveError::MissingSection {
        section: SECTIONS
            .iter()
            .map(|(name, _)| *name)
            .collect::<Vec<_>>()
            .join("' or '"),
    })
}

/// Resolve the bundle container of a whole document. Without an explicit
/// root, the document itself is the root for inlined pointers.
pub fn resolve_section(
    document: &Value,
    options: &ResolveOptions,
) -> Result<Vec<Node>, ResolveError> {
    let (section, definitions) = find_section(document)?;
    tracing::debug!(section, count = definitions.len(), "resolving bundle");

    if options.root.is_some() {
        return resolve_bundle(definitions, options);
    }
    let rooted = ResolveOptions {
        root: Some(document.clone()),
        ..options.clone()
    };
    resolve_bundle(definitions, &rooted)
}

struct Pending {
    label: String,
    node: Node,
    dependencies: IndexSet<String>,
}

/// Resolve every definition and order them by repeatedly taking the set
/// whose dependencies are all emitted. A definition that depends on itself
/// is ready too; its self-references are rewritten to lazy or link form.
pub fn resolve_bundle(
    definitions: &Map<String, Value>,
    options: &ResolveOptions,
) -> Result<Vec<Node>, ResolveError> {
    let scope = BundleScope::new(definitions.keys())?;
    let ctx = Context::new(options, Some(&scope));

    let mut pending: Vec<Pending> = definitions
        .iter()
        .map(|(key, schema)| {
            let label = scope.label(key).unwrap_or(key).to_string();
            let node = resolve_with(schema, &ctx).with_label(label.clone());
            let dependencies = node
                .references()
                .into_iter()
                .map(|r| r.target.clone())
                .collect();
            Pending {
                label,
                node,
                dependencies,
            }
        })
        .collect();

    let mut emitted: HashSet<String> = HashSet::new();
    let mut ordered = Vec::with_capacity(pending.len());
    let mut round = 0;

    while !pending.is_empty() {
        round += 1;
        let (ready, blocked): (Vec<Pending>, Vec<Pending>) = pending.into_iter().partition(|p| {
            p.dependencies
                .iter()
                .all(|dep| *dep == p.label || emitted.contains(dep))
        });

        if ready.is_empty() {
            return Err(ResolveError::UnresolvableDependencies {
                labels: blocked.into_iter().map(|p| p.label).collect(),
            });
        }

        tracing::debug!(
            round,
            ready = ?ready.iter().map(|p| p.label.as_str()).collect::<Vec<_>>(),
            "bundle round"
        );

        for mut entry in ready {
            if entry.dependencies.contains(&entry.label) {
                break_self_cycle(&mut entry.node, &entry.label, options);
            }
            emitted.insert(entry.label);
            ordered.push(entry.node);
        }
        pending = blocked;
    }

    Ok(ordered)
}

fn break_self_cycle(node: &mut Node, label: &str, options: &ResolveOptions) {
    let mode = if options.dialect.use_legacy {
        RefMode::Lazy
    } else {
        RefMode::Link
    };
    tracing::debug!(label, ?mode, "breaking self reference");

    node.for_each_reference_mut(&mut |reference| {
        if reference.target == label {
            reference.mode = mode;
        }
    });
    if mode == RefMode::Link {
        node.anchor = Some(label.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Kind, ReferenceNode};
    use crate::options::Dialect;
    use serde_json::json;

    fn labels(nodes: &[Node]) -> Vec<&str> {
        nodes.iter().filter_map(|n| n.label.as_deref()).collect()
    }

    fn definitions(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("fixture must be an object"),
        }
    }

    #[test]
    fn test_dependencies_come_first() {
        let defs = definitions(json!({
            "a": {"properties": {"b": {"$ref": "#/definitions/b"}}},
            "b": {"items": {"$ref": "#/definitions/c"}},
            "c": {"type": "string"}
        }));
        let nodes = resolve_bundle(&defs, &ResolveOptions::default()).unwrap();
        assert_eq!(labels(&nodes), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_ready_definitions_keep_declaration_order() {
        let defs = definitions(json!({
            "zeta": {"type": "string"},
            "alpha": {"type": "number"},
            "user": {"anyOf": [{"$ref": "#/definitions/alpha"}, {"$ref": "#/definitions/zeta"}]}
        }));
        let nodes = resolve_bundle(&defs, &ResolveOptions::default()).unwrap();
        assert_eq!(labels(&nodes), vec!["zeta", "alpha", "user"]);
    }

    #[test]
    fn test_self_reference_becomes_link() {
        let defs = definitions(json!({
            "tree_node": {
                "type": "object",
                "properties": {"child": {"$ref": "#/definitions/tree_node"}}
            }
        }));
        let nodes = resolve_bundle(&defs, &ResolveOptions::default()).unwrap();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].anchor.as_deref(), Some("treeNode"));
        let refs = nodes[0].references();
        assert_eq!(refs.len(), 1);
        assert_eq!(
            refs[0],
            &ReferenceNode {
                target: "treeNode".into(),
                mode: RefMode::Link
            }
        );
    }

    #[test]
    fn test_self_reference_becomes_lazy_for_legacy() {
        let defs = definitions(json!({
            "list": {"type": "array", "items": {"$ref": "#/definitions/list"}}
        }));
        let options = ResolveOptions::default().dialect(Dialect {
            use_legacy: true,
            use_extension: false,
        });
        let nodes = resolve_bundle(&defs, &options).unwrap();
        assert_eq!(nodes[0].anchor, None);
        assert_eq!(nodes[0].references()[0].mode, RefMode::Lazy);
    }

    #[test]
    fn test_two_cycle_is_an_error() {
        let defs = definitions(json!({
            "ping": {"properties": {"next": {"$ref": "#/definitions/pong"}}},
            "pong": {"properties": {"next": {"$ref": "#/definitions/ping"}}},
            "free": {"type": "boolean"}
        }));
        let err = resolve_bundle(&defs, &ResolveOptions::default()).unwrap_err();
        match err {
            ResolveError::UnresolvableDependencies { labels } => {
                assert_eq!(labels, vec!["ping".to_string(), "pong".to_string()]);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_missing_peer_definition_is_an_error() {
        let doc = json!({"definitions": {
            "user": {"properties": {"home": {"$ref": "#/definitions/address"}}},
            "free": {"type": "boolean"}
        }});
        let err = resolve_section(&doc, &ResolveOptions::default()).unwrap_err();
        match err {
            ResolveError::UnresolvableDependencies { labels } => {
                assert_eq!(labels, vec!["user".to_string()]);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_labels_are_rejected() {
        let defs = definitions(json!({
            "billing_address": {"type": "string"},
            "billingAddress": {"type": "string"}
        }));
        assert!(matches!(
            resolve_bundle(&defs, &ResolveOptions::default()),
            Err(ResolveError::DuplicateLabel { .. })
        ));
    }

    #[test]
    fn test_deep_pointer_is_inlined() {
        let doc = json!({
            "definitions": {
                "address": {"properties": {"city": {"type": "number"}}},
                "office": {"properties": {"city": {"$ref": "#/definitions/address/properties/city"}}}
            }
        });
        let nodes = resolve_section(&doc, &ResolveOptions::default()).unwrap();
        assert_eq!(labels(&nodes), vec!["address", "office"]);
        assert!(nodes[1].references().is_empty());
        let Kind::Object(office) = &nodes[1].kind else {
            panic!("expected object");
        };
        assert!(matches!(office.keys.as_ref().unwrap()["city"].kind, Kind::Number(_)));
    }

    #[test]
    fn test_reference_to_whole_definition_is_direct() {
        let doc = json!({
            "components": {"schemas": {
                "address": {"type": "object"},
                "billing": {"$ref": "#/components/schemas/address"}
            }}
        });
        let nodes = resolve_section(&doc, &ResolveOptions::default()).unwrap();
        assert_eq!(
            nodes[1].kind,
            Kind::Reference(ReferenceNode {
                target: "address".into(),
                mode: RefMode::Direct,
            })
        );
        assert_eq!(nodes[1].label.as_deref(), Some("billing"));
    }

    #[test]
    fn test_find_section() {
        let (name, _) = find_section(&json!({"definitions": {}})).unwrap();
        assert_eq!(name, "definitions");
        let (name, _) = find_section(&json!({"components": {"schemas": {}}})).unwrap();
        assert_eq!(name, "components.schemas");
        assert!(matches!(
            find_section(&json!({"definitions": []})),
            Err(ResolveError::SectionNotObject { .. })
        ));
        let err = find_section(&json!({"type": "object"})).unwrap_err();
        assert!(matches!(err, ResolveError::MissingSection { .. }));
        assert!(err.to_string().contains("components.schemas"));
    }

    #[test]
    fn test_target_for() {
        let keys = vec!["address".to_string()];
        let scope = BundleScope::new(&keys).unwrap();
        assert_eq!(scope.target_for("#/definitions/address").as_deref(), Some("address"));
        assert_eq!(
            scope.target_for("#/components/schemas/address").as_deref(),
            Some("address")
        );
        assert_eq!(
            scope.target_for("#/definitions/home_address").as_deref(),
            Some("homeAddress")
        );
        assert_eq!(scope.target_for("#/definitions/address/properties/city"), None);
        assert_eq!(scope.target_for("other.json#/definitions/address"), None);
        assert_eq!(scope.target_for("#/definitions/missing"), None);
    }
}
