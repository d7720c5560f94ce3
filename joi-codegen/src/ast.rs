/// Intermediate schema model: the tagged values standing between a JSON
/// Schema document and the generated Joi source. Built once by the
/// resolver, read by the generator. Only the bundle resolver touches a
/// node after construction, to turn self-references into lazy/link form.
use indexmap::IndexMap;
use serde_json::{Number, Value};

/// One resolved schema node. The fields shared by every Joi primitive live
/// here; the per-primitive ones live in [`Kind`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Node {
    pub kind: Kind,
    /// Identifier-safe binding name derived from `title`.
    pub label: Option<String>,
    pub description: Option<String>,
    pub default: Option<Value>,
    /// Named anchor (`.id('...')`) used as the target of `Joi.link`.
    pub anchor: Option<String>,
    pub flags: Flags,
    pub allow: Option<Vec<Value>>,
    pub valid: Option<Vec<Value>>,
    /// No JSON Schema keyword maps here; set only on nodes built directly.
    pub invalid: Option<Vec<Value>>,
}

/// Presence and other zero-argument modifiers available on every primitive.
/// `Some(true)` emits `.flag()`, `Some(false)` emits `.flag(false)`.
/// The resolver sets `required` and `forbidden`; `optional` and `strip` are
/// for callers that build nodes directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Flags {
    pub required: Option<bool>,
    pub optional: Option<bool>,
    pub forbidden: Option<bool>,
    pub strip: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Kind {
    #[default]
    Any,
    Array(ArrayNode),
    Boolean(BooleanNode),
    Number(NumberNode),
    Object(ObjectNode),
    String(StringNode),
    Alternatives(Combinator),
    /// `allOf` through the custom extension (extension dialect only).
    AllOf(Vec<Node>),
    /// `oneOf` through the custom extension (extension dialect only).
    OneOf(Vec<Node>),
    Reference(ReferenceNode),
}

impl Kind {
    pub fn name(&self) -> &'static str {
        match self {
            Kind::Any => "any",
            Kind::Array(_) => "array",
            Kind::Boolean(_) => "boolean",
            Kind::Number(_) => "number",
            Kind::Object(_) => "object",
            Kind::String(_) => "string",
            Kind::Alternatives(_) => "alternatives",
            Kind::AllOf(_) => "allOf",
            Kind::OneOf(_) => "oneOf",
            Kind::Reference(_) => "reference",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ArrayNode {
    /// List mode holds one schema every element must match. In tuple mode
    /// this holds the schema for trailing elements, if any are allowed.
    pub items: Option<Vec<Node>>,
    /// Tuple mode: positional element schemas.
    pub ordered: Option<Vec<Node>>,
    pub min: Option<u64>,
    pub max: Option<u64>,
    pub length: Option<u64>,
    pub unique: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BooleanNode {
    /// `Some(false)` emits `.sensitive()`. Never set by the resolver.
    pub insensitive: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NumberNode {
    pub integer: Option<bool>,
    pub min: Option<Number>,
    pub max: Option<Number>,
    /// Exclusive lower bound. Independent of `min`: both may be set.
    pub greater: Option<Number>,
    /// Exclusive upper bound. Independent of `max`: both may be set.
    pub less: Option<Number>,
    pub multiple: Option<Number>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectNode {
    pub keys: Option<IndexMap<String, Node>>,
    /// `None` leaves the library default in place.
    pub unknown: Option<bool>,
    pub min: Option<u64>,
    pub max: Option<u64>,
    pub length: Option<u64>,
    /// Co-occurrence rules: when the key is present, every peer must be too.
    pub with: IndexMap<String, Vec<String>>,
    pub patterns: Vec<PatternProperty>,
}

/// A `(key pattern, schema)` rule for properties not named in `keys`.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternProperty {
    pub target: PatternTarget,
    pub schema: Node,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PatternTarget {
    Regex(Pattern),
    /// Key schema instead of a regex. The resolver only produces `Regex`;
    /// this form is for nodes built directly.
    Schema(Box<Node>),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct StringNode {
    pub min: Option<u64>,
    pub max: Option<u64>,
    pub length: Option<u64>,
    pub regex: Option<Pattern>,
    pub format: Option<StringFormat>,
    // The case and trim modifiers have no JSON Schema keyword; they are
    // only set on nodes built directly.
    pub insensitive: Option<bool>,
    pub trim: Option<bool>,
    pub lowercase: Option<bool>,
    pub uppercase: Option<bool>,
}

/// A regular expression kept as source text plus JS flags, rendered as a
/// `/source/flags` literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    pub source: String,
    pub flags: String,
}

impl Pattern {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            flags: String::new(),
        }
    }

    pub fn case_insensitive(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            flags: "i".into(),
        }
    }

    /// Pattern matching every key; used for `additionalProperties` schemas.
    pub fn catch_all() -> Self {
        Self::new("^")
    }
}

/// Named string formats with a dedicated Joi rule. At most one per node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StringFormat {
    Email,
    Hostname,
    Ipv4,
    Ipv6,
    Uri,
    Base64,
    Uuid,
}

/// The single combinator carried by an `alternatives` node.
#[derive(Debug, Clone, PartialEq)]
pub enum Combinator {
    Not(Box<Node>),
    AnyOf(Vec<Node>),
    AllOf(Vec<Node>),
    OneOf(Vec<Node>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceNode {
    /// Label of the bundle definition this node points at.
    pub target: String,
    pub mode: RefMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RefMode {
    /// Plain use of the target's binding.
    #[default]
    Direct,
    /// `Joi.lazy(() => binding)`: deferred self-reference (legacy library).
    Lazy,
    /// `Joi.link('#anchor')`: named self-reference (current library).
    Link,
}

impl Node {
    pub fn new(kind: Kind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    pub fn any() -> Self {
        Self::new(Kind::Any)
    }

    pub fn reference(target: impl Into<String>) -> Self {
        Self::new(Kind::Reference(ReferenceNode {
            target: target.into(),
            mode: RefMode::Direct,
        }))
    }

    pub fn required(mut self) -> Self {
        self.flags.required = Some(true);
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Direct children, in generation order.
    pub fn children(&self) -> Vec<&Node> {
        match &self.kind {
            Kind::Any | Kind::Boolean(_) | Kind::Number(_) | Kind::String(_) => Vec::new(),
            Kind::Reference(_) => Vec::new(),
            Kind::Array(array) => array
                .ordered
                .iter()
                .flatten()
                .chain(array.items.iter().flatten())
                .collect(),
            Kind::Object(object) => {
                let mut out: Vec<&Node> = object.keys.iter().flat_map(|k| k.values()).collect();
                for pattern in &object.patterns {
                    if let PatternTarget::Schema(target) = &pattern.target {
                        out.push(target);
                    }
                    out.push(&pattern.schema);
                }
                out
            }
            Kind::Alternatives(Combinator::Not(inner)) => vec![inner.as_ref()],
            Kind::Alternatives(
                Combinator::AnyOf(items) | Combinator::AllOf(items) | Combinator::OneOf(items),
            )
            | Kind::AllOf(items)
            | Kind::OneOf(items) => items.iter().collect(),
        }
    }

    /// Mutable counterpart of [`Node::children`].
    pub fn children_mut(&mut self) -> Vec<&mut Node> {
        match &mut self.kind {
            Kind::Any | Kind::Boolean(_) | Kind::Number(_) | Kind::String(_) => Vec::new(),
            Kind::Reference(_) => Vec::new(),
            Kind::Array(array) => array
                .ordered
                .iter_mut()
                .flatten()
                .chain(array.items.iter_mut().flatten())
                .collect(),
            Kind::Object(object) => {
                let mut out: Vec<&mut Node> =
                    object.keys.iter_mut().flat_map(|k| k.values_mut()).collect();
                for pattern in &mut object.patterns {
                    if let PatternTarget::Schema(target) = &mut pattern.target {
                        out.push(target);
                    }
                    out.push(&mut pattern.schema);
                }
                out
            }
            Kind::Alternatives(Combinator::Not(inner)) => vec![inner.as_mut()],
            Kind::Alternatives(
                Combinator::AnyOf(items) | Combinator::AllOf(items) | Combinator::OneOf(items),
            )
            | Kind::AllOf(items)
            | Kind::OneOf(items) => items.iter_mut().collect(),
        }
    }

    /// Every reference reachable from this node, the node itself included.
    pub fn references(&self) -> Vec<&ReferenceNode> {
        let mut out = Vec::new();
        self.collect_references(&mut out);
        out
    }

    fn collect_references<'a>(&'a self, out: &mut Vec<&'a ReferenceNode>) {
        if let Kind::Reference(reference) = &self.kind {
            out.push(reference);
        }
        for child in self.children() {
            child.collect_references(out);
        }
    }

    /// Visit every reference node mutably, the node itself included.
    pub fn for_each_reference_mut(&mut self, f: &mut impl FnMut(&mut ReferenceNode)) {
        if let Kind::Reference(reference) = &mut self.kind {
            f(reference);
        }
        for child in self.children_mut() {
            child.for_each_reference_mut(f);
        }
    }
}
