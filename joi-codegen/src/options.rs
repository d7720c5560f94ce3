//! Options for the resolve and format stages, plus the JSON config file
//! the CLI reads them from.

use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

/// Selects which Joi feature set the output targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Dialect {
    /// Target the former `joi` package instead of `@hapi/joi`. Self
    /// references become `Joi.lazy(...)` instead of `Joi.link(...)`.
    pub use_legacy: bool,
    /// Emit `allOf`/`oneOf` through the `extendedJoi` extension instead of
    /// `alternatives().match(...)`.
    pub use_extension: bool,
}

/// Everything the resolver reads besides the schema node itself.
/// Shared read-only across resolutions.
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    /// Document that local `#/...` pointers are resolved against.
    pub root: Option<Value>,
    /// Named documents addressed by `<id>#/...` pointers.
    pub sub_schemas: IndexMap<String, Value>,
    pub dialect: Dialect,
}

impl ResolveOptions {
    pub fn with_root(root: Value) -> Self {
        Self {
            root: Some(root),
            ..Self::default()
        }
    }

    pub fn dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn sub_schema(mut self, id: impl Into<String>, document: Value) -> Self {
        self.sub_schemas.insert(id.into(), document);
        self
    }
}

/// Style knobs applied while rendering and handed on to the source formatter.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StyleOptions {
    pub tab_width: usize,
    pub use_tabs: bool,
    pub single_quote: bool,
    pub trailing_comma: bool,
    pub semi: bool,
}

impl Default for StyleOptions {
    fn default() -> Self {
        Self {
            tab_width: 2,
            use_tabs: false,
            single_quote: true,
            trailing_comma: true,
            semi: true,
        }
    }
}

impl StyleOptions {
    pub fn indent_unit(&self) -> String {
        if self.use_tabs {
            "\t".into()
        } else {
            " ".repeat(self.tab_width)
        }
    }

    pub fn quote_char(&self) -> char {
        if self.single_quote {
            '\''
        } else {
            '"'
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FormatOptions {
    /// Identifier the Joi library is imported as.
    pub joi_name: String,
    /// Property of the Joi import that holds the allOf/oneOf extension.
    pub extended_joi_name: String,
    /// Appended to a label to form its binding name.
    pub binding_suffix: String,
    /// Annotate bindings with their Joi schema type (`: Joi.ObjectSchema`).
    pub with_type_declaration: bool,
    /// Prefix for every binding declaration, e.g. `export `.
    pub export_prefix: String,
    pub style: StyleOptions,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            joi_name: "Joi".into(),
            extended_joi_name: "extendedJoi".into(),
            binding_suffix: "JoiSchema".into(),
            with_type_declaration: false,
            export_prefix: String::new(),
            style: StyleOptions::default(),
        }
    }
}

impl FormatOptions {
    pub fn binding_name(&self, label: &str) -> String {
        format!("{label}{}", self.binding_suffix)
    }
}

/// Contents of a `--config` file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CodegenConfig {
    pub dialect: Dialect,
    pub format: FormatOptions,
    /// Binding label for a root schema without a `title`.
    pub label: String,
    /// Documents addressed by `<id>#/...` pointers, keyed by id.
    pub sub_schemas: IndexMap<String, Value>,
}

impl Default for CodegenConfig {
    fn default() -> Self {
        Self {
            dialect: Dialect::default(),
            format: FormatOptions::default(),
            label: "schema".into(),
            sub_schemas: IndexMap::new(),
        }
    }
}

impl CodegenConfig {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Resolve options rooted at `root`, using this config's dialect and
    /// sub-documents.
    pub fn resolve_options(&self, root: &Value) -> ResolveOptions {
        ResolveOptions {
            root: Some(root.clone()),
            sub_schemas: self.sub_schemas.clone(),
            dialect: self.dialect,
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, crate::Error> {
        let text = std::fs::read_to_string(path).map_err(|source| crate::Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_json(&text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CodegenConfig::default();
        assert_eq!(config.format.joi_name, "Joi");
        assert_eq!(config.format.binding_name("address"), "addressJoiSchema");
        assert_eq!(config.format.style.indent_unit(), "  ");
        assert_eq!(config.label, "schema");
        assert!(!config.dialect.use_legacy);
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = CodegenConfig::from_json(
            r#"{"dialect": {"useLegacy": true}, "format": {"style": {"useTabs": true, "semi": false}}}"#,
        )
        .unwrap();
        assert!(config.dialect.use_legacy);
        assert!(!config.dialect.use_extension);
        assert_eq!(config.format.style.indent_unit(), "\t");
        assert!(!config.format.style.semi);
        assert!(config.format.style.single_quote);
        assert_eq!(config.format.binding_suffix, "JoiSchema");
    }

    #[test]
    fn test_rejects_malformed_config() {
        assert!(CodegenConfig::from_json(r#"{"format": {"style": {"tabWidth": "two"}}}"#).is_err());
    }

    #[test]
    fn test_sub_schemas_reach_resolve_options() {
        let config = CodegenConfig::from_json(
            r#"{"subSchemas": {"common.json": {"definitions": {"id": {"type": "integer"}}}}}"#,
        )
        .unwrap();
        let options = config.resolve_options(&serde_json::json!({}));
        assert_eq!(
            options.sub_schemas["common.json"]["definitions"]["id"]["type"],
            "integer"
        );
    }

    #[test]
    fn test_resolve_options_builder() {
        let options = ResolveOptions::with_root(serde_json::json!({}))
            .dialect(Dialect {
                use_legacy: true,
                use_extension: false,
            })
            .sub_schema("other.json", serde_json::json!({"type": "string"}));
        assert!(options.root.is_some());
        assert!(options.dialect.use_legacy);
        assert!(options.sub_schemas.contains_key("other.json"));
    }
}
