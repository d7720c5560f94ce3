//! Compiles JSON Schema (and OpenAPI 3 component schemas) into Joi
//! validator source code.
//!
//! The pipeline has three stages: [`resolve`] lowers schema documents into
//! the [`ast`] model, [`emit_joi`] generates a token stream from it, and the
//! formatter renders that stream to source text.
//!
//! ```no_run
//! use joi_codegen::{convert, options::CodegenConfig};
//!
//! let schema = serde_json::json!({"title": "user", "required": ["id"]});
//! let source = convert(&schema, &CodegenConfig::default())?;
//! assert!(source.starts_with("const userJoiSchema = Joi.object()"));
//! # Ok::<(), joi_codegen::Error>(())
//! ```
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

pub mod ast;
pub mod emit_joi;
pub mod options;
pub mod resolve;

use emit_joi::FormatError;
use options::{CodegenConfig, FormatOptions, ResolveOptions};
use resolve::ResolveError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convert a single schema to one binding. The schema is its own root for
/// `#/...` pointers; a schema without a `title` is bound to `config.label`.
pub fn convert(schema: &Value, config: &CodegenConfig) -> Result<String, Error> {
    convert_with(schema, &config.resolve_options(schema), config)
}

/// [`convert`] with caller-supplied resolve options (root document and
/// named sub-documents).
pub fn convert_with(
    schema: &Value,
    options: &ResolveOptions,
    config: &CodegenConfig,
) -> Result<String, Error> {
    log_dialect(options);
    let mut node = resolve::resolve(schema, options);
    if node.label.is_none() {
        node.label = Some(resolve::camel_label(&config.label));
    }
    let tokens = emit_joi::generate_statement(&node);
    Ok(emit_joi::format(&tokens, &config.format)?)
}

/// Convert a definitions map to one binding per definition, dependencies
/// first.
pub fn convert_bundle(
    definitions: &Map<String, Value>,
    options: &ResolveOptions,
    format: &FormatOptions,
) -> Result<String, Error> {
    log_dialect(options);
    let nodes = resolve::resolve_bundle(definitions, options)?;
    let tokens = emit_joi::generate_bundle(&nodes);
    Ok(emit_joi::format(&tokens, format)?)
}

/// Convert the `definitions` or `components.schemas` section of a document.
pub fn convert_document(document: &Value, config: &CodegenConfig) -> Result<String, Error> {
    let options = config.resolve_options(document);
    log_dialect(&options);
    let nodes = resolve::resolve_section(document, &options)?;
    let tokens = emit_joi::generate_bundle(&nodes);
    Ok(emit_joi::format(&tokens, &config.format)?)
}

/// Read and parse a JSON document from disk.
pub fn load_document(path: &Path) -> Result<Value, Error> {
    let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&text)?)
}

fn log_dialect(options: &ResolveOptions) {
    let dialect = options.dialect;
    if dialect.use_extension && !dialect.use_legacy {
        tracing::debug!("extension combinators selected for the current Joi library");
    }
}
