/// Joi source emitter: statement generators producing a token stream, and
/// the formatter that renders it.
mod emit;
mod format;
mod nodes;
mod tokens;

pub use emit::{generate, generate_bundle, generate_statement, schema_type};
pub use format::{
    format, format_with, is_identifier, js_literal, quote, regex_literal, Canonical, FormatError,
    SourceFormatter,
};
pub use tokens::{SchemaType, Token, TokenWriter};
