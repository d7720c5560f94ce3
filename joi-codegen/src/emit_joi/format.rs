/// Token stream formatter: a single pass that renders tokens to source
/// text, then hands the text to a [`SourceFormatter`] for canonicalization.
use serde_json::Value;

use super::tokens::{SchemaType, Token};
use crate::ast::Pattern;
use crate::options::{FormatOptions, StyleOptions};

#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("malformed binding declaration at token {position}: expected label then close-title")]
    MalformedTitle { position: usize },
    #[error("unbalanced bracket marker at token {position}")]
    UnbalancedMarker { position: usize },
    #[error("reference marker at token {position} is not followed by a label")]
    DanglingReference { position: usize },
    #[error("source formatter failed: {0}")]
    SourceFormatter(String),
}

/// Final canonicalization pass over rendered source.
pub trait SourceFormatter {
    fn format(&self, source: &str, style: &StyleOptions) -> Result<String, FormatError>;
}

/// Built-in canonicalizer: strips trailing whitespace, collapses runs of
/// blank lines and ends the text with exactly one newline.
#[derive(Debug, Default, Clone, Copy)]
pub struct Canonical;

impl SourceFormatter for Canonical {
    fn format(&self, source: &str, _style: &StyleOptions) -> Result<String, FormatError> {
        let mut out = String::with_capacity(source.len());
        let mut blank_run = false;
        for line in source.lines().map(str::trim_end) {
            if line.is_empty() {
                blank_run = !out.is_empty();
                continue;
            }
            if blank_run {
                out.push('\n');
                blank_run = false;
            }
            out.push_str(line);
            out.push('\n');
        }
        Ok(out)
    }
}

/// Render and canonicalize with the built-in [`Canonical`] formatter.
pub fn format(tokens: &[Token], options: &FormatOptions) -> Result<String, FormatError> {
    format_with(tokens, options, &Canonical)
}

pub fn format_with(
    tokens: &[Token],
    options: &FormatOptions,
    formatter: &dyn SourceFormatter,
) -> Result<String, FormatError> {
    let raw = render(tokens, options)?;
    formatter.format(&raw, &options.style)
}

/// Rendering state for one pass over the stream.
struct Renderer<'a> {
    options: &'a FormatOptions,
    indent: String,
    quote: char,
    out: String,
    depth: usize,
    /// One entry per open bracket: whether it opened an indented block.
    openers: Vec<bool>,
    pending_newline: bool,
}

impl<'a> Renderer<'a> {
    fn new(options: &'a FormatOptions) -> Self {
        Self {
            options,
            indent: options.style.indent_unit(),
            quote: options.style.quote_char(),
            out: String::new(),
            depth: 0,
            openers: Vec::new(),
            pending_newline: false,
        }
    }

    fn write(&mut self, text: &str) {
        if self.pending_newline {
            self.pending_newline = false;
            self.out.push('\n');
            for _ in 0..self.depth {
                self.out.push_str(&self.indent);
            }
        }
        self.out.push_str(text);
    }

    fn binding(&self, label: &str) -> String {
        self.options.binding_name(label)
    }

    fn declaration(&self, label: &str, schema_type: Option<SchemaType>) -> String {
        let annotation = match schema_type {
            Some(ty) if self.options.with_type_declaration => {
                let namespace = if ty.is_extension() {
                    &self.options.extended_joi_name
                } else {
                    &self.options.joi_name
                };
                format!(": {namespace}.{}", ty.type_name())
            }
            _ => String::new(),
        };
        format!(
            "{}const {}{annotation} = ",
            self.options.export_prefix,
            self.binding(label)
        )
    }

    fn reference(&self, marker: &Token, label: &str) -> String {
        let joi = &self.options.joi_name;
        match marker {
            Token::Lazy => format!("{joi}.lazy(() => {})", self.binding(label)),
            Token::Link => format!("{joi}.link({})", quote(&format!("#{label}"), self.quote)),
            _ => self.binding(label),
        }
    }
}

fn label_at(tokens: &[Token], position: usize) -> Option<&str> {
    match tokens.get(position) {
        Some(Token::Text(label)) => Some(label),
        _ => None,
    }
}

fn bracket_char(token: &Token) -> &'static str {
    match token {
        Token::OpenBrace => "{",
        Token::CloseBrace => "}",
        Token::OpenBracket => "[",
        Token::CloseBracket => "]",
        Token::OpenParen => "(",
        _ => ")",
    }
}

/// Render tokens to raw source. A bracket indents its contents only when
/// it opens a block (it is followed by a newline), so chained openers such
/// as `({` and `([` add one level between them.
pub(crate) fn render(tokens: &[Token], options: &FormatOptions) -> Result<String, FormatError> {
    let mut r = Renderer::new(options);
    let mut i = 0;

    while i < tokens.len() {
        let token = &tokens[i];
        match token {
            Token::Text(text) => r.write(text),
            Token::Str(text) => {
                let literal = quote(text, r.quote);
                r.write(&literal);
            }
            Token::Json(value) => {
                let literal = js_literal(value, r.quote);
                r.write(&literal);
            }
            Token::Regex(pattern) => r.write(&regex_literal(pattern)),
            Token::Key(key) => {
                let key = object_key(key, r.quote);
                r.write(&key);
            }
            Token::OpenSchema | Token::CloseSchema => {}
            Token::OpenTitle => {
                let (Some(label), Some(Token::CloseTitle(schema_type))) =
                    (label_at(tokens, i + 1), tokens.get(i + 2))
                else {
                    return Err(FormatError::MalformedTitle { position: i });
                };
                let declaration = r.declaration(label, *schema_type);
                r.write(&declaration);
                i += 3;
                continue;
            }
            Token::CloseTitle(_) => return Err(FormatError::MalformedTitle { position: i }),
            Token::OpenBrace | Token::OpenBracket | Token::OpenParen => {
                r.write(bracket_char(token));
                let block = matches!(tokens.get(i + 1), Some(Token::Newline));
                if block {
                    r.depth += 1;
                }
                r.openers.push(block);
            }
            Token::CloseBrace | Token::CloseBracket | Token::CloseParen => {
                let block = r
                    .openers
                    .pop()
                    .ok_or(FormatError::UnbalancedMarker { position: i })?;
                if block {
                    r.depth -= 1;
                }
                r.write(bracket_char(token));
            }
            Token::Comma => {
                let closes = tokens[i + 1..]
                    .iter()
                    .find(|t| **t != Token::Newline)
                    .is_some_and(Token::is_closer);
                if !closes || options.style.trailing_comma {
                    r.write(",");
                }
                if !matches!(tokens.get(i + 1), Some(Token::Newline)) && !closes {
                    r.write(" ");
                }
            }
            Token::Colon => r.write(": "),
            Token::Newline => r.pending_newline = true,
            Token::JoiName => r.write(&options.joi_name),
            Token::ExtendedJoiName => r.write(&options.extended_joi_name),
            Token::Ref | Token::Lazy | Token::Link => {
                let label =
                    label_at(tokens, i + 1).ok_or(FormatError::DanglingReference { position: i })?;
                let expression = r.reference(token, label);
                r.write(&expression);
                i += 2;
                continue;
            }
            Token::StatementEnd => {
                if !r.openers.is_empty() {
                    return Err(FormatError::UnbalancedMarker { position: i });
                }
                if options.style.semi {
                    r.write(";");
                }
                r.pending_newline = false;
                r.out.push('\n');
            }
        }
        i += 1;
    }

    if !r.openers.is_empty() {
        return Err(FormatError::UnbalancedMarker {
            position: tokens.len(),
        });
    }
    Ok(r.out)
}

/// JS string literal in the requested quote style.
pub fn quote(text: &str, quote: char) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push(quote);
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

pub fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Property name in an object literal. A literal `__proto__` key sets the
/// prototype, so that one is written in computed form.
fn object_key(key: &str, quote_char: char) -> String {
    if key == "__proto__" {
        format!("[{}]", quote(key, quote_char))
    } else if is_identifier(key) {
        key.to_string()
    } else {
        quote(key, quote_char)
    }
}

/// JSON value as a JS expression: objects get bare keys where possible.
pub fn js_literal(value: &Value, quote_char: char) -> String {
    match value {
        Value::Null => "null".into(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => quote(s, quote_char),
        Value::Array(items) => {
            let items: Vec<String> = items.iter().map(|v| js_literal(v, quote_char)).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Object(map) if map.is_empty() => "{}".into(),
        Value::Object(map) => {
            let fields: Vec<String> = map
                .iter()
                .map(|(k, v)| {
                    format!(
                        "{}: {}",
                        object_key(k, quote_char),
                        js_literal(v, quote_char)
                    )
                })
                .collect();
            format!("{{ {} }}", fields.join(", "))
        }
    }
}

/// `/source/flags`, escaping delimiters that are not already escaped or
/// inside a character class.
pub fn regex_literal(pattern: &Pattern) -> String {
    let mut out = String::from("/");
    if pattern.source.is_empty() {
        out.push_str("(?:)");
    }
    let mut escaped = false;
    let mut in_class = false;
    for c in pattern.source.chars() {
        // Line terminators are illegal inside a literal; an escaped one
        // already has its backslash written.
        let terminator = match c {
            '\n' => Some("n"),
            '\r' => Some("r"),
            '\u{2028}' => Some("u2028"),
            '\u{2029}' => Some("u2029"),
            _ => None,
        };
        match terminator {
            Some(escape) => {
                if !escaped {
                    out.push('\\');
                }
                out.push_str(escape);
            }
            None if c == '/' && !escaped && !in_class => out.push_str("\\/"),
            None => out.push(c),
        }
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == '[' {
            in_class = true;
        } else if c == ']' {
            in_class = false;
        }
    }
    out.push('/');
    out.push_str(&pattern.flags);
    out
}
