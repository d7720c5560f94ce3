/// Token stream between the statement generators and the formatter.
use serde_json::Value;

use crate::ast::Pattern;

/// Joi schema type named in a binding's type annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaType {
    Any,
    Array,
    Boolean,
    Number,
    Object,
    String,
    Alternatives,
    /// Extension type, qualified by the extension import.
    AllOf,
    /// Extension type, qualified by the extension import.
    OneOf,
}

impl SchemaType {
    pub fn type_name(self) -> &'static str {
        match self {
            SchemaType::Any => "AnySchema",
            SchemaType::Array => "ArraySchema",
            SchemaType::Boolean => "BooleanSchema",
            SchemaType::Number => "NumberSchema",
            SchemaType::Object => "ObjectSchema",
            SchemaType::String => "StringSchema",
            SchemaType::Alternatives => "AlternativesSchema",
            SchemaType::AllOf => "AllOfSchema",
            SchemaType::OneOf => "OneOfSchema",
        }
    }

    pub fn is_extension(self) -> bool {
        matches!(self, SchemaType::AllOf | SchemaType::OneOf)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Source text emitted verbatim.
    Text(String),
    /// String literal, quoted per style.
    Str(String),
    /// Arbitrary JSON value rendered as a JS literal.
    Json(Value),
    /// Regular expression literal.
    Regex(Pattern),
    /// Object literal key, bare when it is an identifier.
    Key(String),
    /// Start of one Joi schema expression.
    OpenSchema,
    CloseSchema,
    /// Binding declaration: must be followed by `Text(label)` and `CloseTitle`.
    OpenTitle,
    CloseTitle(Option<SchemaType>),
    OpenBrace,
    CloseBrace,
    OpenBracket,
    CloseBracket,
    OpenParen,
    CloseParen,
    Comma,
    Colon,
    Newline,
    /// The Joi import identifier.
    JoiName,
    /// The allOf/oneOf extension property on the Joi import.
    ExtendedJoiName,
    /// Binding of the label in the following `Text` token.
    Ref,
    /// Deferred binding of the label in the following `Text` token.
    Lazy,
    /// Anchor link to the label in the following `Text` token.
    Link,
    StatementEnd,
}

impl Token {
    pub fn is_opener(&self) -> bool {
        matches!(self, Token::OpenBrace | Token::OpenBracket | Token::OpenParen)
    }

    pub fn is_closer(&self) -> bool {
        matches!(self, Token::CloseBrace | Token::CloseBracket | Token::CloseParen)
    }
}

/// Append-only token buffer with helpers for the shapes the generators
/// emit over and over.
#[derive(Debug, Default)]
pub struct TokenWriter {
    tokens: Vec<Token>,
}

impl TokenWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    pub fn text(&mut self, text: impl Into<String>) {
        self.tokens.push(Token::Text(text.into()));
    }

    /// `Joi.<constructor>`, e.g. `joi("object()")`.
    pub fn joi(&mut self, constructor: &str) {
        self.tokens.push(Token::JoiName);
        self.text(format!(".{constructor}"));
    }

    /// `.name()`.
    pub fn call0(&mut self, name: &str) {
        self.text(format!(".{name}()"));
    }

    /// `.name(arg)` with one JSON argument.
    pub fn call1(&mut self, name: &str, arg: Token) {
        self.text(format!(".{name}"));
        self.tokens.push(Token::OpenParen);
        self.tokens.push(arg);
        self.tokens.push(Token::CloseParen);
    }

    /// `.name(a, b, ...)` on one line.
    pub fn call_values(&mut self, name: &str, values: &[Value]) {
        self.text(format!(".{name}"));
        self.tokens.push(Token::OpenParen);
        for (i, value) in values.iter().enumerate() {
            if i > 0 {
                self.tokens.push(Token::Comma);
            }
            self.tokens.push(Token::Json(value.clone()));
        }
        self.tokens.push(Token::CloseParen);
    }

    /// `.flag()` for `Some(true)`, `.flag(false)` for `Some(false)`.
    pub fn flag(&mut self, name: &str, value: Option<bool>) {
        match value {
            Some(true) => self.call0(name),
            Some(false) => self.call1(name, Token::Json(Value::Bool(false))),
            None => {}
        }
    }

    /// One element per line between `open` and `close`, each followed by
    /// a comma.
    pub fn block<T>(
        &mut self,
        open: Token,
        close: Token,
        items: impl IntoIterator<Item = T>,
        mut each: impl FnMut(&mut Self, T),
    ) {
        self.tokens.push(open);
        let mut any = false;
        for item in items {
            any = true;
            self.tokens.push(Token::Newline);
            each(self, item);
            self.tokens.push(Token::Comma);
        }
        if any {
            self.tokens.push(Token::Newline);
        }
        self.tokens.push(close);
    }

    pub fn extend(&mut self, tokens: impl IntoIterator<Item = Token>) {
        self.tokens.extend(tokens);
    }

    pub fn finish(self) -> Vec<Token> {
        self.tokens
    }
}
