//! Recursive-descent grammar for one doc comment.
//!
//! ```text
//! Annotations     ::= Annotation {[ "*" ]* [Annotation]}*
//! Annotation      ::= "@" AnnotationName MethodCall
//! AnnotationName  ::= QualifiedName | SimpleName
//! MethodCall      ::= ["(" [Values] ")"]
//! Values          ::= Value {"," Value}* [","]
//! Value           ::= PlainValue | FieldAssignment
//! PlainValue      ::= integer | string | float | boolean | null | Array | Annotation | Constant
//! FieldAssignment ::= identifier "=" PlainValue
//! Array           ::= "{" ArrayEntry {"," ArrayEntry}* [","] "}"
//! ArrayEntry      ::= PlainValue | KeyValuePair
//! KeyValuePair    ::= (Constant | string | integer) ("=" | ":") PlainValue
//! Constant        ::= identifier ["::" identifier]
//! ```

use super::DocParser;
use crate::lexer::{Token, TokenKind};
use crate::validate::{check_target, Instantiator};
use docmeta_core::{
    AnnotationError, AnnotationInstance, AnnotationResult, Array, ArrayKey, Found, SemanticError,
    SyntaxError, Targets, Value, ValueMap, NAMESPACE_SEPARATOR,
};
use tracing::debug;

/// One entry of an argument list before folding.
enum Argument {
    Field(String, Value),
    Positional(Value),
}

pub(super) struct Parser<'p, 'a> {
    doc: &'p DocParser<'a>,
    source: &'p str,
    tokens: Vec<Token>,
    pos: usize,
    context: &'p str,
    /// Nesting level; annotations below the top level use the ANNOTATION target.
    depth: usize,
}

impl<'p, 'a> Parser<'p, 'a> {
    pub(super) fn new(
        doc: &'p DocParser<'a>,
        source: &'p str,
        tokens: Vec<Token>,
        context: &'p str,
    ) -> Self {
        Self {
            doc,
            source,
            tokens,
            pos: 0,
            context,
            depth: 0,
        }
    }

    // ========================================================================
    // ANNOTATIONS
    // ========================================================================

    pub(super) fn annotations(mut self) -> AnnotationResult<Vec<AnnotationInstance>> {
        let mut annotations = Vec::new();

        while !self.is_at_end() {
            if !self.check(&TokenKind::At) {
                self.advance();
                continue;
            }

            // `user@host`: the `@` is glued to the previous token
            let glued = self
                .previous()
                .is_some_and(|prev| prev.is_adjacent_to(self.current()));
            let named = self.glimpse().is_some_and(|next| {
                (next.kind == TokenKind::NamespaceSeparator || next.kind.is_class_identifier())
                    && self.current().is_adjacent_to(next)
            });
            if glued || !named {
                self.advance();
                continue;
            }

            self.depth = 0;
            if let Some(annotation) = self.annotation()? {
                annotations.push(annotation);
            }
        }

        Ok(annotations)
    }

    /// Parse one annotation. `None` when its name is skipped.
    fn annotation(&mut self) -> AnnotationResult<Option<AnnotationInstance>> {
        self.expect(TokenKind::At)?;
        let original = self.identifier()?;

        let Some(name) = self
            .doc
            .resolver()
            .resolve_annotation(&original, self.context)?
        else {
            debug!(annotation = %original, context = self.context, "skipped unresolved annotation");
            self.skip_arguments();
            return Ok(None);
        };

        let descriptor =
            self.doc
                .descriptors
                .describe(&name, self.doc.catalog, &self.doc.ignored_names)?;

        if !descriptor.is_annotation {
            if self.doc.ignored_names.contains(&original) {
                debug!(annotation = %original, context = self.context, "skipped ignored type");
                self.skip_arguments();
                return Ok(None);
            }
            return Err(SemanticError::NotAnAnnotation {
                name,
                original,
                context: self.context.to_string(),
            }
            .into());
        }

        let target = if self.depth > 0 {
            Targets::ANNOTATION
        } else {
            self.doc.target
        };
        check_target(&descriptor, target, &original, self.context)?;

        self.depth += 1;
        let values = self.method_call();
        self.depth -= 1;

        Instantiator::new(self.doc.catalog, self.context)
            .instantiate(&name, &original, &descriptor, values?)
            .map(Some)
    }

    /// Names joined by adjacent namespace separators.
    fn identifier(&mut self) -> AnnotationResult<String> {
        if !self.current().kind.is_class_identifier() {
            return Err(self.syntax_error("namespace separator or identifier"));
        }

        let first = self.advance();
        let mut name = first.text(self.source).to_string();

        while self.check(&TokenKind::NamespaceSeparator)
            && self
                .previous()
                .is_some_and(|prev| prev.is_adjacent_to(self.current()))
        {
            self.advance();
            if !self.current().kind.is_class_identifier() {
                return Err(self.syntax_error("identifier"));
            }
            let segment = self.advance();
            name.push(NAMESPACE_SEPARATOR);
            name.push_str(segment.text(self.source));
        }

        Ok(name)
    }

    /// Skip a parenthesized argument list of an annotation that is not read.
    fn skip_arguments(&mut self) {
        if !self.check(&TokenKind::LParen) {
            return;
        }

        let mut open = 0usize;
        while !self.is_at_end() {
            match self.advance().kind {
                TokenKind::LParen => open += 1,
                TokenKind::RParen => {
                    open = open.saturating_sub(1);
                    if open == 0 {
                        return;
                    }
                }
                _ => {}
            }
        }
    }

    // ========================================================================
    // VALUES
    // ========================================================================

    fn method_call(&mut self) -> AnnotationResult<ValueMap> {
        if !self.check(&TokenKind::LParen) {
            return Ok(ValueMap::new());
        }
        self.advance();

        let values = if self.check(&TokenKind::RParen) {
            ValueMap::new()
        } else {
            self.values()?
        };

        self.expect(TokenKind::RParen)?;
        Ok(values)
    }

    /// Fold an argument list into a keyed map. The first positional value
    /// becomes `value`; later ones are appended to it as a list.
    fn values(&mut self) -> AnnotationResult<ValueMap> {
        let mut arguments = vec![self.value()?];

        while self.check(&TokenKind::Comma) {
            self.advance();
            if self.check(&TokenKind::RParen) {
                break;
            }

            let start = self.current().clone();
            let argument = self.value()?;

            let accepted = match &argument {
                Argument::Field(..) => true,
                // A skipped nested annotation is null and is rejected here too.
                Argument::Positional(value) => matches!(value, Value::Array(_) | Value::Annotation(_)),
            };
            if !accepted {
                return Err(self.syntax_error_at("Value", &start));
            }
            arguments.push(argument);
        }

        let mut values = ValueMap::new();
        for argument in arguments {
            match argument {
                Argument::Field(name, value) => {
                    values.insert(name, value);
                }
                Argument::Positional(value) => {
                    let slot = values.entry("value".to_string()).or_insert(Value::Null);
                    if slot.is_null() {
                        *slot = value;
                        continue;
                    }
                    if !matches!(slot, Value::Array(_)) {
                        let single = std::mem::take(slot);
                        *slot = Value::list([single]);
                    }
                    if let Value::Array(items) = slot {
                        items.push(value);
                    }
                }
            }
        }

        Ok(values)
    }

    fn value(&mut self) -> AnnotationResult<Argument> {
        if self
            .glimpse()
            .is_some_and(|next| next.kind == TokenKind::Equals)
        {
            return self.field_assignment();
        }
        Ok(Argument::Positional(self.plain_value()?))
    }

    fn field_assignment(&mut self) -> AnnotationResult<Argument> {
        let field = match &self.current().kind {
            TokenKind::Identifier(name) => name.clone(),
            _ => return Err(self.syntax_error("identifier")),
        };
        self.advance();
        self.expect(TokenKind::Equals)?;
        Ok(Argument::Field(field, self.plain_value()?))
    }

    fn plain_value(&mut self) -> AnnotationResult<Value> {
        let kind = self.current().kind.clone();
        match kind {
            TokenKind::LBrace => self.array(),
            // skipped nested annotations evaluate to null
            TokenKind::At => Ok(self.annotation()?.map(Value::from).unwrap_or(Value::Null)),
            TokenKind::Identifier(_) => self.constant(),
            TokenKind::String(s) => {
                self.advance();
                Ok(Value::String(s))
            }
            TokenKind::Integer(i) => {
                self.advance();
                Ok(Value::Int(i))
            }
            TokenKind::Float(f) => {
                self.advance();
                Ok(Value::Float(f))
            }
            TokenKind::True => {
                self.advance();
                Ok(Value::Bool(true))
            }
            TokenKind::False => {
                self.advance();
                Ok(Value::Bool(false))
            }
            TokenKind::Null => {
                self.advance();
                Ok(Value::Null)
            }
            _ => Err(self.syntax_error("PlainValue")),
        }
    }

    fn constant(&mut self) -> AnnotationResult<Value> {
        let identifier = self.identifier()?;
        self.doc.resolver().resolve_constant(&identifier, self.context)
    }

    fn array(&mut self) -> AnnotationResult<Value> {
        self.expect(TokenKind::LBrace)?;
        let mut array = Array::new();

        if self.check(&TokenKind::RBrace) {
            self.advance();
            return Ok(Value::Array(array));
        }

        loop {
            match self.array_entry()? {
                (Some(key), value) => array.insert(key, value),
                (None, value) => array.push(value),
            }

            if !self.check(&TokenKind::Comma) {
                break;
            }
            self.advance();

            // trailing comma
            if self.check(&TokenKind::RBrace) {
                break;
            }
        }

        self.expect(TokenKind::RBrace)?;
        Ok(Value::Array(array))
    }

    fn array_entry(&mut self) -> AnnotationResult<(Option<ArrayKey>, Value)> {
        let keyed = self
            .glimpse()
            .is_some_and(|next| matches!(next.kind, TokenKind::Equals | TokenKind::Colon));
        if !keyed {
            return Ok((None, self.plain_value()?));
        }

        let key = match self.current().kind.clone() {
            TokenKind::Identifier(_) => array_key(self.constant()?),
            TokenKind::Integer(i) => {
                self.advance();
                ArrayKey::Index(i)
            }
            TokenKind::String(s) => {
                self.advance();
                ArrayKey::from_name(s)
            }
            _ => return Err(self.syntax_error("integer or string")),
        };

        if !(self.check(&TokenKind::Equals) || self.check(&TokenKind::Colon)) {
            return Err(self.syntax_error("'=' or ':'"));
        }
        self.advance();

        Ok((Some(key), self.plain_value()?))
    }

    // ========================================================================
    // HELPER METHODS
    // ========================================================================

    fn current(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn glimpse(&self) -> Option<&Token> {
        self.tokens.get(self.pos + 1)
    }

    fn previous(&self) -> Option<&Token> {
        self.pos.checked_sub(1).map(|i| &self.tokens[i])
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if !self.is_at_end() {
            self.pos += 1;
        }
        token
    }

    fn is_at_end(&self) -> bool {
        self.current().kind == TokenKind::Eof
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.current().kind) == std::mem::discriminant(kind)
    }

    fn expect(&mut self, kind: TokenKind) -> AnnotationResult<Token> {
        if self.check(&kind) {
            Ok(self.advance())
        } else {
            Err(self.syntax_error(&kind.to_string()))
        }
    }

    fn syntax_error(&self, expected: &str) -> AnnotationError {
        self.syntax_error_at(expected, self.current())
    }

    fn syntax_error_at(&self, expected: &str, token: &Token) -> AnnotationError {
        let found = match token.kind {
            TokenKind::Eof => Found::EndOfInput,
            _ => Found::Token {
                text: token.text(self.source).to_string(),
                position: token.span.start,
            },
        };
        SyntaxError {
            expected: expected.to_string(),
            found,
            context: self.context.to_string(),
        }
        .into()
    }
}

/// Array key from an evaluated constant.
fn array_key(value: Value) -> ArrayKey {
    match value {
        Value::Int(i) => ArrayKey::Index(i),
        Value::Bool(b) => ArrayKey::Index(i64::from(b)),
        Value::Float(f) => ArrayKey::Index(f as i64),
        Value::Null => ArrayKey::Name(String::new()),
        other => ArrayKey::from_name(other.to_string()),
    }
}
