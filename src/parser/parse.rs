//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct and core parsing infrastructure:
//! token helpers, diagnostics reporting, and the translation-unit loop.
//!
//! # Parser Architecture
//!
//! The Parser uses a recursive descent approach with the following organization:
//! - This module: Parser struct, helper methods, and coordination
//! - `declarations`: specifiers, declarators, initializers, struct/union/enum bodies
//! - `statements`: statements and compound blocks (scopes)
//! - `expressions`: the precedence cascade from assignment down to primary
//!
//! # Error Recovery
//!
//! No production returns an error. A missing or unexpected token is recorded
//! in the parser's [`Diagnostics`] and the production returns the best node it
//! can build, using [`Expr::Error`] for operands it could not parse. Loops that
//! dispatch on the current token always consume at least one token per
//! iteration, so malformed input cannot stall the parser. Recursion is
//! bounded by [`MAX_NESTING_DEPTH`]; deeper input is reported once and
//! skipped.
//!
//! # Implementation
//!
//! Parser methods are split across multiple files using `impl Parser` blocks,
//! allowing each module to extend the Parser with related functionality while
//! maintaining access to the shared parser state.

use crate::diagnostics::Diagnostics;
use crate::parser::ast::*;
use crate::parser::lexer::{self, Token, TokenKind, TokenStream};
use crate::symbols::SymbolTable;

/// Deepest combined nesting of parenthesized expressions, prefix operators,
/// casts, blocks and sub-statements the parser recurses into. Anything deeper
/// is reported and skipped so hostile input cannot exhaust the stack.
pub const MAX_NESTING_DEPTH: usize = 48;

/// Knobs for a parse run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Stop after this many errors
    pub max_errors: Option<usize>,
    /// Treat warnings as errors for [`Diagnostics::has_errors`]
    pub warnings_as_errors: bool,
}

/// Everything a translation-unit parse produces
#[derive(Debug, Clone)]
pub struct ParseOutput {
    pub unit: TranslationUnit,
    pub diagnostics: Diagnostics,
    /// The table as left after parsing: only the global scope remains
    pub symbols: SymbolTable,
}

impl ParseOutput {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.has_errors()
    }
}

/// Result of parsing a buffer holding a single expression
#[derive(Debug, Clone)]
pub struct ExpressionOutput {
    pub expr: Option<Expr>,
    pub diagnostics: Diagnostics,
}

/// Recursive descent parser for the C subset
pub struct Parser {
    pub(crate) tokens: TokenStream,
    pub(crate) diagnostics: Diagnostics,
    pub(crate) symbols: SymbolTable,
    next_node_id: NodeId,
    nesting: usize,
}

impl Parser {
    pub fn new(tokens: TokenStream) -> Self {
        Self::with_options(tokens, ParseOptions::default())
    }

    pub fn with_options(mut tokens: TokenStream, options: ParseOptions) -> Self {
        let mut diagnostics = Diagnostics::new()
            .with_max_errors(options.max_errors)
            .with_warnings_as_errors(options.warnings_as_errors);
        diagnostics.append(tokens.take_diagnostics());

        Self {
            tokens,
            diagnostics,
            symbols: SymbolTable::new(),
            next_node_id: 0,
            nesting: 0,
        }
    }

    /// Tokenize `source` and build a parser over it.
    pub fn from_source(source: &str) -> Self {
        Self::new(lexer::tokenize(source))
    }

    /// Parse the entire translation unit (top-level declarations)
    pub fn parse_translation_unit(mut self) -> ParseOutput {
        let mut unit = TranslationUnit::new();

        while !self.is_at_end() {
            if self.diagnostics.limit_reached() {
                log::warn!("too many errors emitted, stopping now");
                break;
            }

            let start = self.tokens.position();
            let kind = self.current_kind();

            if kind.is_declaration() || matches!(kind, TokenKind::Identifier(_)) {
                unit.nodes.extend(self.parse_declaration());
            } else if matches!(kind, TokenKind::Semicolon) {
                self.warning("extra ';' outside of a function");
                self.advance();
            } else if matches!(kind, TokenKind::Unknown(_)) {
                // Already reported by the lexer
                self.advance();
            } else {
                self.error(format!("expected declaration before {}", self.current()));
            }

            if self.tokens.position() == start {
                self.advance();
            }
        }

        log::debug!(
            "parsed {} top-level node(s), {} error(s)",
            unit.nodes.len(),
            self.diagnostics.error_count()
        );

        ParseOutput {
            unit,
            diagnostics: self.diagnostics,
            symbols: self.symbols,
        }
    }

    /// Parse the whole buffer as one expression.
    pub fn parse_expression_unit(mut self) -> ExpressionOutput {
        let expr = self.parse_expression();

        if expr.is_none() {
            self.error(format!("expected expression before {}", self.current()));
        } else if !self.is_at_end() {
            self.error(format!("unexpected {} after expression", self.current()));
        }

        ExpressionOutput {
            expr,
            diagnostics: self.diagnostics,
        }
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    // ===== Helper methods =====

    pub(crate) fn current(&self) -> &Token {
        self.tokens.current()
    }

    pub(crate) fn current_kind(&self) -> &TokenKind {
        &self.tokens.current().kind
    }

    /// Kind of the token after the current one; `End` when already at the end.
    pub(crate) fn peek_kind(&self) -> &TokenKind {
        if self.is_at_end() {
            self.current_kind()
        } else {
            &self.tokens.peek(1).kind
        }
    }

    pub(crate) fn current_location(&self) -> SourceLocation {
        self.tokens.current().location
    }

    pub(crate) fn advance(&mut self) -> &Token {
        self.tokens.advance()
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.tokens.is_at_end()
    }

    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(self.current_kind()) == std::mem::discriminant(kind)
    }

    pub(crate) fn match_token(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume `kind` or report `message` at the current token.
    pub(crate) fn expect(&mut self, kind: &TokenKind, message: &str) -> bool {
        if self.match_token(kind) {
            true
        } else {
            self.error(message);
            false
        }
    }

    pub(crate) fn match_identifier(&mut self) -> Option<(String, SourceLocation)> {
        let location = self.current_location();
        if let TokenKind::Identifier(name) = self.current_kind() {
            let name = name.clone();
            self.advance();
            Some((name, location))
        } else {
            None
        }
    }

    /// Skip to the end of the current declaration or statement: past the
    /// next `;`, or up to (not past) a `}`.
    pub(crate) fn synchronize(&mut self) {
        while !self.is_at_end() {
            match self.current_kind() {
                TokenKind::Semicolon => {
                    self.advance();
                    return;
                }
                TokenKind::RBrace => return,
                _ => {
                    self.advance();
                }
            }
        }
    }

    /// Skip a bracketed group starting at the current token through its
    /// matching closer, without recursing. Any other token is skipped alone.
    pub(crate) fn skip_group(&mut self) {
        let mut depth = 0usize;
        while !self.is_at_end() {
            match self.current_kind() {
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => depth += 1,
                TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                    depth = depth.saturating_sub(1)
                }
                _ => {}
            }
            self.advance();
            if depth == 0 {
                return;
            }
        }
    }

    /// Enter one level of recursion. Past [`MAX_NESTING_DEPTH`] this reports
    /// `message` and returns false; the caller then skips the construct
    /// instead of descending and must not call [`Parser::exit_nesting`].
    pub(crate) fn enter_nesting(&mut self, message: &str) -> bool {
        if self.nesting >= MAX_NESTING_DEPTH {
            log::debug!("nesting limit hit at {}", self.current_location());
            self.error(message);
            return false;
        }
        self.nesting += 1;
        true
    }

    pub(crate) fn exit_nesting(&mut self) {
        self.nesting = self.nesting.saturating_sub(1);
    }

    pub(crate) fn error(&mut self, message: impl Into<String>) {
        let location = self.current_location();
        self.diagnostics.error(location, message);
    }

    pub(crate) fn error_at(&mut self, location: SourceLocation, message: impl Into<String>) {
        self.diagnostics.error(location, message);
    }

    pub(crate) fn warning(&mut self, message: impl Into<String>) {
        let location = self.current_location();
        self.diagnostics.warning(location, message);
    }

    pub(crate) fn next_node_id(&mut self) -> NodeId {
        let id = self.next_node_id;
        self.next_node_id += 1;
        id
    }
}

/// Parse a token stream as a translation unit.
pub fn parse_translation_unit(tokens: TokenStream) -> ParseOutput {
    Parser::new(tokens).parse_translation_unit()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn parse(source: &str) -> ParseOutput {
        Parser::from_source(source).parse_translation_unit()
    }

    #[test]
    fn test_parse_simple_function() {
        let output = parse("int main(void) { return 0; }");
        assert!(!output.has_errors(), "{:?}", output.diagnostics);
        assert_eq!(output.unit.nodes.len(), 1);

        match &output.unit.nodes[0] {
            AstNode::FunctionDefinition(def) => {
                assert_eq!(def.name(), Some("main"));
                assert_eq!(def.specifier.kind(), TypeSpecifierKind::Int);
                match &def.declarator {
                    Declarator::Function { params, .. } => assert!(params.is_empty()),
                    other => panic!("Expected function declarator, got {:?}", other),
                }
                match def.body.as_ref() {
                    Stmt::Compound { items, .. } => assert_eq!(items.len(), 1),
                    other => panic!("Expected compound body, got {:?}", other),
                }
            }
            other => panic!("Expected function definition, got {:?}", other),
        }
    }

    #[test]
    fn test_lexical_diagnostics_are_carried_over() {
        let output = parse("int x = '';");
        assert!(output.has_errors());
        assert_eq!(
            output.diagnostics.entries()[0].message,
            "empty character constant"
        );
    }

    #[test]
    fn test_stray_tokens_at_top_level_make_progress() {
        let output = parse(") ] int x;");
        assert_eq!(output.diagnostics.error_count(), 2);
        assert_eq!(output.unit.declarations().count(), 1);
    }

    #[test]
    fn test_stray_character_at_top_level_reported_once() {
        let output = parse("@ int x;");
        let messages: Vec<_> = output
            .diagnostics
            .entries()
            .iter()
            .map(|d| d.message.as_str())
            .collect();
        assert_eq!(messages, vec!["stray '@' in program"]);
        assert_eq!(output.unit.declarations().count(), 1);
    }

    #[test]
    fn test_skip_group_stops_after_matching_closer() {
        let mut parser = Parser::from_source("( a [ ( ) ] { } ) b");
        parser.skip_group();
        assert_eq!(parser.current_kind(), &TokenKind::Identifier("b".to_string()));
    }

    #[test]
    fn test_extra_semicolon_is_warning() {
        let output = parse("int x;;");
        assert!(!output.has_errors());
        assert_eq!(output.diagnostics.warning_count(), 1);
    }

    #[test]
    fn test_error_limit_stops_parse() {
        let tokens = lexer::tokenize(") ) ) ) int x;");
        let options = ParseOptions {
            max_errors: Some(2),
            ..ParseOptions::default()
        };
        let output = Parser::with_options(tokens, options).parse_translation_unit();
        assert_eq!(output.diagnostics.error_count(), 2);
        assert!(output.diagnostics.limit_reached());
        assert!(output.unit.nodes.is_empty());
    }

    #[test]
    fn test_global_symbols_survive_parse() {
        let output = parse("int counter; int main(void) { int local; return local; }");
        let names: Vec<_> = output
            .symbols
            .global_symbols()
            .iter()
            .map(|s| s.identifier.as_str())
            .collect();
        assert_eq!(names, vec!["counter", "main"]);
        assert!(output.symbols.is_global());
    }

    #[test]
    fn test_expression_unit_rejects_trailing_tokens() {
        let output = Parser::from_source("1 + 2 )").parse_expression_unit();
        assert!(output.expr.is_some());
        assert_eq!(output.diagnostics.error_count(), 1);
    }
}
