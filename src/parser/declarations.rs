//! Declaration parsing implementation
//!
//! This module handles declarations wherever they appear:
//!
//! - Declaration specifiers: `int`, `char`, `void`, `struct`/`union`/`enum`
//!   (storage classes, qualifiers and the other arithmetic types are warned
//!   about and skipped)
//! - Declarators: pointers, arrays, function parameter lists, grouping parens
//! - Abstract declarators for parameters, casts and `sizeof(type)`
//! - Init-declarator lists and initializers, including nested brace lists
//! - Function definitions, whose body opens a scope holding the parameters
//!
//! # Grammar
//!
//! ```text
//! declaration  ::= specifiers ( init_declarator ( "," init_declarator )* )? ";"
//!                | specifiers declarator compound_statement
//! init_declarator ::= declarator ( "=" initializer )?
//! declarator   ::= "*"* direct ( "[" constant? "]" | "(" params ")" )*
//! direct       ::= identifier | "(" declarator ")"
//! initializer  ::= assignment | "{" initializer ( "," initializer )* ","? "}"
//! struct_spec  ::= ("struct" | "union") identifier? ( "{" member_decl* "}" )?
//! enum_spec    ::= "enum" identifier? ( "{" enumerator ( "," enumerator )* ","? "}" )?
//! ```
//!
//! Declarators are collected as a list of derivations read from the
//! identifier outward (`*a[3]` reads "a: array of, pointer to") and then
//! folded into a [`Declarator`] tree whose root is the first derivation.
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::lexer::TokenKind;
use crate::parser::parse::Parser;
use crate::symbols::SymbolKind;

/// One type constructor applied to the declared entity
#[derive(Debug)]
enum Derivation {
    Pointer(SourceLocation),
    Array {
        size: Option<Box<Expr>>,
        location: SourceLocation,
    },
    Function {
        params: Vec<AbstractDeclaration>,
        variadic: bool,
        location: SourceLocation,
    },
}

impl Derivation {
    fn wrap(self, inner: Option<Declarator>) -> Declarator {
        let inner = inner.map(Box::new);
        match self {
            Derivation::Pointer(location) => Declarator::Pointer { inner, location },
            Derivation::Array { size, location } => Declarator::Array {
                inner,
                size,
                location,
            },
            Derivation::Function {
                params,
                variadic,
                location,
            } => Declarator::Function {
                inner,
                params,
                variadic,
                location,
            },
        }
    }
}

/// A declarator before it is folded into a tree
#[derive(Debug, Default)]
struct DeclaratorParts {
    name: Option<(String, SourceLocation)>,
    /// Identifier outward
    derivations: Vec<Derivation>,
}

impl DeclaratorParts {
    fn is_empty(&self) -> bool {
        self.name.is_none() && self.derivations.is_empty()
    }

    fn build(self) -> Option<Declarator> {
        let leaf = self
            .name
            .map(|(name, location)| Declarator::Identifier { name, location });
        self.derivations
            .into_iter()
            .rev()
            .fold(leaf, |inner, derivation| Some(derivation.wrap(inner)))
    }
}

impl Parser {
    /// Parse a declaration or function definition.
    ///
    /// An init-declarator list yields one [`Declaration`] per declarator, each
    /// with its own copy of the specifier.
    pub(crate) fn parse_declaration(&mut self) -> Vec<AstNode> {
        log::trace!("parse_declaration() at {}", self.current_location());
        let location = self.current_location();
        let specifier = self.parse_declaration_specifiers();
        let mut nodes = Vec::new();

        // struct/union/enum definitions and other declarator-less declarations
        if self.match_token(&TokenKind::Semicolon) {
            let id = self.next_node_id();
            nodes.push(AstNode::Declaration(Declaration {
                id,
                specifier,
                declarator: None,
                initializer: None,
                bit_width: None,
                location,
            }));
            return nodes;
        }

        loop {
            let Some(declarator) = self.parse_declarator() else {
                self.error(format!("expected identifier or '(' before {}", self.current()));
                self.synchronize();
                return nodes;
            };

            if declarator.is_function() && self.check(&TokenKind::LBrace) {
                let def = self.parse_function_definition(specifier.clone(), declarator, location);
                nodes.push(AstNode::FunctionDefinition(def));
                return nodes;
            }

            let id = self.next_node_id();
            self.declare(&specifier, &declarator, id);

            let initializer = if self.match_token(&TokenKind::Eq) {
                Some(self.parse_initializer())
            } else {
                None
            };

            nodes.push(AstNode::Declaration(Declaration {
                id,
                specifier: specifier.clone(),
                declarator: Some(declarator),
                initializer,
                bit_width: None,
                location,
            }));

            match self.current_kind() {
                TokenKind::Comma => {
                    self.advance();
                }
                TokenKind::Semicolon => {
                    self.advance();
                    break;
                }
                TokenKind::LBrace => break,
                _ => {
                    self.error(format!(
                        "expected ';' at end of declaration before {}",
                        self.current()
                    ));
                    break;
                }
            }
        }

        nodes
    }

    /// Parse a function body after its declarator. The function is declared
    /// before the body so it can call itself.
    fn parse_function_definition(
        &mut self,
        specifier: DeclSpecifier,
        declarator: Declarator,
        location: SourceLocation,
    ) -> FunctionDefinition {
        let id = self.next_node_id();
        if let Some(name) = declarator.identifier() {
            self.symbols.add_symbol(
                SymbolKind::FunctionDefinition,
                specifier.kind(),
                name,
                Some(id),
            );
        }

        let params: Vec<(String, TypeSpecifierKind)> = match &declarator {
            Declarator::Function { params, .. } => params
                .iter()
                .filter_map(|param| {
                    let name = param.declarator.as_ref()?.identifier()?;
                    Some((name.to_string(), param.specifier.kind()))
                })
                .collect(),
            _ => Vec::new(),
        };

        let body = self.parse_function_body(&params, id);

        FunctionDefinition {
            id,
            specifier,
            declarator,
            body: Box::new(body),
            location,
        }
    }

    /// Insert a named declarator into the current scope
    fn declare(&mut self, specifier: &DeclSpecifier, declarator: &Declarator, id: NodeId) {
        let Some(name) = declarator.identifier() else {
            return;
        };
        let kind = match declarator {
            Declarator::Identifier { .. } => SymbolKind::Variable,
            Declarator::Pointer { .. } => SymbolKind::Pointer,
            Declarator::Array { .. } => SymbolKind::Array,
            Declarator::Function { .. } => SymbolKind::Function,
        };
        self.symbols.add_symbol(kind, specifier.kind(), name, Some(id));
    }

    /// Parse declaration specifiers.
    ///
    /// Exactly one of `int`, `char`, `void`, `struct`, `union`, `enum` is
    /// the effective type. With no type keyword at all, an identifier makes
    /// the type default to `int`.
    pub(crate) fn parse_declaration_specifiers(&mut self) -> DeclSpecifier {
        let location = self.current_location();
        let mut specifier: Option<DeclSpecifier> = None;
        let mut saw_unsupported_type = false;

        loop {
            let kind = self.current_kind().clone();
            let token_location = self.current_location();

            if kind.is_storage_class() {
                self.warning("storage-class-specifiers not supported");
                self.advance();
            } else if kind.is_type_qualifier() {
                self.warning("type-qualifiers not supported");
                self.advance();
            } else if kind.is_unsupported_type() {
                self.warning(format!("type-specifier {} not supported", self.current()));
                saw_unsupported_type = true;
                self.advance();
            } else if kind.is_type_specifier() {
                if specifier.is_some() {
                    self.error(format!(
                        "two or more data types in declaration specifiers at {}",
                        self.current()
                    ));
                    self.advance();
                    continue;
                }
                specifier = Some(match kind {
                    TokenKind::Struct | TokenKind::Union => self.parse_struct_or_union(),
                    TokenKind::Enum => self.parse_enum(),
                    _ => {
                        self.advance();
                        let kind = match kind {
                            TokenKind::Void => TypeSpecifierKind::Void,
                            TokenKind::Char => TypeSpecifierKind::Char,
                            _ => TypeSpecifierKind::Int,
                        };
                        DeclSpecifier::Basic {
                            kind,
                            location: token_location,
                        }
                    }
                });
            } else {
                break;
            }
        }

        match specifier {
            Some(specifier) => specifier,
            None => {
                if saw_unsupported_type {
                    // already warned
                } else if matches!(self.current_kind(), TokenKind::Identifier(_)) {
                    self.warning("type defaults to 'int' in declaration");
                } else {
                    self.error(format!(
                        "expected declaration specifiers before {}",
                        self.current()
                    ));
                }
                DeclSpecifier::Basic {
                    kind: TypeSpecifierKind::Int,
                    location,
                }
            }
        }
    }

    /// Parse `struct`/`union` with optional tag and member list
    fn parse_struct_or_union(&mut self) -> DeclSpecifier {
        let location = self.current_location();
        let kind = if self.check(&TokenKind::Union) {
            TypeSpecifierKind::Union
        } else {
            TypeSpecifierKind::Struct
        };
        self.advance();

        let tag = self.match_identifier().map(|(name, _)| name);

        let members = if !self.check(&TokenKind::LBrace) {
            None
        } else if !self.enter_nesting("declaration nesting too deep") {
            self.skip_group();
            Some(Vec::new())
        } else {
            self.advance(); // consume '{'
            let mut members = Vec::new();
            while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
                let start = self.tokens.position();
                let token = self.current_kind();
                if token.is_declaration() {
                    members.extend(self.parse_member_declaration());
                } else if !matches!(token, TokenKind::Unknown(_)) {
                    self.error(format!(
                        "expected specifier-qualifier-list before {}",
                        self.current()
                    ));
                    self.synchronize();
                }
                if self.tokens.position() == start {
                    self.advance();
                }
            }
            self.expect(&TokenKind::RBrace, "expected '}' at end of member list");
            self.exit_nesting();
            Some(members)
        };

        if tag.is_none() && members.is_none() {
            self.error(format!("expected identifier or '{{' after '{}'", kind));
        }
        if let (Some(tag), Some(_)) = (&tag, &members) {
            self.symbols.add_symbol(SymbolKind::Tag, kind, tag.as_str(), None);
        }

        DeclSpecifier::StructOrUnion {
            kind,
            tag,
            members,
            location,
        }
    }

    /// Parse one member declaration of a struct/union body, which may
    /// declare several members and bit-fields. Members are not entered into
    /// the symbol table.
    fn parse_member_declaration(&mut self) -> Vec<Declaration> {
        let location = self.current_location();
        let specifier = self.parse_declaration_specifiers();
        let mut members = Vec::new();

        loop {
            let declarator = if self.check(&TokenKind::Colon) {
                None
            } else {
                self.parse_declarator()
            };

            let bit_width = if self.match_token(&TokenKind::Colon) {
                Some(self.parse_constant_expression())
            } else {
                None
            };

            if declarator.is_none() && bit_width.is_none() {
                // anonymous member: `struct { int a; };`
                if !self.check(&TokenKind::Semicolon) {
                    self.error(format!("expected identifier or '(' before {}", self.current()));
                    self.synchronize();
                    return members;
                }
            }

            let id = self.next_node_id();
            members.push(Declaration {
                id,
                specifier: specifier.clone(),
                declarator,
                initializer: None,
                bit_width,
                location,
            });

            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }

        self.expect(
            &TokenKind::Semicolon,
            "expected ';' at end of member declaration",
        );
        members
    }

    /// Parse `enum` with optional tag and enumerator list. Enumerators are
    /// declared as they are parsed so later ones may refer to earlier ones.
    fn parse_enum(&mut self) -> DeclSpecifier {
        let location = self.current_location();
        self.advance(); // consume 'enum'

        let tag = self.match_identifier().map(|(name, _)| name);

        let enumerators = if self.match_token(&TokenKind::LBrace) {
            let mut enumerators = Vec::new();
            while !self.check(&TokenKind::RBrace) {
                let Some((name, name_location)) = self.match_identifier() else {
                    self.error(format!("expected identifier before {}", self.current()));
                    break;
                };
                let value = if self.match_token(&TokenKind::Eq) {
                    Some(self.parse_constant_expression())
                } else {
                    None
                };
                self.symbols.add_symbol(
                    SymbolKind::Enumerator,
                    TypeSpecifierKind::Int,
                    name.as_str(),
                    None,
                );
                enumerators.push(Enumerator {
                    name,
                    value,
                    location: name_location,
                });

                // a trailing comma before '}' is allowed
                if !self.match_token(&TokenKind::Comma) {
                    break;
                }
            }
            self.expect(&TokenKind::RBrace, "expected '}' at end of enumerator list");
            Some(enumerators)
        } else {
            None
        };

        if tag.is_none() && enumerators.is_none() {
            self.error("expected identifier or '{' after 'enum'");
        }
        if let (Some(tag), Some(_)) = (&tag, &enumerators) {
            self.symbols
                .add_symbol(SymbolKind::Tag, TypeSpecifierKind::Enum, tag.as_str(), None);
        }

        DeclSpecifier::Enum {
            tag,
            enumerators,
            location,
        }
    }

    /// Parse a declarator that must name something
    pub(crate) fn parse_declarator(&mut self) -> Option<Declarator> {
        let parts = self.parse_declarator_parts(false)?;
        self.finish_declarator(parts)
    }

    /// Parse a declarator whose identifier may be absent
    pub(crate) fn parse_abstract_declarator(&mut self) -> Option<Declarator> {
        let parts = self.parse_declarator_parts(true)?;
        self.finish_declarator(parts)
    }

    fn finish_declarator(&mut self, parts: DeclaratorParts) -> Option<Declarator> {
        let pointer_to_function = parts.derivations.windows(2).find_map(|pair| match pair {
            [Derivation::Pointer(location), Derivation::Function { .. }] => Some(*location),
            _ => None,
        });
        if let Some(location) = pointer_to_function {
            self.error_at(location, "Function pointers are not supported.");
        }
        parts.build()
    }

    /// Collect a declarator's name and derivations. Returns `None` when no
    /// declarator is present at all.
    fn parse_declarator_parts(&mut self, is_abstract: bool) -> Option<DeclaratorParts> {
        let mut pointers = Vec::new();
        while self.check(&TokenKind::Star) {
            pointers.push(Derivation::Pointer(self.current_location()));
            self.advance();
            while self.current_kind().is_type_qualifier() {
                self.warning("type-qualifiers not supported");
                self.advance();
            }
        }

        let mut reported = false;
        let mut parts = match self.current_kind() {
            TokenKind::Identifier(_) => {
                let name = self.match_identifier();
                DeclaratorParts {
                    name,
                    derivations: Vec::new(),
                }
            }
            TokenKind::LParen if self.groups_declarator(is_abstract) => {
                if !self.enter_nesting("declaration nesting too deep") {
                    self.skip_group();
                    return None;
                }
                self.advance(); // consume '('
                let inner = self.parse_declarator_parts(is_abstract).unwrap_or_default();
                self.expect(&TokenKind::RParen, "expected ')' after declarator");
                self.exit_nesting();
                inner
            }
            _ => DeclaratorParts::default(),
        };
        let has_direct = !parts.is_empty();

        loop {
            let location = self.current_location();
            match self.current_kind() {
                TokenKind::LBracket => {
                    if !has_direct && !is_abstract && !reported {
                        self.error("Expected identifier before '[' token.");
                        reported = true;
                    }
                    self.advance();
                    let size = if self.check(&TokenKind::RBracket) {
                        None
                    } else {
                        Some(Box::new(self.parse_constant_expression()))
                    };
                    self.expect(&TokenKind::RBracket, "expected ']' after array size");
                    parts.derivations.push(Derivation::Array { size, location });
                }
                TokenKind::LParen if has_direct || is_abstract => {
                    if !self.enter_nesting("declaration nesting too deep") {
                        self.skip_group();
                        continue;
                    }
                    self.advance();
                    let (params, variadic) = self.parse_parameter_list();
                    self.exit_nesting();
                    parts.derivations.push(Derivation::Function {
                        params,
                        variadic,
                        location,
                    });
                }
                _ => break,
            }
        }

        parts.derivations.extend(pointers.into_iter().rev());

        if parts.is_empty() {
            return None;
        }
        if !is_abstract && parts.name.is_none() && !reported {
            self.error(format!("expected identifier or '(' before {}", self.current()));
        }
        Some(parts)
    }

    /// Whether a `(` opens a nested declarator rather than a parameter list.
    /// In an abstract declarator `(int)` and `()` are parameter lists.
    fn groups_declarator(&self, is_abstract: bool) -> bool {
        if !is_abstract {
            return true;
        }
        let next = self.peek_kind();
        !(next.is_declaration() || matches!(next, TokenKind::RParen))
    }

    /// Parse a parameter list after the opening parenthesis. `()` and
    /// `(void)` both mean no parameters.
    fn parse_parameter_list(&mut self) -> (Vec<AbstractDeclaration>, bool) {
        let mut params = Vec::new();
        let mut variadic = false;

        if self.match_token(&TokenKind::RParen) {
            return (params, variadic);
        }
        if self.check(&TokenKind::Void) && matches!(self.peek_kind(), TokenKind::RParen) {
            self.advance();
            self.advance();
            return (params, variadic);
        }

        loop {
            if self.match_token(&TokenKind::Ellipsis) {
                variadic = true;
                break;
            }
            params.push(self.parse_parameter_declaration());
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }

        self.expect(&TokenKind::RParen, "expected ')' at end of parameter list");
        (params, variadic)
    }

    /// Parse one parameter: specifiers and a named or abstract declarator
    fn parse_parameter_declaration(&mut self) -> AbstractDeclaration {
        let location = self.current_location();
        let specifier = self.parse_declaration_specifiers();
        let declarator = self.parse_abstract_declarator();
        AbstractDeclaration {
            specifier,
            declarator,
            location,
        }
    }

    /// Parse a type name as used by casts and `sizeof`
    pub(crate) fn parse_type_name(&mut self) -> AbstractDeclaration {
        self.parse_parameter_declaration()
    }

    /// Parse an initializer: an assignment expression or a brace list
    pub(crate) fn parse_initializer(&mut self) -> Initializer {
        if !self.check(&TokenKind::LBrace) {
            let expr = self.parse_assignment();
            return Initializer::Expr(self.require_operand(expr));
        }

        let location = self.current_location();
        if !self.enter_nesting("initializer nesting too deep") {
            self.skip_group();
            return Initializer::List {
                items: Vec::new(),
                location,
            };
        }
        self.advance(); // consume '{'
        let mut items = Vec::new();

        while !self.check(&TokenKind::RBrace) {
            items.push(self.parse_initializer());
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }

        self.expect(&TokenKind::RBrace, "expected '}' at end of initializer list");
        self.exit_nesting();
        Initializer::List { items, location }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse::ParseOutput;
    use test_log::test;

    fn parse(source: &str) -> ParseOutput {
        Parser::from_source(source).parse_translation_unit()
    }

    fn declarations(output: &ParseOutput) -> Vec<&Declaration> {
        output.unit.declarations().collect()
    }

    fn single_declarator(source: &str) -> Declarator {
        let output = parse(source);
        assert!(!output.has_errors(), "{:?}", output.diagnostics);
        let decls = declarations(&output);
        assert_eq!(decls.len(), 1);
        decls[0].declarator.clone().expect("declarator")
    }

    #[test]
    fn test_array_of_pointers() {
        match single_declarator("int *a[3];") {
            Declarator::Array { inner, size, .. } => {
                assert!(matches!(
                    size.as_deref(),
                    Some(Expr::IntegerConstant { value: 3, .. })
                ));
                match inner.as_deref() {
                    Some(Declarator::Pointer { inner, .. }) => assert!(matches!(
                        inner.as_deref(),
                        Some(Declarator::Identifier { name, .. }) if name == "a"
                    )),
                    other => panic!("Expected pointer, got {:?}", other),
                }
            }
            other => panic!("Expected array, got {:?}", other),
        }
    }

    #[test]
    fn test_pointer_to_array() {
        match single_declarator("int (*a)[3];") {
            Declarator::Pointer { inner, .. } => {
                assert!(matches!(inner.as_deref(), Some(Declarator::Array { .. })));
            }
            other => panic!("Expected pointer, got {:?}", other),
        }
    }

    #[test]
    fn test_function_returning_pointer() {
        match single_declarator("char *name(int id);") {
            Declarator::Function {
                inner,
                params,
                variadic,
                ..
            } => {
                assert!(!variadic);
                assert_eq!(params.len(), 1);
                assert_eq!(
                    params[0].declarator.as_ref().and_then(|d| d.identifier()),
                    Some("id")
                );
                assert!(matches!(inner.as_deref(), Some(Declarator::Pointer { .. })));
            }
            other => panic!("Expected function, got {:?}", other),
        }
    }

    #[test]
    fn test_variadic_and_abstract_parameters() {
        match single_declarator("int printf(char *, ...);") {
            Declarator::Function {
                params, variadic, ..
            } => {
                assert!(variadic);
                assert_eq!(params.len(), 1);
                assert!(matches!(
                    params[0].declarator,
                    Some(Declarator::Pointer { inner: None, .. })
                ));
            }
            other => panic!("Expected function, got {:?}", other),
        }
    }

    #[test]
    fn test_init_declarator_list() {
        let output = parse("int a, *b = 0, c[2] = {1, 2};");
        assert!(!output.has_errors(), "{:?}", output.diagnostics);
        let decls = declarations(&output);
        assert_eq!(decls.len(), 3);
        assert!(decls.iter().all(|d| d.specifier.kind() == TypeSpecifierKind::Int));
        assert!(decls[0].initializer.is_none());
        assert!(matches!(decls[1].initializer, Some(Initializer::Expr(_))));
        match &decls[2].initializer {
            Some(Initializer::List { items, .. }) => assert_eq!(items.len(), 2),
            other => panic!("Expected initializer list, got {:?}", other),
        }

        let kinds: Vec<_> = output
            .symbols
            .global_symbols()
            .iter()
            .map(|s| s.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![SymbolKind::Variable, SymbolKind::Pointer, SymbolKind::Array]
        );
    }

    #[test]
    fn test_nested_initializer_list() {
        let output = parse("int m[2][2] = {{1, 2}, {3, 4},};");
        assert!(!output.has_errors(), "{:?}", output.diagnostics);
        match &declarations(&output)[0].initializer {
            Some(Initializer::List { items, .. }) => {
                assert_eq!(items.len(), 2);
                assert!(matches!(items[0], Initializer::List { .. }));
            }
            other => panic!("Expected initializer list, got {:?}", other),
        }
    }

    #[test]
    fn test_deeply_nested_initializer_is_cut_off() {
        let source = format!("int x = {}1{};", "{".repeat(100), "}".repeat(100));
        let output = parse(&source);
        assert_eq!(output.diagnostics.error_count(), 1);
        assert_eq!(
            output.diagnostics.entries()[0].message,
            "initializer nesting too deep"
        );
        assert_eq!(declarations(&output).len(), 1);
    }

    #[test]
    fn test_deeply_nested_declarator_is_cut_off() {
        let source = format!("int {}x{}; int y;", "(".repeat(100), ")".repeat(100));
        let output = parse(&source);
        assert_eq!(
            output.diagnostics.entries()[0].message,
            "declaration nesting too deep"
        );
        let names: Vec<_> = output
            .symbols
            .global_symbols()
            .iter()
            .map(|s| s.identifier.as_str())
            .collect();
        assert_eq!(names, vec!["y"]);
    }

    #[test]
    fn test_stray_character_in_member_list_reported_once() {
        let output = parse("struct s { @ int a; };");
        assert_eq!(output.diagnostics.error_count(), 1);
        assert_eq!(
            output.diagnostics.entries()[0].message,
            "stray '@' in program"
        );
    }

    #[test]
    fn test_missing_semicolon_reports_once() {
        let output = parse("int x\nint y;");
        assert_eq!(output.diagnostics.error_count(), 1);
        assert!(output.has_errors());
        let decls = declarations(&output);
        assert_eq!(decls.len(), 2);
        assert_eq!(
            decls[0].declarator.as_ref().and_then(|d| d.identifier()),
            Some("x")
        );
    }

    #[test]
    fn test_struct_with_members_and_bitfield() {
        let output = parse("struct point { int x, y; unsigned flag : 1; };");
        assert!(!output.has_errors(), "{:?}", output.diagnostics);
        let decls = declarations(&output);
        match &decls[0].specifier {
            DeclSpecifier::StructOrUnion {
                kind,
                tag,
                members: Some(members),
                ..
            } => {
                assert_eq!(*kind, TypeSpecifierKind::Struct);
                assert_eq!(tag.as_deref(), Some("point"));
                assert_eq!(members.len(), 3);
                assert!(members[2].bit_width.is_some());
            }
            other => panic!("Expected struct, got {:?}", other),
        }
        assert_eq!(output.symbols.global_symbols()[0].kind, SymbolKind::Tag);
        // one warning for 'unsigned'
        assert_eq!(output.diagnostics.warning_count(), 1);
    }

    #[test]
    fn test_enum_with_trailing_comma() {
        let output = parse("enum color { RED, GREEN = 5, BLUE, } c;");
        assert!(!output.has_errors(), "{:?}", output.diagnostics);
        match &declarations(&output)[0].specifier {
            DeclSpecifier::Enum {
                tag,
                enumerators: Some(enumerators),
                ..
            } => {
                assert_eq!(tag.as_deref(), Some("color"));
                let names: Vec<_> = enumerators.iter().map(|e| e.name.as_str()).collect();
                assert_eq!(names, vec!["RED", "GREEN", "BLUE"]);
                assert!(enumerators[1].value.is_some());
            }
            other => panic!("Expected enum, got {:?}", other),
        }
        assert!(output.symbols.lookup("GREEN").is_some());
    }

    #[test]
    fn test_function_pointer_reports_but_builds() {
        let output = parse("int (*handler)(int);");
        assert_eq!(output.diagnostics.error_count(), 1);
        assert_eq!(
            output.diagnostics.entries()[0].message,
            "Function pointers are not supported."
        );
        let decls = declarations(&output);
        assert!(matches!(
            decls[0].declarator,
            Some(Declarator::Pointer { .. })
        ));
    }

    #[test]
    fn test_unsupported_specifiers_warn() {
        let output = parse("static const int x; unsigned long y;");
        assert!(!output.has_errors(), "{:?}", output.diagnostics);
        assert_eq!(output.diagnostics.warning_count(), 4);
        assert_eq!(declarations(&output).len(), 2);
    }

    #[test]
    fn test_missing_declarator() {
        let output = parse("int [3];");
        assert_eq!(output.diagnostics.error_count(), 1);
        assert_eq!(
            output.diagnostics.entries()[0].message,
            "Expected identifier before '[' token."
        );
    }

    #[test]
    fn test_implicit_int_function() {
        let output = parse("main() { return 0; }");
        assert!(!output.has_errors());
        assert_eq!(output.diagnostics.warning_count(), 1);
        assert_eq!(output.unit.function_definitions().count(), 1);
    }

    #[test]
    fn test_function_definition_scopes_parameters() {
        let output = parse("int add(int a, int b) { return a + b; }");
        assert!(!output.has_errors(), "{:?}", output.diagnostics);
        let def = output.unit.function_definitions().next().expect("definition");
        assert_eq!(def.name(), Some("add"));

        let Stmt::Compound { items, scope_id, .. } = def.body.as_ref() else {
            panic!("Expected compound body");
        };
        let Some(AstNode::Statement(Stmt::Return {
            expr: Some(Expr::Binary { left, .. }),
            ..
        })) = items.first()
        else {
            panic!("Expected return of a sum, got {:?}", items);
        };
        match left.as_ref() {
            Expr::Identifier {
                binding: Some(binding),
                ..
            } => {
                assert_eq!(binding.scope_id, *scope_id);
                assert_eq!(binding.declaration, Some(def.id));
            }
            other => panic!("Expected bound identifier, got {:?}", other),
        }
    }
}
