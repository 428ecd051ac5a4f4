//! Statement parsing implementation
//!
//! This module handles parsing of all C statement types:
//!
//! - Compound statements: `{ ... }`, each opening a new scope
//! - Selection: `if`/`else`, `switch` with `case`/`default` labels
//! - Iteration: `while`, `do`-`while`, `for`
//! - Jumps: `goto`, `continue`, `break`, `return`
//! - Labeled statements: `name: statement`
//! - Expression statements, including the null statement `;`
//!
//! # Grammar
//!
//! ```text
//! statement ::= compound | if_stmt | switch_stmt | while_stmt | do_while_stmt
//!             | for_stmt | goto_stmt | "continue" ";" | "break" ";"
//!             | return_stmt | label_stmt | case_stmt | default_stmt | expr_stmt
//! compound  ::= "{" ( declaration | statement )* "}"
//! for_stmt  ::= "for" "(" expr? ";" expr? ";" expr? ")" statement
//! ```
//!
//! A `for` clause is present only when the token that would end it does not
//! immediately follow; an empty clause is `None`.
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::lexer::TokenKind;
use crate::parser::parse::Parser;
use crate::symbols::SymbolKind;

impl Parser {
    /// Parse a compound statement starting at `{`
    pub(crate) fn parse_compound_statement(&mut self) -> Stmt {
        self.parse_block(&[], None)
    }

    /// Parse a function body, inserting the named parameters into the
    /// body's scope
    pub(crate) fn parse_function_body(
        &mut self,
        params: &[(String, TypeSpecifierKind)],
        function: NodeId,
    ) -> Stmt {
        self.parse_block(params, Some(function))
    }

    fn parse_block(
        &mut self,
        params: &[(String, TypeSpecifierKind)],
        owner: Option<NodeId>,
    ) -> Stmt {
        let location = self.current_location();
        if !self.enter_nesting("statement nesting too deep") {
            self.skip_group();
            return Stmt::Compound {
                items: Vec::new(),
                scope_id: self.symbols.current_scope_id(),
                location,
            };
        }
        self.expect(&TokenKind::LBrace, "expected '{' at start of block");

        let scope_id = self.symbols.enter_scope();
        for (name, declared_type) in params {
            self.symbols
                .add_symbol(SymbolKind::Parameter, *declared_type, name.as_str(), owner);
        }

        let mut items = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            if self.diagnostics.limit_reached() {
                break;
            }
            let start = self.tokens.position();
            let kind = self.current_kind();

            if kind.is_declaration() {
                items.extend(self.parse_declaration());
            } else if kind.is_statement() {
                if let Some(stmt) = self.parse_statement() {
                    items.push(AstNode::Statement(stmt));
                }
            } else if !matches!(kind, TokenKind::Unknown(_)) {
                self.error(format!("expected statement before {}", self.current()));
            }

            if self.tokens.position() == start {
                self.advance();
            }
        }

        self.expect(&TokenKind::RBrace, "expected '}' at end of input");
        if let Err(err) = self.symbols.exit_scope() {
            log::error!("block at {}: {}", location, err);
        }
        self.exit_nesting();

        Stmt::Compound {
            items,
            scope_id,
            location,
        }
    }

    /// Parse a statement.
    ///
    /// Returns `None` without consuming anything at `}` or end of input. A
    /// token that cannot start a statement is reported and skipped.
    pub(crate) fn parse_statement(&mut self) -> Option<Stmt> {
        log::trace!("parse_statement() at {}", self.current_location());
        let location = self.current_location();

        let stmt = match self.current_kind() {
            TokenKind::RBrace | TokenKind::End => return None,
            TokenKind::LBrace => self.parse_compound_statement(),
            TokenKind::If => self.parse_if_statement(),
            TokenKind::Switch => self.parse_switch_statement(),
            TokenKind::While => self.parse_while_statement(),
            TokenKind::Do => self.parse_do_while_statement(),
            TokenKind::For => self.parse_for_statement(),
            TokenKind::Goto => self.parse_goto_statement(),
            TokenKind::Continue => {
                self.advance();
                self.expect(&TokenKind::Semicolon, "expected ';' after 'continue'");
                Stmt::Continue { location }
            }
            TokenKind::Break => {
                self.advance();
                self.expect(&TokenKind::Semicolon, "expected ';' after 'break'");
                Stmt::Break { location }
            }
            TokenKind::Return => self.parse_return_statement(),
            TokenKind::Case => self.parse_case_statement(),
            TokenKind::Default => self.parse_default_statement(),
            TokenKind::Semicolon => {
                self.advance();
                Stmt::Expression {
                    expr: None,
                    location,
                }
            }
            TokenKind::Identifier(_) if matches!(self.peek_kind(), TokenKind::Colon) => {
                self.parse_label_statement()
            }
            kind if kind.starts_expression() => self.parse_expression_statement(),
            // Already reported by the lexer
            TokenKind::Unknown(_) => {
                self.advance();
                return None;
            }
            _ => {
                self.error(format!("expected statement before {}", self.current()));
                self.advance();
                return None;
            }
        };

        Some(stmt)
    }

    /// Parse the statement slot of another statement. A missing statement
    /// is reported and replaced by a null statement.
    fn parse_sub_statement(&mut self) -> Stmt {
        let location = self.current_location();
        let start = self.tokens.position();

        if !self.enter_nesting("statement nesting too deep") {
            if self.check(&TokenKind::LBrace) {
                self.skip_group();
            } else {
                self.synchronize();
            }
            return Stmt::Expression {
                expr: None,
                location,
            };
        }
        let stmt = self.parse_statement();
        self.exit_nesting();

        match stmt {
            Some(stmt) => stmt,
            None => {
                if self.tokens.position() == start {
                    self.error(format!("expected statement before {}", self.current()));
                }
                Stmt::Expression {
                    expr: None,
                    location,
                }
            }
        }
    }

    /// Parse `( expression )` after a keyword
    fn parse_condition(&mut self) -> Expr {
        self.expect(&TokenKind::LParen, "expected '(' before expression");
        let condition = self.parse_expression();
        let condition = self.require_operand(condition);
        self.expect(&TokenKind::RParen, "expected ')' before statement");
        condition
    }

    /// Parse if statement; an `else` binds to the nearest `if`
    fn parse_if_statement(&mut self) -> Stmt {
        let location = self.current_location();
        self.advance(); // consume 'if'

        let condition = self.parse_condition();
        let then_branch = Box::new(self.parse_sub_statement());
        let else_branch = if self.match_token(&TokenKind::Else) {
            Some(Box::new(self.parse_sub_statement()))
        } else {
            None
        };

        Stmt::If {
            condition,
            then_branch,
            else_branch,
            location,
        }
    }

    /// Parse switch statement
    fn parse_switch_statement(&mut self) -> Stmt {
        let location = self.current_location();
        self.advance(); // consume 'switch'

        let expr = self.parse_condition();
        let body = Box::new(self.parse_sub_statement());

        Stmt::Switch {
            expr,
            body,
            location,
        }
    }

    /// Parse while statement
    fn parse_while_statement(&mut self) -> Stmt {
        let location = self.current_location();
        self.advance(); // consume 'while'

        let condition = self.parse_condition();
        let body = Box::new(self.parse_sub_statement());

        Stmt::While {
            condition,
            body,
            location,
        }
    }

    /// Parse do-while statement
    fn parse_do_while_statement(&mut self) -> Stmt {
        let location = self.current_location();
        self.advance(); // consume 'do'

        let body = Box::new(self.parse_sub_statement());

        if !self.match_token(&TokenKind::While) {
            self.error(format!("expected 'while' before {}", self.current()));
        }
        self.expect(&TokenKind::LParen, "expected '(' before expression");
        let condition = self.parse_expression();
        let condition = self.require_operand(condition);
        self.expect(&TokenKind::RParen, "expected ')' after expression");
        self.expect(
            &TokenKind::Semicolon,
            "expected ';' at the end of do-while statement",
        );

        Stmt::DoWhile {
            body,
            condition,
            location,
        }
    }

    /// Parse for statement
    fn parse_for_statement(&mut self) -> Stmt {
        let location = self.current_location();
        self.advance(); // consume 'for'

        self.expect(&TokenKind::LParen, "expected '(' after 'for'");

        // A loop variable is visible in the clauses and body only
        let declares_variable = self.current_kind().is_declaration();
        if declares_variable {
            self.symbols.enter_scope();
        }

        let init = if declares_variable {
            self.error("declarations in 'for' loop initializers are not supported");
            // parse_declaration consumes the ';'
            let _ = self.parse_declaration();
            None
        } else {
            let init = self.parse_for_clause(&TokenKind::Semicolon);
            self.expect(&TokenKind::Semicolon, "expected ';' in 'for' statement");
            init
        };

        let condition = self.parse_for_clause(&TokenKind::Semicolon);
        self.expect(&TokenKind::Semicolon, "expected ';' in 'for' statement");

        let step = self.parse_for_clause(&TokenKind::RParen);
        self.expect(&TokenKind::RParen, "expected ')' before statement");

        let body = Box::new(self.parse_sub_statement());

        if declares_variable {
            if let Err(err) = self.symbols.exit_scope() {
                log::error!("for statement at {}: {}", location, err);
            }
        }

        Stmt::For {
            init,
            condition,
            step,
            body,
            location,
        }
    }

    /// One `for` clause, absent when `terminator` comes next
    fn parse_for_clause(&mut self, terminator: &TokenKind) -> Option<Expr> {
        if self.check(terminator) {
            return None;
        }
        let expr = self.parse_expression();
        Some(self.require_operand(expr))
    }

    /// Parse goto statement
    fn parse_goto_statement(&mut self) -> Stmt {
        let location = self.current_location();
        self.advance(); // consume 'goto'

        let label = match self.match_identifier() {
            Some((name, _)) => name,
            None => {
                self.error(format!("expected identifier before {}", self.current()));
                String::new()
            }
        };
        self.expect(&TokenKind::Semicolon, "expected ';' after goto statement");

        Stmt::Goto { label, location }
    }

    /// Parse return statement
    fn parse_return_statement(&mut self) -> Stmt {
        let location = self.current_location();
        self.advance(); // consume 'return'

        let expr = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            let expr = self.parse_expression();
            Some(self.require_operand(expr))
        };
        self.expect(&TokenKind::Semicolon, "expected ';' after return statement");

        Stmt::Return { expr, location }
    }

    /// Body of a label, absent when the label closes its block
    fn parse_labeled_body(&mut self) -> Option<Box<Stmt>> {
        if self.check(&TokenKind::RBrace) {
            None
        } else {
            Some(Box::new(self.parse_sub_statement()))
        }
    }

    /// Parse `name: statement`
    fn parse_label_statement(&mut self) -> Stmt {
        let location = self.current_location();
        let name = self
            .match_identifier()
            .map(|(name, _)| name)
            .unwrap_or_default();
        self.advance(); // consume ':'

        let body = self.parse_labeled_body();
        Stmt::Label {
            name,
            body,
            location,
        }
    }

    /// Parse `case constant: statement`
    fn parse_case_statement(&mut self) -> Stmt {
        let location = self.current_location();
        self.advance(); // consume 'case'

        let value = self.parse_constant_expression();
        self.expect(&TokenKind::Colon, "expected ':' after 'case'");

        let body = self.parse_labeled_body();
        Stmt::Case {
            value,
            body,
            location,
        }
    }

    /// Parse `default: statement`
    fn parse_default_statement(&mut self) -> Stmt {
        let location = self.current_location();
        self.advance(); // consume 'default'

        self.expect(&TokenKind::Colon, "expected ':' after 'default'");

        let body = self.parse_labeled_body();
        Stmt::Default { body, location }
    }

    /// Parse expression statement
    fn parse_expression_statement(&mut self) -> Stmt {
        let location = self.current_location();
        let expr = self.parse_expression();
        let expr = self.require_operand(expr);
        self.expect(&TokenKind::Semicolon, "expected ';' after expression");

        Stmt::Expression {
            expr: Some(expr),
            location,
        }
    }
}
