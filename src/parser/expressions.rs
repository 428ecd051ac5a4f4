//! Expression parsing implementation
//!
//! This module handles the C expression grammar as a precedence cascade,
//! one method per level, loosest binding first.
//!
//! # Supported Expressions
//!
//! - Constants: integers (decimal, octal, hex, with `u`/`l` suffixes),
//!   characters, strings (adjacent literals are concatenated)
//! - Identifiers, resolved against the symbol table
//! - Binary operators: arithmetic, shift, relational, equality, bitwise, logical
//! - Simple and compound assignment (right-associative)
//! - Unary operators: `++`, `--`, `&`, `*`, `+`, `-`, `~`, `!`, `sizeof`
//! - Postfix: `[]`, `()`, `++`, `--`
//! - Type casts: `(type)expr`
//!
//! The conditional operator and member access are recognized only to report
//! them as unsupported.
//!
//! # Grammar
//!
//! ```text
//! assignment  ::= conditional ( assign_op assignment )?
//! conditional ::= logical_or
//! logical_or  ::= logical_and ( "||" logical_and )*
//! ...           (one level per binary precedence)
//! multiplicative ::= cast ( ("*" | "/" | "%") cast )*
//! cast        ::= "(" type_name ")" cast | unary
//! unary       ::= ("++" | "--") unary | unary_op cast | "sizeof" ... | postfix
//! postfix     ::= primary ( "[" expr "]" | "(" args ")" | "++" | "--" )*
//! primary     ::= constant | string | identifier | "(" expr ")"
//! ```
//!
//! Every method returns `None` when the current token cannot start an
//! expression at all; operands that are required but missing are replaced by
//! [`Expr::Error`] after reporting.
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::lexer::{IntegerLiteral, TokenKind};
use crate::parser::parse::Parser;

type Level = fn(&mut Parser) -> Option<Expr>;

const LOGICAL_OR: &[(TokenKind, BinOp)] = &[(TokenKind::OrOr, BinOp::LogicalOr)];
const LOGICAL_AND: &[(TokenKind, BinOp)] = &[(TokenKind::AndAnd, BinOp::LogicalAnd)];
const INCLUSIVE_OR: &[(TokenKind, BinOp)] = &[(TokenKind::Pipe, BinOp::BitOr)];
const EXCLUSIVE_OR: &[(TokenKind, BinOp)] = &[(TokenKind::Caret, BinOp::BitXor)];
const AND: &[(TokenKind, BinOp)] = &[(TokenKind::Amp, BinOp::BitAnd)];
const EQUALITY: &[(TokenKind, BinOp)] = &[
    (TokenKind::EqEq, BinOp::Eq),
    (TokenKind::NotEq, BinOp::Ne),
];
const RELATIONAL: &[(TokenKind, BinOp)] = &[
    (TokenKind::Lt, BinOp::Lt),
    (TokenKind::Gt, BinOp::Gt),
    (TokenKind::Le, BinOp::Le),
    (TokenKind::Ge, BinOp::Ge),
];
const SHIFT: &[(TokenKind, BinOp)] = &[
    (TokenKind::LtLt, BinOp::Shl),
    (TokenKind::GtGt, BinOp::Shr),
];
const ADDITIVE: &[(TokenKind, BinOp)] = &[
    (TokenKind::Plus, BinOp::Add),
    (TokenKind::Minus, BinOp::Sub),
];
const MULTIPLICATIVE: &[(TokenKind, BinOp)] = &[
    (TokenKind::Star, BinOp::Mul),
    (TokenKind::Slash, BinOp::Div),
    (TokenKind::Percent, BinOp::Mod),
];

impl Parser {
    /// Parse expression (top-level entry point)
    pub(crate) fn parse_expression(&mut self) -> Option<Expr> {
        log::trace!("parse_expression() at {}", self.current_location());
        self.parse_assignment()
    }

    /// Parse a constant expression, which must be present
    pub(crate) fn parse_constant_expression(&mut self) -> Expr {
        let expr = self.parse_conditional();
        self.require_operand(expr)
    }

    /// Replace a missing operand with an error node, reporting it
    pub(crate) fn require_operand(&mut self, operand: Option<Expr>) -> Expr {
        match operand {
            Some(expr) => expr,
            None => {
                let location = self.current_location();
                self.error(format!("expected expression before {}", self.current()));
                Expr::Error { location }
            }
        }
    }

    /// Parse assignment (right-associative)
    pub(crate) fn parse_assignment(&mut self) -> Option<Expr> {
        let lhs = self.parse_conditional()?;

        let op = match self.current_kind() {
            TokenKind::Eq => AssignOp::Assign,
            TokenKind::PlusEq => AssignOp::AddAssign,
            TokenKind::MinusEq => AssignOp::SubAssign,
            TokenKind::StarEq => AssignOp::MulAssign,
            TokenKind::SlashEq => AssignOp::DivAssign,
            TokenKind::PercentEq => AssignOp::ModAssign,
            TokenKind::AmpEq => AssignOp::AndAssign,
            TokenKind::CaretEq => AssignOp::XorAssign,
            TokenKind::PipeEq => AssignOp::OrAssign,
            TokenKind::LtLtEq => AssignOp::ShlAssign,
            TokenKind::GtGtEq => AssignOp::ShrAssign,
            _ => return Some(lhs),
        };

        let location = self.current_location();
        self.advance();
        let rhs = self.parse_nested(Parser::parse_assignment);
        let rhs = self.require_operand(rhs);

        Some(Expr::Assignment {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
            location,
        })
    }

    /// Parse conditional. `?:` is not supported: the operands are parsed
    /// and dropped, and the condition is returned.
    fn parse_conditional(&mut self) -> Option<Expr> {
        let condition = self.parse_logical_or()?;

        if self.check(&TokenKind::Question) {
            self.error("conditional expressions are not supported");
            self.advance();
            let _ = self.parse_nested(Parser::parse_expression);
            if self.expect(&TokenKind::Colon, "expected ':' in conditional expression") {
                let _ = self.parse_nested(Parser::parse_conditional);
            }
        }

        Some(condition)
    }

    /// Parse an operand one nesting level down. Input nested past
    /// [`MAX_NESTING_DEPTH`](crate::parser::MAX_NESTING_DEPTH) is reported once
    /// and the rest of the operand is skipped, leaving an error node in its
    /// place.
    fn parse_nested(&mut self, parse: Level) -> Option<Expr> {
        let location = self.current_location();
        if !self.enter_nesting("expression nesting too deep") {
            self.skip_expression();
            return Some(Expr::Error { location });
        }
        let expr = parse(self);
        self.exit_nesting();
        expr
    }

    /// Skip tokens up to the first `;`, `,`, `:` or closing bracket that
    /// belongs to an enclosing level.
    fn skip_expression(&mut self) {
        let mut depth = 0usize;
        while !self.is_at_end() {
            match self.current_kind() {
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => depth += 1,
                TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                    if depth == 0 {
                        return;
                    }
                    depth -= 1;
                }
                TokenKind::Semicolon | TokenKind::Comma | TokenKind::Colon if depth == 0 => {
                    return
                }
                _ => {}
            }
            self.advance();
        }
    }

    /// Parse one left-associative binary level
    fn parse_binary_level(
        &mut self,
        operators: &[(TokenKind, BinOp)],
        next: Level,
    ) -> Option<Expr> {
        let mut left = next(self)?;

        loop {
            let Some(op) = operators
                .iter()
                .find(|(kind, _)| self.check(kind))
                .map(|(_, op)| *op)
            else {
                break;
            };

            let location = self.current_location();
            self.advance();
            let right = next(self);
            let right = self.require_operand(right);

            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
                location,
            };
        }

        Some(left)
    }

    /// Parse logical OR (||)
    fn parse_logical_or(&mut self) -> Option<Expr> {
        self.parse_binary_level(LOGICAL_OR, Parser::parse_logical_and)
    }

    /// Parse logical AND (&&)
    fn parse_logical_and(&mut self) -> Option<Expr> {
        self.parse_binary_level(LOGICAL_AND, Parser::parse_inclusive_or)
    }

    /// Parse bitwise OR (|)
    fn parse_inclusive_or(&mut self) -> Option<Expr> {
        self.parse_binary_level(INCLUSIVE_OR, Parser::parse_exclusive_or)
    }

    /// Parse bitwise XOR (^)
    fn parse_exclusive_or(&mut self) -> Option<Expr> {
        self.parse_binary_level(EXCLUSIVE_OR, Parser::parse_and)
    }

    /// Parse bitwise AND (&)
    fn parse_and(&mut self) -> Option<Expr> {
        self.parse_binary_level(AND, Parser::parse_equality)
    }

    /// Parse equality (==, !=)
    fn parse_equality(&mut self) -> Option<Expr> {
        self.parse_binary_level(EQUALITY, Parser::parse_relational)
    }

    /// Parse relational (<, >, <=, >=)
    fn parse_relational(&mut self) -> Option<Expr> {
        self.parse_binary_level(RELATIONAL, Parser::parse_shift)
    }

    /// Parse shift (<<, >>)
    fn parse_shift(&mut self) -> Option<Expr> {
        self.parse_binary_level(SHIFT, Parser::parse_additive)
    }

    /// Parse additive (+, -)
    fn parse_additive(&mut self) -> Option<Expr> {
        self.parse_binary_level(ADDITIVE, Parser::parse_multiplicative)
    }

    /// Parse multiplicative (*, /, %)
    fn parse_multiplicative(&mut self) -> Option<Expr> {
        self.parse_binary_level(MULTIPLICATIVE, Parser::parse_cast)
    }

    /// Parse cast, told apart from a parenthesized expression by whether
    /// the token after `(` starts a declaration
    fn parse_cast(&mut self) -> Option<Expr> {
        if self.check(&TokenKind::LParen) && self.peek_kind().is_declaration() {
            let location = self.current_location();
            self.advance(); // consume '('
            let type_name = self.parse_type_name();
            self.expect(&TokenKind::RParen, "expected ')' after type name");
            let operand = self.parse_nested(Parser::parse_cast);
            let operand = self.require_operand(operand);

            return Some(Expr::Cast {
                type_name: Box::new(type_name),
                expr: Box::new(operand),
                location,
            });
        }

        self.parse_unary()
    }

    /// Parse unary (prefix operators and sizeof)
    fn parse_unary(&mut self) -> Option<Expr> {
        let location = self.current_location();
        let op = match self.current_kind() {
            TokenKind::PlusPlus => UnaryOp::PreInc,
            TokenKind::MinusMinus => UnaryOp::PreDec,
            TokenKind::Amp => UnaryOp::AddrOf,
            TokenKind::Star => UnaryOp::Deref,
            TokenKind::Plus => UnaryOp::Plus,
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Tilde => UnaryOp::BitNot,
            TokenKind::Bang => UnaryOp::Not,
            TokenKind::Sizeof => return Some(self.parse_sizeof()),
            _ => return self.parse_postfix(),
        };
        self.advance();

        let operand = match op {
            UnaryOp::PreInc | UnaryOp::PreDec => self.parse_nested(Parser::parse_unary),
            _ => self.parse_nested(Parser::parse_cast),
        };
        let operand = self.require_operand(operand);

        Some(Expr::Unary {
            op,
            operand: Box::new(operand),
            location,
        })
    }

    /// Parse `sizeof expr` or `sizeof(type)`
    fn parse_sizeof(&mut self) -> Expr {
        let location = self.current_location();
        self.advance(); // consume 'sizeof'

        if self.check(&TokenKind::LParen) && self.peek_kind().is_declaration() {
            self.advance();
            let type_name = self.parse_type_name();
            self.expect(&TokenKind::RParen, "expected ')' after type name");
            return Expr::SizeofType {
                type_name: Box::new(type_name),
                location,
            };
        }

        let operand = self.parse_nested(Parser::parse_unary);
        let operand = self.require_operand(operand);
        Expr::SizeofExpr {
            expr: Box::new(operand),
            location,
        }
    }

    /// Parse postfix operators
    fn parse_postfix(&mut self) -> Option<Expr> {
        let mut expr = self.parse_primary()?;

        loop {
            let location = self.current_location();
            match self.current_kind() {
                TokenKind::PlusPlus | TokenKind::MinusMinus => {
                    let op = if self.check(&TokenKind::PlusPlus) {
                        PostfixOp::Inc
                    } else {
                        PostfixOp::Dec
                    };
                    self.advance();
                    expr = Expr::Postfix {
                        op,
                        operand: Box::new(expr),
                        location,
                    };
                }
                TokenKind::LBracket => {
                    self.advance();
                    let index = match self.parse_nested(Parser::parse_expression) {
                        Some(index) => index,
                        None => {
                            self.error("Expected expression before ']' token");
                            Expr::Error {
                                location: self.current_location(),
                            }
                        }
                    };
                    self.expect(&TokenKind::RBracket, "expected ']' after array index");
                    expr = Expr::ArrayAccess {
                        array: Box::new(expr),
                        index: Box::new(index),
                        location,
                    };
                }
                TokenKind::LParen => {
                    self.advance();
                    let args = self.parse_argument_list();
                    expr = Expr::Call {
                        callee: Box::new(expr),
                        args,
                        location,
                    };
                }
                TokenKind::Dot | TokenKind::Arrow => {
                    self.error("Structs and Unions not yet implemented");
                    self.advance();
                    self.match_identifier();
                }
                _ => break,
            }
        }

        Some(expr)
    }

    /// Parse function call arguments after the opening parenthesis
    fn parse_argument_list(&mut self) -> Vec<Expr> {
        let mut args = Vec::new();

        if self.match_token(&TokenKind::RParen) {
            return args;
        }

        loop {
            let arg = self.parse_nested(Parser::parse_assignment);
            args.push(self.require_operand(arg));

            if self.match_token(&TokenKind::Comma) {
                continue;
            }
            self.expect(&TokenKind::RParen, "expected ')' after argument list");
            break;
        }

        args
    }

    /// Parse primary expression
    fn parse_primary(&mut self) -> Option<Expr> {
        let location = self.current_location();

        match self.current_kind() {
            TokenKind::IntegerConstant(literal) => {
                let literal = literal.clone();
                self.advance();
                Some(self.integer_constant(&literal, location))
            }
            TokenKind::Identifier(name) => {
                let name = name.clone();
                self.advance();
                let binding = self.symbols.lookup(&name).map(|sym| Binding {
                    scope_id: sym.scope_id,
                    declaration: sym.params,
                });
                if binding.is_none() {
                    self.diagnostics
                        .debug(location, format_args!("'{}' is not declared", name));
                }
                Some(Expr::Identifier {
                    name,
                    binding,
                    location,
                })
            }
            TokenKind::Apostrophe => Some(self.parse_char_constant()),
            TokenKind::Quote => Some(self.parse_string_literal()),
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_nested(Parser::parse_expression);
                let inner = match inner {
                    Some(expr) => expr,
                    None => {
                        self.error(format!("expected expression before {}", self.current()));
                        Expr::Error { location }
                    }
                };
                if !self.match_token(&TokenKind::RParen) {
                    self.error("Mismatched parenthesis within expression");
                }
                Some(inner)
            }
            // Tokens that end an expression: nothing to parse here
            TokenKind::Semicolon
            | TokenKind::RParen
            | TokenKind::RBracket
            | TokenKind::RBrace
            | TokenKind::Comma
            | TokenKind::Colon
            | TokenKind::End => None,
            // Already reported by the lexer
            TokenKind::Unknown(_) => {
                self.advance();
                Some(Expr::Error { location })
            }
            _ => {
                self.error(format!("invalid token {} within expression", self.current()));
                self.advance();
                Some(Expr::Error { location })
            }
        }
    }

    /// Convert an integer constant, validating digits for its base and the
    /// suffix
    fn integer_constant(&mut self, literal: &IntegerLiteral, location: SourceLocation) -> Expr {
        let text = literal.digits.as_str();
        let (radix, digits, base) = if let Some(hex) = text
            .strip_prefix("0x")
            .or_else(|| text.strip_prefix("0X"))
        {
            (16, hex, "hexadecimal")
        } else if text.len() > 1 && text.starts_with('0') {
            (8, &text[1..], "octal")
        } else {
            (10, text, "decimal")
        };

        let value = if let Some(bad) = digits.chars().find(|c| !c.is_digit(radix)) {
            self.error_at(location, format!("invalid digit '{}' in {} constant", bad, base));
            0
        } else {
            match u64::from_str_radix(digits, radix) {
                Ok(value) => value,
                Err(_) => {
                    self.error_at(location, "integer constant is too large for its type");
                    u64::MAX
                }
            }
        };

        let (is_unsigned, is_long) = match literal.suffix.as_str() {
            "" => (false, false),
            "u" | "U" => (true, false),
            "l" | "L" => (false, true),
            "ul" | "uL" | "Ul" | "UL" | "lu" | "lU" | "Lu" | "LU" => (true, true),
            _ => {
                self.error_at(location, "invalid suffix on integer constant");
                (literal.is_unsigned(), literal.is_long())
            }
        };

        Expr::IntegerConstant {
            value,
            is_unsigned,
            is_long,
            location,
        }
    }

    /// Parse `'` body `'`
    fn parse_char_constant(&mut self) -> Expr {
        let location = self.current_location();
        self.advance(); // opening apostrophe

        let (value, wide) = match self.current_kind() {
            TokenKind::CharConstant { value, wide } => (*value, *wide),
            _ => {
                self.error("empty character constant");
                (0, false)
            }
        };
        if matches!(self.current_kind(), TokenKind::CharConstant { .. }) {
            self.advance();
        }

        if !self.match_token(&TokenKind::Apostrophe) {
            self.error("missing terminating ' character");
        }

        Expr::CharConstant {
            value,
            wide,
            location,
        }
    }

    /// Parse one or more adjacent `"` body `"` groups into one literal
    fn parse_string_literal(&mut self) -> Expr {
        let location = self.current_location();
        let mut value = String::new();
        let mut wide = false;

        while self.match_token(&TokenKind::Quote) {
            if let TokenKind::StringLiteral { value: part, wide: part_wide } = self.current_kind() {
                value.push_str(part);
                wide |= *part_wide;
                self.advance();
            }

            if !self.match_token(&TokenKind::Quote) {
                self.error("missing terminating \" character");
                break;
            }
        }

        Expr::StringLiteral {
            value,
            wide,
            location,
        }
    }
}
