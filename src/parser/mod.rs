//! C source code front end
//!
//! This module transforms C source text into an Abstract Syntax Tree (AST):
//! - [`lexer`]: Tokenization (source text → tokens)
//! - [`parse`]: Parsing (tokens → AST, diagnostics, symbol table)
//! - [`ast`]: AST node definitions
//!
//! # Supported C Subset
//!
//! - Types: `int`, `char`, `void`, structs, unions, enums, pointers, arrays,
//!   function declarators (storage classes, qualifiers and the other
//!   arithmetic types are accepted with a warning)
//! - Statements: the full C89 statement set including `goto`, labels and `switch`
//! - Expressions: the C precedence cascade from assignment to primary, casts,
//!   `sizeof`
//! - No preprocessor: directive lines are skipped with a warning
//! - No typedef names, function pointers, conditional expressions or member access
//!
//! # Parser Implementation
//!
//! Hand-written recursive descent parser with one method per precedence level.
//! No external parser generator dependencies.

pub mod ast;
pub mod lexer;
pub mod parse;

mod declarations;
mod expressions;
mod statements;

pub use lexer::{tokenize, Token, TokenKind, TokenStream};
pub use parse::{
    parse_translation_unit, ExpressionOutput, ParseOptions, ParseOutput, Parser, MAX_NESTING_DEPTH,
};
