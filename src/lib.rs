//! # Introduction
//!
//! ccfront is the front end of a small C compiler: it turns C source text into
//! an abstract syntax tree annotated with scope information, collecting
//! diagnostics instead of stopping at the first problem.
//!
//! ## Pipeline
//!
//! ```text
//! Source → Lexer → TokenStream → Parser (+ SymbolTable) → AST + Diagnostics
//!                                                            ↓
//!                                             printer / codegen consumers
//! ```
//!
//! 1. [`parser::lexer`]: maximal-munch tokenizer producing a
//!    [`parser::TokenStream`] with bounded lookahead.
//! 2. [`parser`]: recursive descent over declarations, statements and the
//!    expression precedence cascade.
//! 3. [`symbols`]: the scope stack consulted and filled while parsing
//!    declarations.
//! 4. [`diagnostics`]: errors and warnings with source locations, and the
//!    "had error" flag.
//! 5. [`printer`] and [`codegen`]: consumers of the finished tree (an
//!    indented tree dump, declarations explained in English, and a
//!    register-allocating expression emitter).
//!
//! ## Example
//!
//! ```
//! let output = ccfront::parse_translation_unit(ccfront::tokenize("int main(void) { return 0; }"));
//! assert!(!output.has_errors());
//! assert_eq!(output.unit.nodes.len(), 1);
//! ```

pub mod codegen;
pub mod diagnostics;
pub mod parser;
pub mod printer;
pub mod symbols;

pub use parser::{parse_translation_unit, tokenize};
