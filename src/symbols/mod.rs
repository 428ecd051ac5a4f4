//! Symbol table
//!
//! A stack of per-scope tables mirroring block nesting:
//! - [`SymbolTable`]: the scope stack, with the global scope at the bottom
//! - [`Symbol`]: one declared identifier
//! - [`SymbolKind`]: what sort of declarator introduced it
//!
//! # Scoping
//!
//! Scopes are entered and exited in strict LIFO order. Lookups walk from the
//! innermost scope outward, so an inner declaration shadows an outer one
//! until its scope is exited. The global scope is never exited.
//!
//! Only declaration parsing writes to the table.

pub mod table;

pub use table::{ScopeError, Symbol, SymbolKind, SymbolTable};
