//! Scope stack and symbol records

use crate::parser::ast::{NodeId, ScopeId, TypeSpecifierKind};
use rustc_hash::FxHashMap;
use std::fmt;
use thiserror::Error;

/// The declarator shape a symbol was introduced with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Variable,
    Pointer,
    Array,
    Function,
    FunctionDefinition,
    Parameter,
    /// struct, union or enum tag
    Tag,
    Enumerator,
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SymbolKind::Variable => "variable",
            SymbolKind::Pointer => "pointer",
            SymbolKind::Array => "array",
            SymbolKind::Function => "function",
            SymbolKind::FunctionDefinition => "function definition",
            SymbolKind::Parameter => "parameter",
            SymbolKind::Tag => "tag",
            SymbolKind::Enumerator => "enumerator",
        };
        f.write_str(name)
    }
}

/// A declared identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub kind: SymbolKind,
    pub declared_type: TypeSpecifierKind,
    pub scope_id: ScopeId,
    pub identifier: String,
    /// Handle of the declaration node that introduced the symbol. The table
    /// never owns AST nodes.
    pub params: Option<NodeId>,
}

/// Misuse of the scope stack
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ScopeError {
    #[error("cannot exit the global scope")]
    GlobalScope,
}

#[derive(Debug, Clone)]
struct Scope {
    id: ScopeId,
    /// In declaration order
    symbols: Vec<Symbol>,
    /// Name to indices into `symbols`
    by_name: FxHashMap<String, Vec<usize>>,
}

impl Scope {
    fn new(id: ScopeId) -> Self {
        Scope {
            id,
            symbols: Vec::new(),
            by_name: FxHashMap::default(),
        }
    }

    fn named<'a>(&'a self, identifier: &str) -> impl Iterator<Item = &'a Symbol> + 'a {
        self.by_name
            .get(identifier)
            .into_iter()
            .flatten()
            .map(move |&i| &self.symbols[i])
    }
}

/// Stack of scopes, innermost last
#[derive(Debug, Clone)]
pub struct SymbolTable {
    scopes: Vec<Scope>,
    next_id: ScopeId,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    pub const GLOBAL_SCOPE: ScopeId = 0;

    /// Create a table holding only the global scope.
    pub fn new() -> Self {
        SymbolTable {
            scopes: vec![Scope::new(Self::GLOBAL_SCOPE)],
            next_id: Self::GLOBAL_SCOPE + 1,
        }
    }

    /// Push a new innermost scope and return its id. Ids are never reused
    /// within one table.
    pub fn enter_scope(&mut self) -> ScopeId {
        let id = self.next_id;
        self.next_id += 1;
        self.scopes.push(Scope::new(id));
        log::debug!("entering scope {} (depth {})", id, self.scopes.len());
        id
    }

    /// Pop the innermost scope, dropping its symbols.
    pub fn exit_scope(&mut self) -> Result<ScopeId, ScopeError> {
        if self.scopes.len() <= 1 {
            return Err(ScopeError::GlobalScope);
        }
        let scope = self.scopes.pop().ok_or(ScopeError::GlobalScope)?;
        log::debug!(
            "exiting scope {} with {} symbol(s)",
            scope.id,
            scope.symbols.len()
        );
        Ok(scope.id)
    }

    /// Append a symbol to the current scope. Redeclarations are not checked.
    pub fn add_symbol(
        &mut self,
        kind: SymbolKind,
        declared_type: TypeSpecifierKind,
        identifier: impl Into<String>,
        params: Option<NodeId>,
    ) -> &Symbol {
        let identifier = identifier.into();
        let scope = self.current_mut();
        log::debug!(
            "scope {}: add {} '{}' of type {}",
            scope.id,
            kind,
            identifier,
            declared_type
        );

        let index = scope.symbols.len();
        scope
            .by_name
            .entry(identifier.clone())
            .or_default()
            .push(index);
        scope.symbols.push(Symbol {
            kind,
            declared_type,
            scope_id: scope.id,
            identifier,
            params,
        });
        &scope.symbols[index]
    }

    /// Find the innermost symbol with this name, kind and declared type.
    pub fn get_symbol(
        &self,
        kind: SymbolKind,
        declared_type: TypeSpecifierKind,
        identifier: &str,
    ) -> Option<&Symbol> {
        self.scopes.iter().rev().find_map(|scope| {
            scope
                .named(identifier)
                .find(|sym| sym.kind == kind && sym.declared_type == declared_type)
        })
    }

    /// Find the innermost symbol with this name, whatever its kind.
    pub fn lookup(&self, identifier: &str) -> Option<&Symbol> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.named(identifier).next())
    }

    pub fn current_scope_id(&self) -> ScopeId {
        self.current().id
    }

    /// Number of scopes on the stack, counting the global scope.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_global(&self) -> bool {
        self.scopes.len() == 1
    }

    pub fn symbols_in_current_scope(&self) -> &[Symbol] {
        &self.current().symbols
    }

    pub fn global_symbols(&self) -> &[Symbol] {
        &self.scopes[0].symbols
    }

    /// Human-readable listing of every live scope, outermost first.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        for scope in &self.scopes {
            out.push_str(&format!("Scope: {}\n", scope.id));
            for sym in &scope.symbols {
                out.push_str(&format!(
                    "  {:<10} {:<20} {}\n",
                    sym.declared_type.to_string(),
                    sym.identifier,
                    sym.kind
                ));
            }
        }
        out
    }

    fn current(&self) -> &Scope {
        // The global scope is never popped
        &self.scopes[self.scopes.len() - 1]
    }

    fn current_mut(&mut self) -> &mut Scope {
        let last = self.scopes.len() - 1;
        &mut self.scopes[last]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_in_global_scope() {
        let table = SymbolTable::new();
        assert_eq!(table.current_scope_id(), SymbolTable::GLOBAL_SCOPE);
        assert_eq!(table.depth(), 1);
        assert!(table.is_global());
    }

    #[test]
    fn test_inner_symbol_shadows_outer() {
        let mut table = SymbolTable::new();
        table.add_symbol(SymbolKind::Variable, TypeSpecifierKind::Int, "x", Some(1));

        let inner_scope = table.enter_scope();
        table.add_symbol(SymbolKind::Variable, TypeSpecifierKind::Int, "x", Some(2));

        let found = table
            .get_symbol(SymbolKind::Variable, TypeSpecifierKind::Int, "x")
            .expect("x should resolve");
        assert_eq!(found.scope_id, inner_scope);
        assert_eq!(found.params, Some(2));

        table.exit_scope().expect("nested scope should exit");
        let found = table
            .get_symbol(SymbolKind::Variable, TypeSpecifierKind::Int, "x")
            .expect("x should resolve");
        assert_eq!(found.scope_id, SymbolTable::GLOBAL_SCOPE);
        assert_eq!(found.params, Some(1));
    }

    #[test]
    fn test_lookup_matches_kind_and_type() {
        let mut table = SymbolTable::new();
        table.add_symbol(SymbolKind::Function, TypeSpecifierKind::Int, "f", None);
        table.enter_scope();
        table.add_symbol(SymbolKind::Variable, TypeSpecifierKind::Char, "f", None);

        let func = table
            .get_symbol(SymbolKind::Function, TypeSpecifierKind::Int, "f")
            .expect("function should be visible from nested scope");
        assert_eq!(func.scope_id, 0);
        assert!(table
            .get_symbol(SymbolKind::Variable, TypeSpecifierKind::Int, "f")
            .is_none());
        assert_eq!(
            table.lookup("f").map(|s| s.declared_type),
            Some(TypeSpecifierKind::Char)
        );
        assert!(table.lookup("g").is_none());
    }

    #[test]
    fn test_exit_global_scope_is_error() {
        let mut table = SymbolTable::new();
        table.add_symbol(SymbolKind::Variable, TypeSpecifierKind::Int, "x", None);

        assert_eq!(table.exit_scope(), Err(ScopeError::GlobalScope));
        assert_eq!(table.depth(), 1);
        assert_eq!(table.global_symbols().len(), 1);
        assert_eq!(
            ScopeError::GlobalScope.to_string(),
            "cannot exit the global scope"
        );
    }

    #[test]
    fn test_scope_ids_increase_and_are_not_reused() {
        let mut table = SymbolTable::new();
        let first = table.enter_scope();
        assert_eq!(table.exit_scope(), Ok(first));
        let second = table.enter_scope();
        let third = table.enter_scope();
        assert!(first < second && second < third);
        assert_eq!(table.depth(), 3);
    }

    #[test]
    fn test_exit_drops_symbols() {
        let mut table = SymbolTable::new();
        table.enter_scope();
        table.add_symbol(SymbolKind::Array, TypeSpecifierKind::Int, "buf", None);
        assert_eq!(table.symbols_in_current_scope().len(), 1);
        table.exit_scope().expect("nested scope should exit");
        assert!(table.lookup("buf").is_none());
    }

    #[test]
    fn test_redeclaration_is_appended() {
        let mut table = SymbolTable::new();
        table.add_symbol(SymbolKind::Variable, TypeSpecifierKind::Int, "x", Some(1));
        table.add_symbol(SymbolKind::Variable, TypeSpecifierKind::Int, "x", Some(2));
        assert_eq!(table.global_symbols().len(), 2);
        // First in declaration order wins within one scope
        assert_eq!(table.lookup("x").and_then(|s| s.params), Some(1));
    }

    #[test]
    fn test_dump_lists_scopes() {
        let mut table = SymbolTable::new();
        table.add_symbol(SymbolKind::FunctionDefinition, TypeSpecifierKind::Int, "main", None);
        table.enter_scope();
        table.add_symbol(SymbolKind::Pointer, TypeSpecifierKind::Char, "s", None);
        let dump = table.dump();
        assert!(dump.starts_with("Scope: 0\n"));
        assert!(dump.contains("main"));
        assert!(dump.contains("Scope: 1\n"));
        assert!(dump.contains("pointer"));
    }
}
