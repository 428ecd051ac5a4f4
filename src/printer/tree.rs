//! Indented tree dump
//!
//! Each node prints as `|- LABEL` indented two spaces per level; values that
//! belong to a node (names, constants, type keywords) follow it as
//! `` `- value`` lines shifted one column further in.

use crate::parser::ast::*;
use std::fmt::Write;

/// Dump every top-level node of `unit`
pub fn print_unit(unit: &TranslationUnit) -> String {
    let mut printer = TreePrinter::default();
    for node in &unit.nodes {
        printer.ast_node(node, 0);
    }
    printer.out
}

pub fn print_node(node: &AstNode) -> String {
    let mut printer = TreePrinter::default();
    printer.ast_node(node, 0);
    printer.out
}

pub fn print_expr(expr: &Expr) -> String {
    let mut printer = TreePrinter::default();
    printer.expr(expr, 0);
    printer.out
}

#[derive(Default)]
struct TreePrinter {
    out: String,
}

impl TreePrinter {
    fn node(&mut self, indent: usize, label: impl AsRef<str>) {
        let _ = writeln!(self.out, "{:width$}|- {}", "", label.as_ref(), width = indent * 2);
    }

    fn leaf(&mut self, indent: usize, value: impl std::fmt::Display) {
        let _ = writeln!(self.out, "{:width$}`- {}", "", value, width = indent * 2 + 1);
    }

    fn ast_node(&mut self, node: &AstNode, indent: usize) {
        match node {
            AstNode::Declaration(decl) => self.declaration(decl, indent),
            AstNode::FunctionDefinition(def) => self.function_definition(def, indent),
            AstNode::Statement(stmt) => self.stmt(stmt, indent),
        }
    }

    fn function_definition(&mut self, def: &FunctionDefinition, indent: usize) {
        self.node(indent, "FUNC_DEF");
        self.specifier(&def.specifier, indent);
        self.declarator(&def.declarator, indent + 1);
        self.stmt(&def.body, indent + 1);
    }

    fn declaration(&mut self, decl: &Declaration, indent: usize) {
        self.node(indent, "DECLARATION");
        self.specifier(&decl.specifier, indent);
        if let Some(declarator) = &decl.declarator {
            self.declarator(declarator, indent + 1);
        }
        if let Some(width) = &decl.bit_width {
            self.node(indent + 1, "BIT_WIDTH");
            self.expr(width, indent + 2);
        }
        if let Some(init) = &decl.initializer {
            self.initializer(init, indent + 1);
        }
    }

    /// A specifier is a leaf of its owner unless it carries a body
    fn specifier(&mut self, specifier: &DeclSpecifier, indent: usize) {
        match specifier {
            DeclSpecifier::Basic { kind, .. } => self.leaf(indent, kind),
            DeclSpecifier::StructOrUnion {
                kind,
                tag,
                members,
                ..
            } => {
                let label = match tag {
                    Some(tag) => format!("{} {}", kind, tag),
                    None => kind.to_string(),
                };
                match members {
                    None => self.leaf(indent, label),
                    Some(members) => {
                        self.node(
                            indent + 1,
                            format!("{}_SPECIFIER", kind.to_string().to_uppercase()),
                        );
                        self.leaf(indent + 1, label);
                        for member in members {
                            self.declaration(member, indent + 2);
                        }
                    }
                }
            }
            DeclSpecifier::Enum {
                tag, enumerators, ..
            } => {
                let label = match tag {
                    Some(tag) => format!("enum {}", tag),
                    None => "enum".to_string(),
                };
                match enumerators {
                    None => self.leaf(indent, label),
                    Some(enumerators) => {
                        self.node(indent + 1, "ENUM_SPECIFIER");
                        self.leaf(indent + 1, label);
                        for enumerator in enumerators {
                            self.node(indent + 2, "ENUMERATOR");
                            self.leaf(indent + 2, &enumerator.name);
                            if let Some(value) = &enumerator.value {
                                self.expr(value, indent + 3);
                            }
                        }
                    }
                }
            }
        }
    }

    fn declarator(&mut self, declarator: &Declarator, indent: usize) {
        match declarator {
            Declarator::Identifier { name, .. } => {
                self.node(indent, "IDENTIFIER");
                self.leaf(indent, name);
            }
            Declarator::Pointer { inner, .. } => {
                self.node(indent, "POINTER");
                if let Some(inner) = inner {
                    self.declarator(inner, indent + 1);
                }
            }
            Declarator::Array { inner, size, .. } => {
                self.node(indent, "ARRAY_DECL");
                if let Some(inner) = inner {
                    self.declarator(inner, indent + 1);
                }
                if let Some(size) = size {
                    self.expr(size, indent + 1);
                }
            }
            Declarator::Function {
                inner,
                params,
                variadic,
                ..
            } => {
                self.node(indent, "FUNC_DECL");
                if let Some(inner) = inner {
                    self.declarator(inner, indent + 1);
                }
                for param in params {
                    self.abstract_declaration("PARAMETER", param, indent + 1);
                }
                if *variadic {
                    self.leaf(indent, "...");
                }
            }
        }
    }

    fn abstract_declaration(&mut self, label: &str, decl: &AbstractDeclaration, indent: usize) {
        self.node(indent, label);
        self.specifier(&decl.specifier, indent);
        if let Some(declarator) = &decl.declarator {
            self.declarator(declarator, indent + 1);
        }
    }

    fn initializer(&mut self, init: &Initializer, indent: usize) {
        match init {
            Initializer::Expr(expr) => self.expr(expr, indent),
            Initializer::List { items, .. } => {
                self.node(indent, "INITIALIZER_LIST");
                for item in items {
                    self.initializer(item, indent + 1);
                }
            }
        }
    }

    fn stmt(&mut self, stmt: &Stmt, indent: usize) {
        match stmt {
            Stmt::Compound { items, .. } => {
                self.node(indent, "COMPOUND_STMT");
                for item in items {
                    self.ast_node(item, indent + 1);
                }
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
                ..
            } => {
                let label = if else_branch.is_some() {
                    "IF_ELSE_STMT"
                } else {
                    "IF_STMT"
                };
                self.node(indent, label);
                self.expr(condition, indent + 1);
                self.stmt(then_branch, indent + 1);
                if let Some(else_branch) = else_branch {
                    self.stmt(else_branch, indent + 1);
                }
            }
            Stmt::Switch { expr, body, .. } => {
                self.node(indent, "SWITCH_STMT");
                self.expr(expr, indent + 1);
                self.stmt(body, indent + 1);
            }
            Stmt::While {
                condition, body, ..
            } => {
                self.node(indent, "WHILE_STMT");
                self.expr(condition, indent + 1);
                self.stmt(body, indent + 1);
            }
            Stmt::DoWhile {
                body, condition, ..
            } => {
                self.node(indent, "DO_STMT");
                self.stmt(body, indent + 1);
                self.expr(condition, indent + 1);
            }
            Stmt::For {
                init,
                condition,
                step,
                body,
                ..
            } => {
                self.node(indent, "FOR_STMT");
                for clause in [init, condition, step] {
                    match clause {
                        Some(expr) => self.expr(expr, indent + 1),
                        None => self.leaf(indent, "empty"),
                    }
                }
                self.stmt(body, indent + 1);
            }
            Stmt::Goto { label, .. } => {
                self.node(indent, "GOTO_STMT");
                self.leaf(indent, label);
            }
            Stmt::Continue { .. } => self.node(indent, "CONTINUE_STMT"),
            Stmt::Break { .. } => self.node(indent, "BREAK_STMT"),
            Stmt::Return { expr, .. } => {
                self.node(indent, "RETURN_STMT");
                if let Some(expr) = expr {
                    self.expr(expr, indent + 1);
                }
            }
            Stmt::Label { name, body, .. } => {
                self.node(indent, "LABEL_STMT");
                self.leaf(indent, name);
                if let Some(body) = body {
                    self.stmt(body, indent + 1);
                }
            }
            Stmt::Case { value, body, .. } => {
                self.node(indent, "CASE_STMT");
                self.expr(value, indent + 1);
                if let Some(body) = body {
                    self.stmt(body, indent + 1);
                }
            }
            Stmt::Default { body, .. } => {
                self.node(indent, "DEFAULT_STMT");
                if let Some(body) = body {
                    self.stmt(body, indent + 1);
                }
            }
            Stmt::Expression { expr: None, .. } => self.node(indent, "NULL_STMT"),
            Stmt::Expression {
                expr: Some(expr), ..
            } => {
                self.node(indent, "EXPRESSION_STMT");
                self.expr(expr, indent + 1);
            }
        }
    }

    fn expr(&mut self, expr: &Expr, indent: usize) {
        match expr {
            Expr::IntegerConstant {
                value,
                is_unsigned,
                is_long,
                ..
            } => {
                self.node(indent, "INTEGER_CONSTANT");
                let suffix = match (is_unsigned, is_long) {
                    (true, true) => "ul",
                    (true, false) => "u",
                    (false, true) => "l",
                    (false, false) => "",
                };
                self.leaf(indent, format!("{}{}", value, suffix));
            }
            Expr::CharConstant { value, .. } => {
                self.node(indent, "CHAR_CONSTANT");
                self.leaf(indent, value);
            }
            Expr::StringLiteral { value, wide, .. } => {
                self.node(indent, "STRING_LITERAL");
                let prefix = if *wide { "L" } else { "" };
                self.leaf(indent, format!("{}\"{}\"", prefix, value.escape_default()));
            }
            Expr::Identifier { name, .. } => {
                self.node(indent, "IDENTIFIER");
                self.leaf(indent, name);
            }
            Expr::Assignment { op, lhs, rhs, .. } => {
                self.node(indent, format!("ASSIGNMENT_EXPR {}", op.symbol()));
                self.expr(lhs, indent + 1);
                self.expr(rhs, indent + 1);
            }
            Expr::Binary {
                op, left, right, ..
            } => {
                self.node(indent, format!("BINARY_EXPR {}", op.symbol()));
                self.expr(left, indent + 1);
                self.expr(right, indent + 1);
            }
            Expr::Unary { op, operand, .. } => {
                self.node(indent, format!("UNARY_EXPR {}", op.symbol()));
                self.expr(operand, indent + 1);
            }
            Expr::Postfix { op, operand, .. } => {
                self.node(indent, format!("POSTFIX_EXPR {}", op.symbol()));
                self.expr(operand, indent + 1);
            }
            Expr::ArrayAccess { array, index, .. } => {
                self.node(indent, "ARRAY_ACCESS");
                self.expr(array, indent + 1);
                self.expr(index, indent + 1);
            }
            Expr::Call { callee, args, .. } => {
                self.node(indent, "FUNCTION_CALL");
                self.expr(callee, indent + 1);
                for arg in args {
                    self.expr(arg, indent + 1);
                }
            }
            Expr::Cast {
                type_name, expr, ..
            } => {
                self.node(indent, "CAST_EXPR");
                self.abstract_declaration("TYPE_NAME", type_name, indent + 1);
                self.expr(expr, indent + 1);
            }
            Expr::SizeofExpr { expr, .. } => {
                self.node(indent, "SIZEOF_EXPR");
                self.expr(expr, indent + 1);
            }
            Expr::SizeofType { type_name, .. } => {
                self.node(indent, "SIZEOF_TYPE");
                self.abstract_declaration("TYPE_NAME", type_name, indent + 1);
            }
            Expr::Error { .. } => self.node(indent, "ERROR"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;
    use similar_asserts::assert_eq;

    fn dump(source: &str) -> String {
        let output = Parser::from_source(source).parse_translation_unit();
        assert!(!output.has_errors(), "{:?}", output.diagnostics);
        print_unit(&output.unit)
    }

    #[test]
    fn test_declaration_with_initializer() {
        let expected = "\
|- DECLARATION
 `- int
  |- IDENTIFIER
   `- x
  |- BINARY_EXPR +
    |- INTEGER_CONSTANT
     `- 1
    |- INTEGER_CONSTANT
     `- 2
";
        assert_eq!(dump("int x = 1 + 2;"), expected);
    }

    #[test]
    fn test_function_definition() {
        let expected = "\
|- FUNC_DEF
 `- int
  |- FUNC_DECL
    |- IDENTIFIER
     `- main
  |- COMPOUND_STMT
    |- RETURN_STMT
      |- INTEGER_CONSTANT
       `- 0
";
        assert_eq!(dump("int main(void) { return 0; }"), expected);
    }

    #[test]
    fn test_type_ordered_declarator() {
        let expected = "\
|- DECLARATION
 `- char
  |- ARRAY_DECL
    |- POINTER
      |- IDENTIFIER
       `- argv
    |- INTEGER_CONSTANT
     `- 4
";
        assert_eq!(dump("char *argv[4];"), expected);
    }

    #[test]
    fn test_expression_dump() {
        let output = Parser::from_source("(char)c++").parse_expression_unit();
        let expected = "\
|- CAST_EXPR
  |- TYPE_NAME
   `- char
  |- POSTFIX_EXPR ++
    |- IDENTIFIER
     `- c
";
        assert_eq!(print_expr(&output.expr.expect("expression")), expected);
    }
}
