//! Three-address code as a list of numbered triples
//!
//! A triple `(id, op, arg1, arg2)` refers to its operands either directly
//! (constants and names) or by the id of an earlier triple. Ids follow
//! insertion order starting at zero.

use super::{CodegenError, Result};
use crate::parser::ast::{AssignOp, BinOp, Expr, UnaryOp};
use std::fmt;

pub type TripleId = usize;

/// Operand of a triple
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Constant(u64),
    Name(String),
    /// Result of an earlier triple
    Triple(TripleId),
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Constant(value) => write!(f, "{}", value),
            Operand::Name(name) => f.write_str(name),
            Operand::Triple(id) => write!(f, "({})", id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TripleOp {
    Binary(BinOp),
    Unary(UnaryOp),
    Assign(AssignOp),
}

impl fmt::Display for TripleOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            TripleOp::Binary(op) => op.symbol(),
            TripleOp::Unary(op) => op.symbol(),
            TripleOp::Assign(op) => op.symbol(),
        };
        f.write_str(symbol)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Triple {
    pub id: TripleId,
    pub op: TripleOp,
    pub arg1: Operand,
    pub arg2: Option<Operand>,
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}) {} {}", self.id, self.op, self.arg1)?;
        if let Some(arg2) = &self.arg2 {
            write!(f, ", {}", arg2)?;
        }
        Ok(())
    }
}

/// Append-only list of triples
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TripleList {
    triples: Vec<Triple>,
}

impl TripleList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lower an expression tree. The last triple, if any, computes the
    /// value of the whole expression.
    pub fn from_expression(expr: &Expr) -> Result<Self> {
        let mut list = Self::new();
        list.lower(expr)?;
        Ok(list)
    }

    /// Append a triple and return its id.
    pub fn push(&mut self, op: TripleOp, arg1: Operand, arg2: Option<Operand>) -> TripleId {
        let id = self.triples.len();
        self.triples.push(Triple {
            id,
            op,
            arg1,
            arg2,
        });
        id
    }

    pub fn get(&self, id: TripleId) -> Option<&Triple> {
        self.triples.get(id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Triple> {
        self.triples.iter()
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    /// Append triples for `expr` and return the operand holding its value
    pub fn lower(&mut self, expr: &Expr) -> Result<Operand> {
        let operand = match expr {
            Expr::IntegerConstant { value, .. } => Operand::Constant(*value),
            Expr::CharConstant { value, .. } => Operand::Constant(u64::from(*value)),
            Expr::Identifier { name, .. } => Operand::Name(name.clone()),
            Expr::Binary {
                op, left, right, ..
            } => {
                let lhs = self.lower(left)?;
                let rhs = self.lower(right)?;
                Operand::Triple(self.push(TripleOp::Binary(*op), lhs, Some(rhs)))
            }
            Expr::Unary { op, operand, .. } => {
                let arg = self.lower(operand)?;
                Operand::Triple(self.push(TripleOp::Unary(*op), arg, None))
            }
            Expr::Assignment { op, lhs, rhs, .. } => {
                let Expr::Identifier { name, .. } = lhs.as_ref() else {
                    return Err(CodegenError::Unsupported(format!(
                        "assignment target at {}",
                        lhs.location()
                    )));
                };
                let value = self.lower(rhs)?;
                Operand::Triple(self.push(
                    TripleOp::Assign(*op),
                    Operand::Name(name.clone()),
                    Some(value),
                ))
            }
            other => {
                return Err(CodegenError::Unsupported(format!(
                    "expression at {}",
                    other.location()
                )))
            }
        };
        Ok(operand)
    }
}

impl fmt::Display for TripleList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for triple in &self.triples {
            writeln!(f, "{}", triple)?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a TripleList {
    type Item = &'a Triple;
    type IntoIter = std::slice::Iter<'a, Triple>;

    fn into_iter(self) -> Self::IntoIter {
        self.triples.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;
    use similar_asserts::assert_eq;

    fn lower(source: &str) -> Result<TripleList> {
        let output = Parser::from_source(source).parse_expression_unit();
        TripleList::from_expression(&output.expr.expect("expression"))
    }

    #[test]
    fn test_ids_follow_insertion_order() {
        let mut list = TripleList::new();
        let first = list.push(TripleOp::Unary(UnaryOp::Neg), Operand::Constant(1), None);
        let second = list.push(
            TripleOp::Binary(BinOp::Add),
            Operand::Triple(first),
            Some(Operand::Name("x".to_string())),
        );
        assert_eq!((first, second), (0, 1));
        assert_eq!(list.get(1).map(|t| t.id), Some(1));
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_lower_assignment_of_expression() {
        let list = lower("a = b * 2 + -c").expect("lowering");
        assert_eq!(
            list.to_string(),
            "(0) * b, 2\n(1) - c\n(2) + (0), (1)\n(3) = a, (2)\n"
        );
    }

    #[test]
    fn test_constant_produces_no_triples() {
        let list = lower("7").expect("lowering");
        assert!(list.is_empty());
    }

    #[test]
    fn test_unsupported_nodes() {
        assert!(matches!(lower("f(1)"), Err(CodegenError::Unsupported(_))));
        assert!(matches!(lower("*p = 1"), Err(CodegenError::Unsupported(_))));
    }
}
