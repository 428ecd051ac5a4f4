//! Register allocation and instruction emission for expressions

use super::{CodegenError, Result};
use crate::parser::ast::{BinOp, Expr};
use std::fmt;

/// Size of the register file
pub const REG_COUNT: usize = 6;

/// A machine register, `r0` through `r5`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Reg(u8);

impl Reg {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

/// Tracks which registers hold live values and collects the emitted
/// instructions, one per line
#[derive(Debug, Clone, Default)]
pub struct RegisterAllocator {
    in_use: [bool; REG_COUNT],
    instructions: Vec<String>,
}

impl RegisterAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve the lowest-numbered free register
    pub fn allocate(&mut self) -> Result<Reg> {
        let index = self
            .in_use
            .iter()
            .position(|used| !used)
            .ok_or(CodegenError::OutOfRegisters)?;
        self.in_use[index] = true;
        Ok(Reg(index as u8))
    }

    pub fn free(&mut self, reg: Reg) {
        self.in_use[reg.index()] = false;
    }

    pub fn live_count(&self) -> usize {
        self.in_use.iter().filter(|used| **used).count()
    }

    /// Emit code computing `expr` and return the register holding the result.
    ///
    /// Constants are loaded with `mov`; a binary node evaluates its left
    /// operand into the destination register, its right operand into a
    /// scratch register that is released after the combining instruction.
    pub fn gen_expression(&mut self, expr: &Expr) -> Result<Reg> {
        match expr {
            Expr::IntegerConstant { value, .. } => self.load(*value),
            Expr::CharConstant { value, .. } => self.load(u64::from(*value)),
            Expr::Binary {
                op, left, right, ..
            } => {
                let mnemonic = mnemonic(*op).ok_or_else(|| {
                    CodegenError::Unsupported(format!("operator '{}'", op.symbol()))
                })?;

                let rd = self.gen_expression(left)?;
                let rr = match self.gen_expression(right) {
                    Ok(rr) => rr,
                    Err(err) => {
                        self.free(rd);
                        return Err(err);
                    }
                };
                self.free(rr);
                self.emit(format!("{} {}, {}, {}", mnemonic, rd, rd, rr));
                Ok(rd)
            }
            other => Err(CodegenError::Unsupported(format!(
                "expression at {}",
                other.location()
            ))),
        }
    }

    pub fn instructions(&self) -> &[String] {
        &self.instructions
    }

    /// Emitted program text
    pub fn listing(&self) -> String {
        let mut out = String::new();
        for line in &self.instructions {
            out.push_str(line);
            out.push('\n');
        }
        out
    }

    fn load(&mut self, value: u64) -> Result<Reg> {
        let rd = self.allocate()?;
        self.emit(format!("mov {}, {}", rd, value));
        Ok(rd)
    }

    fn emit(&mut self, instruction: String) {
        log::trace!("emit: {}", instruction);
        self.instructions.push(instruction);
    }
}

fn mnemonic(op: BinOp) -> Option<&'static str> {
    match op {
        BinOp::Add => Some("add"),
        BinOp::Sub => Some("sub"),
        BinOp::Mul => Some("mul"),
        BinOp::BitAnd => Some("and"),
        BinOp::BitOr => Some("orr"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    fn expr(source: &str) -> Expr {
        let output = Parser::from_source(source).parse_expression_unit();
        assert!(!output.diagnostics.has_errors(), "{:?}", output.diagnostics);
        output.expr.expect("expression")
    }

    #[test]
    fn test_constant_is_moved_into_first_register() {
        let mut alloc = RegisterAllocator::new();
        let reg = alloc.gen_expression(&expr("42")).expect("codegen");
        assert_eq!(reg.to_string(), "r0");
        assert_eq!(alloc.instructions(), ["mov r0, 42"]);
    }

    #[test]
    fn test_binary_frees_right_register() {
        let mut alloc = RegisterAllocator::new();
        let reg = alloc.gen_expression(&expr("1 + 2 * 3")).expect("codegen");
        assert_eq!(reg, Reg(0));
        assert_eq!(
            alloc.instructions(),
            [
                "mov r0, 1",
                "mov r1, 2",
                "mov r2, 3",
                "mul r1, r1, r2",
                "add r0, r0, r1",
            ]
        );
        assert_eq!(alloc.live_count(), 1);
    }

    #[test]
    fn test_bitwise_mnemonics() {
        let mut alloc = RegisterAllocator::new();
        alloc.gen_expression(&expr("(6 & 3) | 8")).expect("codegen");
        let listing = alloc.listing();
        assert!(listing.contains("and r0, r0, r1\n"));
        assert!(listing.ends_with("orr r0, r0, r1\n"));
    }

    #[test]
    fn test_register_exhaustion() {
        // Right-nested sums keep every left operand live
        let mut alloc = RegisterAllocator::new();
        let result = alloc.gen_expression(&expr("1 + (2 + (3 + (4 + (5 + (6 + 7)))))"));
        assert_eq!(result, Err(CodegenError::OutOfRegisters));
        assert_eq!(alloc.live_count(), 0);
    }

    #[test]
    fn test_unsupported_operator_and_node() {
        let mut alloc = RegisterAllocator::new();
        assert_eq!(
            alloc.gen_expression(&expr("4 / 2")),
            Err(CodegenError::Unsupported("operator '/'".to_string()))
        );
        assert!(matches!(
            alloc.gen_expression(&expr("x")),
            Err(CodegenError::Unsupported(_))
        ));
    }
}
