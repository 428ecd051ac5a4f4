//! Expression code generation sketches
//!
//! Two small consumers of finished expression trees:
//! - [`RegisterAllocator`]: walks an expression and emits register-machine
//!   instructions (`mov`, `add`, `sub`, `mul`, `and`, `orr`) over six
//!   registers, without spilling
//! - [`TripleList`]: lowers an expression into numbered three-address
//!   triples
//!
//! Neither performs type checking; both reject constructs they cannot lower
//! with a [`CodegenError`].

pub mod registers;
pub mod triples;

pub use registers::{Reg, RegisterAllocator, REG_COUNT};
pub use triples::{Operand, Triple, TripleId, TripleList, TripleOp};

use thiserror::Error;

/// Failure to lower an expression
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodegenError {
    /// Every register is live; spilling is not implemented
    #[error("no free registers available")]
    OutOfRegisters,

    #[error("cannot generate code for {0}")]
    Unsupported(String),
}

pub type Result<T> = std::result::Result<T, CodegenError>;
