//! # Despill ISA
//!
//! Toy register instruction set used to exercise spill/fill ("de-spilling")
//! analysis.
//!
//! ## Key Features
//! - Unspecified-size GPR file (r0-r254), register byte 0xFF is the invalid sentinel
//! - Unlimited LIFO spill storage reached through `push`/`pop`
//! - Fixed 3-slot instructions stored as 4-byte records
//! - Opcode legality derived from slot occupancy on every decode
//! - 32-bit words with one reserved validity bit (31-bit value part)

pub mod word;
pub mod register;
pub mod opcode;
pub mod instruction;
pub mod block;
pub mod error;

pub use word::{Word, WORD_VALUE_BITS, WORD_VALUE_MASK};
pub use register::{Operand, Register};
pub use opcode::{Opcode, OperandRole};
pub use instruction::{Instruction, MAX_OPERAND_COUNT};
pub use block::BasicBlock;
pub use error::{IsaError, Result};

/// Address in a Von-Neumann machine (word granularity)
pub type Address = u32;
