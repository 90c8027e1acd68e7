//! # Error Types for the Despill ISA

use crate::Address;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IsaError {
    // Instruction errors
    #[error("Invalid register index: {0} (valid range: 0-254)")]
    InvalidRegister(u8),

    #[error("Operand index out of range: {0} (valid range: 0-2)")]
    OperandIndexOutOfRange(usize),

    // Basic block errors
    #[error("Empty basic block at {start:#010x}")]
    EmptyBlock { start: Address },

    #[error("Malformed instruction at index {index} of block {start:#010x}")]
    MalformedInstruction { start: Address, index: usize },

    #[error("Branch before end of block {start:#010x} at index {index}")]
    EarlyBranch { start: Address, index: usize },

    #[error("Block {start:#010x} with {len} instructions exceeds the address space")]
    AddressOverflow { start: Address, len: usize },

    #[error("Instruction index {index} out of range for block of {len} instructions")]
    InstructionIndexOutOfRange { index: usize, len: usize },
}

pub type Result<T> = std::result::Result<T, IsaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IsaError::OperandIndexOutOfRange(3);
        assert_eq!(err.to_string(), "Operand index out of range: 3 (valid range: 0-2)");

        let err = IsaError::EarlyBranch { start: 0x7000, index: 1 };
        assert_eq!(err.to_string(), "Branch before end of block 0x00007000 at index 1");

        let err = IsaError::EmptyBlock { start: 0x10 };
        assert_eq!(err.to_string(), "Empty basic block at 0x00000010");
    }
}
