//! Analysis error types

use despill_isa::{Address, IsaError, Register};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error("ISA error: {0}")]
    Isa(#[from] IsaError),

    // Graph construction
    #[error("Basic block at {address:#010x} has not been validated")]
    InvalidBlock { address: Address },

    #[error(
        "Basic block [{start:#010x}, {end:#010x}) overlaps existing block [{existing_start:#010x}, {existing_end:#010x})"
    )]
    OverlappingBlock {
        start: Address,
        end: u64,
        existing_start: Address,
        existing_end: u64,
    },

    // Missing state
    #[error("No basic block at {address:#010x}")]
    BlockNotFound { address: Address },

    #[error("Entry registry of block {address:#010x} has not been seeded")]
    UnseededEntry { address: Address },

    #[error("Exit registry of block {address:#010x} has not been computed")]
    MissingExit { address: Address },

    // Dataflow
    #[error("Unoccupied register {register} in operand {slot} at {address:#010x}")]
    UnoccupiedRegister {
        address: Address,
        slot: usize,
        register: Register,
    },

    #[error("Spill stack underflow at {address:#010x}")]
    SpillUnderflow { address: Address },
}

impl AnalysisError {
    /// Check if this error aborted a dataflow run mid-block
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            AnalysisError::UnoccupiedRegister { .. } | AnalysisError::SpillUnderflow { .. }
        )
    }

    /// Address the error refers to, if any
    pub fn address(&self) -> Option<Address> {
        match self {
            AnalysisError::Isa(_) => None,
            AnalysisError::InvalidBlock { address }
            | AnalysisError::BlockNotFound { address }
            | AnalysisError::UnseededEntry { address }
            | AnalysisError::MissingExit { address }
            | AnalysisError::UnoccupiedRegister { address, .. }
            | AnalysisError::SpillUnderflow { address } => Some(*address),
            AnalysisError::OverlappingBlock { start, .. } => Some(*start),
        }
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
