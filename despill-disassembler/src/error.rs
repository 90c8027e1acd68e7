//! Disassembler errors

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DisassemblerError {
    #[error("Unknown opcode: 0x{0:02X}")]
    UnknownOpcode(u8),

    #[error("Malformed instruction encoding: 0x{0:08X}")]
    MalformedInstruction(u32),

    #[error("Buffer too small: {required} bytes required, {provided} provided")]
    BufferTooSmall { required: usize, provided: usize },
}

pub type Result<T> = std::result::Result<T, DisassemblerError>;
