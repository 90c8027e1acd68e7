//! Instruction decoder

use crate::error::{DisassemblerError, Result};
use despill_isa::{Instruction, Opcode};

/// Decode a 32-bit little-endian instruction record
///
/// Unlike [`Instruction::from_u32`], this rejects records whose opcode tag
/// is unknown or whose slot occupancy does not fit the opcode.
pub fn decode(word: u32) -> Result<Instruction> {
    let instr = Instruction::from_u32(word);
    let tag = instr.raw_opcode();
    if Opcode::from_u8(tag).is_none() {
        return Err(DisassemblerError::UnknownOpcode(tag));
    }
    if !instr.is_valid() {
        return Err(DisassemblerError::MalformedInstruction(word));
    }
    Ok(instr)
}
