//! Instruction formatting to assembly text
//!
//! Layout: mnemonic, a tab, then operands as 4 hex digits separated by
//! `", "`. `li` prints its destination followed by the sign-extended
//! immediate as `0x` and 8 hex digits. Instructions that do not decode print
//! as `invalid`.
//!
//! Rendering into a caller buffer is a two-call protocol: ask
//! [`required_len`] for the size, then [`render_into`] a buffer at least
//! that large.

use crate::error::{DisassemblerError, Result};
use despill_isa::{Instruction, Opcode};
use std::fmt::{self, Write};

/// Width of one register operand
const OPERAND_LEN: usize = "0000".len();
/// Separator between operands
const SEPARATOR_LEN: usize = ", ".len();
/// Width of the `li` immediate
const IMM_LEN: usize = "0x00000000".len();

/// Register operands printed for the opcode, and whether an immediate follows
fn layout(op: Opcode) -> (usize, bool) {
    match op {
        Opcode::Nop => (0, false),
        Opcode::Li => (1, true),
        Opcode::Push | Opcode::Pop | Opcode::Br => (1, false),
        Opcode::Op2 => (2, false),
        Opcode::Cbr | Opcode::Op3 => (3, false),
    }
}

/// Number of bytes [`render_into`] will write for the instruction
pub fn required_len(instr: &Instruction) -> usize {
    let Some(op) = instr.opcode() else {
        return "invalid".len();
    };
    let (operands, imm) = layout(op);

    let mut len = op.mnemonic().len();
    if operands > 0 {
        len += 1 + operands * OPERAND_LEN + (operands - 1) * SEPARATOR_LEN;
    }
    if imm {
        len += SEPARATOR_LEN + IMM_LEN;
    }
    len
}

/// Render the instruction into `buffer`, returning the number of bytes written
pub fn render_into(instr: &Instruction, buffer: &mut [u8]) -> Result<usize> {
    let required = required_len(instr);
    if buffer.len() < required {
        return Err(DisassemblerError::BufferTooSmall {
            required,
            provided: buffer.len(),
        });
    }

    let mut cursor = Cursor { buf: buffer, pos: 0 };
    // cannot fail: the buffer holds at least `required` bytes
    write_instr(&mut cursor, instr).map_err(|_| DisassemblerError::BufferTooSmall {
        required,
        provided: cursor.buf.len(),
    })?;
    Ok(cursor.pos)
}

/// Format instruction as assembly text
pub fn format(instr: &Instruction) -> String {
    let mut out = String::with_capacity(required_len(instr));
    // writing into a String never fails
    let _ = write_instr(&mut out, instr);
    out
}

fn write_instr<W: Write>(out: &mut W, instr: &Instruction) -> fmt::Result {
    let Some(op) = instr.opcode() else {
        return out.write_str("invalid");
    };
    let (operands, imm) = layout(op);

    out.write_str(op.mnemonic())?;
    for (i, slot) in instr.operands().iter().take(operands).enumerate() {
        out.write_str(if i == 0 { "\t" } else { ", " })?;
        write!(out, "{:04x}", slot.bits())?;
    }
    if let Some(value) = instr.imm().filter(|_| imm) {
        write!(out, ", 0x{:08x}", value)?;
    }
    Ok(())
}

/// Fixed-size byte sink
struct Cursor<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl Write for Cursor<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let end = self.pos + s.len();
        let dest = self.buf.get_mut(self.pos..end).ok_or(fmt::Error)?;
        dest.copy_from_slice(s.as_bytes());
        self.pos = end;
        Ok(())
    }
}
