//! Instruction Set
//!
//! Fixed 3-slot instructions stored as 4-byte records:
//!
//! ```text
//! byte 0: opcode tag
//! byte 1: slot 0 (destination, or sole register operand)
//! byte 2: slot 1 (source; immediate low byte for li)
//! byte 3: slot 2 (source; immediate high byte for li)
//! ```
//!
//! The opcode tag is never trusted on its own. [`Instruction::opcode`]
//! re-checks the slot occupancy against the tag's shape on every call, so a
//! partially built or corrupted instruction decodes as invalid.

use crate::error::{IsaError, Result};
use crate::opcode::{Opcode, OperandRole};
use crate::register::{Operand, Register};
use crate::word::Word;
use serde::{Deserialize, Serialize};

/// Number of operand slots per instruction
pub const MAX_OPERAND_COUNT: usize = 3;

/// Instruction record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Instruction {
    op: u8,
    slots: [Operand; MAX_OPERAND_COUNT],
}

impl Instruction {
    /// Create an instruction with all slots vacant
    pub fn new(opcode: Opcode) -> Self {
        Self {
            op: opcode.to_u8(),
            slots: [Operand::INVALID; MAX_OPERAND_COUNT],
        }
    }

    // ========== Typed Constructors ==========

    pub fn nop() -> Self {
        Self::new(Opcode::Nop)
    }

    /// `li rd, imm`
    pub fn li(rd: Register, imm: i16) -> Self {
        let [lo, hi] = imm.to_le_bytes();
        Self::from_slots(Opcode::Li, [rd.into(), Operand::from_bits(lo), Operand::from_bits(hi)])
    }

    /// `push rs`
    pub fn push(rs: Register) -> Self {
        Self::from_slots(Opcode::Push, [rs.into(), Operand::INVALID, Operand::INVALID])
    }

    /// `pop rd`
    pub fn pop(rd: Register) -> Self {
        Self::from_slots(Opcode::Pop, [rd.into(), Operand::INVALID, Operand::INVALID])
    }

    /// `br rt`
    pub fn br(rt: Register) -> Self {
        Self::from_slots(Opcode::Br, [rt.into(), Operand::INVALID, Operand::INVALID])
    }

    /// `cbr rt, rs1, rs2`
    pub fn cbr(rt: Register, rs1: Register, rs2: Register) -> Self {
        Self::from_slots(Opcode::Cbr, [rt.into(), rs1.into(), rs2.into()])
    }

    /// `op rd, rs`
    pub fn op2(rd: Register, rs: Register) -> Self {
        Self::from_slots(Opcode::Op2, [rd.into(), rs.into(), Operand::INVALID])
    }

    /// `op rd, rs1, rs2`
    pub fn op3(rd: Register, rs1: Register, rs2: Register) -> Self {
        Self::from_slots(Opcode::Op3, [rd.into(), rs1.into(), rs2.into()])
    }

    fn from_slots(opcode: Opcode, slots: [Operand; MAX_OPERAND_COUNT]) -> Self {
        Self { op: opcode.to_u8(), slots }
    }

    // ========== Accessors ==========

    /// Decode the opcode, or `None` if the slot occupancy does not fit its shape
    pub fn opcode(&self) -> Option<Opcode> {
        Opcode::from_u8(self.op).filter(|op| op.matches(&self.slots))
    }

    /// Raw opcode tag, as stored
    #[inline]
    pub fn raw_opcode(&self) -> u8 {
        self.op
    }

    /// Check whether the instruction decodes
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.opcode().is_some()
    }

    /// Get operand at slot `index`
    pub fn operand(&self, index: usize) -> Result<Operand> {
        self.slots
            .get(index)
            .copied()
            .ok_or(IsaError::OperandIndexOutOfRange(index))
    }

    /// All three operand slots
    #[inline]
    pub fn operands(&self) -> &[Operand; MAX_OPERAND_COUNT] {
        &self.slots
    }

    /// Set operand at slot `index`, optionally vacating every later slot
    pub fn set_operand(
        &mut self,
        index: usize,
        operand: impl Into<Operand>,
        invalidate_rest: bool,
    ) -> Result<()> {
        let slot = self
            .slots
            .get_mut(index)
            .ok_or(IsaError::OperandIndexOutOfRange(index))?;
        *slot = operand.into();

        if invalidate_rest {
            for rest in &mut self.slots[index + 1..] {
                *rest = Operand::INVALID;
            }
        }
        Ok(())
    }

    /// Sign-extended 16-bit immediate of a `li` instruction
    ///
    /// Slots 1 and 2 hold the immediate in little-endian order. Returns
    /// `None` for any other opcode.
    pub fn imm(&self) -> Option<i32> {
        match self.opcode()? {
            Opcode::Li => {
                let raw = i16::from_le_bytes([self.slots[1].bits(), self.slots[2].bits()]);
                Some(i32::from(raw))
            }
            _ => None,
        }
    }

    /// Immediate of a `li` instruction as a machine word
    pub fn imm_word(&self) -> Option<Word> {
        self.imm().map(Word::from_signed)
    }

    /// Register written by the instruction
    pub fn def(&self) -> Option<Register> {
        self.registers_with(OperandRole::Def).next().map(|(_, reg)| reg)
    }

    /// Registers read by the instruction, with their slot index
    pub fn uses(&self) -> impl Iterator<Item = (usize, Register)> + '_ {
        self.registers_with(OperandRole::Use)
    }

    fn registers_with(&self, wanted: OperandRole) -> impl Iterator<Item = (usize, Register)> + '_ {
        let roles = self.opcode().map(Opcode::roles);
        self.slots
            .iter()
            .enumerate()
            .filter(move |(i, _)| roles.map_or(false, |r| r[*i] == wanted))
            .filter_map(|(i, slot)| slot.register().map(|reg| (i, reg)))
    }

    // ========== Binary Layout ==========

    /// Encode as a 4-byte record
    pub fn to_bytes(&self) -> [u8; 4] {
        [self.op, self.slots[0].bits(), self.slots[1].bits(), self.slots[2].bits()]
    }

    /// Decode a 4-byte record; validity is observed through [`Instruction::opcode`]
    pub fn from_bytes(bytes: [u8; 4]) -> Self {
        Self {
            op: bytes[0],
            slots: [
                Operand::from_bits(bytes[1]),
                Operand::from_bits(bytes[2]),
                Operand::from_bits(bytes[3]),
            ],
        }
    }

    /// Encode as a little-endian 32-bit word
    pub fn to_u32(&self) -> u32 {
        u32::from_le_bytes(self.to_bytes())
    }

    pub fn from_u32(word: u32) -> Self {
        Self::from_bytes(word.to_le_bytes())
    }
}
