//! Basic blocks
//!
//! A basic block is a sequence of instructions executed one after another,
//! with at most one branch and only in the final position. Blocks are built
//! incrementally and frozen by [`BasicBlock::validate`]; any later mutation
//! drops the validity flag until the block is validated again.

use crate::error::{IsaError, Result};
use crate::instruction::Instruction;
use crate::opcode::Opcode;
use crate::Address;
use std::collections::BTreeSet;

/// Address-tagged instruction sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicBlock {
    /// Start address of the block
    start: Address,
    /// Instructions, one per address
    instrs: Vec<Instruction>,
    /// Branch targets out of the block known before linking
    exits: BTreeSet<Address>,
    /// Set only by a successful validate
    valid: bool,
}

impl BasicBlock {
    pub fn new(start: Address) -> Self {
        Self {
            start,
            instrs: Vec::new(),
            exits: BTreeSet::new(),
            valid: false,
        }
    }

    #[inline]
    pub fn start_address(&self) -> Address {
        self.start
    }

    /// One past the last address of the block
    ///
    /// Widened to `u64` so that the end of a block at the top of the address
    /// space is representable.
    #[inline]
    pub fn end_address(&self) -> u64 {
        u64::from(self.start) + self.instrs.len() as u64
    }

    /// Check whether `address` falls inside the block
    pub fn contains(&self, address: Address) -> bool {
        address >= self.start && u64::from(address) < self.end_address()
    }

    /// Number of instructions
    #[inline]
    pub fn len(&self) -> usize {
        self.instrs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.instrs.is_empty()
    }

    /// Immutable instruction sequence
    #[inline]
    pub fn instructions(&self) -> &[Instruction] {
        &self.instrs
    }

    /// Instructions paired with their addresses
    pub fn iter(&self) -> impl Iterator<Item = (Address, &Instruction)> + '_ {
        let start = self.start;
        self.instrs
            .iter()
            .enumerate()
            .map(move |(i, instr)| (start.wrapping_add(i as u32), instr))
    }

    /// Branch targets out of the block, as computed by the last successful validate
    ///
    /// Holds the fall-through address unless the block ends in an
    /// unconditional branch. Register-held targets are resolved at linking.
    #[inline]
    pub fn exit_targets(&self) -> &BTreeSet<Address> {
        &self.exits
    }

    /// Validity flag; never recomputed here
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Append an instruction
    pub fn add_instr(&mut self, instr: Instruction) {
        self.instrs.push(instr);
        self.valid = false;
    }

    /// Replace an existing instruction, returning the previous one
    pub fn replace_instr(&mut self, index: usize, instr: Instruction) -> Result<Instruction> {
        let len = self.instrs.len();
        let slot = self
            .instrs
            .get_mut(index)
            .ok_or(IsaError::InstructionIndexOutOfRange { index, len })?;
        self.valid = false;
        Ok(std::mem::replace(slot, instr))
    }

    /// Check the block and recompute its exit targets
    ///
    /// Invalid blocks are:
    /// - empty
    /// - containing an instruction that does not decode
    /// - containing a branch before the final position
    /// - extending past the end of the address space
    ///
    /// A block may end on the last address only if it ends in `br`, since
    /// any other final instruction needs a fall-through address.
    pub fn validate(&mut self) -> Result<()> {
        self.valid = false;
        self.exits.clear();

        let last = self.check()?;
        let overflow = IsaError::AddressOverflow {
            start: self.start,
            len: self.instrs.len(),
        };

        self.last_address().ok_or_else(|| overflow.clone())?;
        if !last.is_unconditional_branch() {
            let end = self.fall_through().ok_or(overflow)?;
            self.exits.insert(end);
        }
        self.valid = true;
        Ok(())
    }

    /// Opcode of the final instruction, if every instruction decodes and branches are terminal
    fn check(&self) -> Result<Opcode> {
        let start = self.start;
        let last_index = self
            .instrs
            .len()
            .checked_sub(1)
            .ok_or(IsaError::EmptyBlock { start })?;

        let mut last = Opcode::Nop;
        for (index, instr) in self.instrs.iter().enumerate() {
            let op = instr
                .opcode()
                .ok_or(IsaError::MalformedInstruction { start, index })?;
            if op.is_branch() && index != last_index {
                return Err(IsaError::EarlyBranch { start, index });
            }
            last = op;
        }
        Ok(last)
    }

    fn last_address(&self) -> Option<Address> {
        let last = self.instrs.len().checked_sub(1)?;
        u32::try_from(last)
            .ok()
            .and_then(|offset| self.start.checked_add(offset))
    }

    fn fall_through(&self) -> Option<Address> {
        u32::try_from(self.instrs.len())
            .ok()
            .and_then(|len| self.start.checked_add(len))
    }
}
