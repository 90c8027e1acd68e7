//! Register occupancy and spill-stack dataflow
//!
//! Forward abstract interpretation over one basic block.
//!
//! # Algorithm
//!
//! 1. Start from a copy of the block's entry registry and of the spill stack
//! 2. For each instruction, in address order:
//!    - check that every register it reads is occupied
//!    - apply its effect on the registry and the spill stack
//! 3. On success, return the final registry and commit the spill stack
//!
//! Effects per opcode:
//! - `li`: union the immediate into the destination's value set
//! - `push`: move the source's value set into a new stack frame, vacate the source
//! - `pop`: replace the destination's value set with the top frame, drop the frame
//! - `op`: opaque; optionally clobbers the destination with `{unknown}`
//! - `nop`, `br`, `cbr`: occupancy checks only

use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, Result};
use crate::registry::Registry;
use crate::spill::SpillStack;
use despill_isa::{Address, BasicBlock, Instruction, IsaError, Opcode};

/// Compute the exit registry of a validated block
///
/// The spill stack is updated only if the whole block is analysed
/// successfully; on error the caller's stack is left as it was.
pub fn analyze_block(
    block: &BasicBlock,
    entry: &Registry,
    stack: &mut SpillStack,
    config: &AnalysisConfig,
) -> Result<Registry> {
    let start = block.start_address();
    if !block.is_valid() {
        return Err(AnalysisError::InvalidBlock { address: start });
    }

    tracing::debug!(
        "analyzing block {:#010x}: {} instructions, spill depth {}",
        start,
        block.len(),
        stack.depth()
    );

    let mut regs = entry.clone();
    let mut spill = stack.clone();

    for (index, (address, instr)) in block.iter().enumerate() {
        let op = instr
            .opcode()
            .ok_or(IsaError::MalformedInstruction { start, index })?;

        check_uses(&regs, address, instr)?;

        match op {
            Opcode::Nop | Opcode::Br | Opcode::Cbr => {}

            Opcode::Li => {
                let (rd, imm) = instr
                    .def()
                    .zip(instr.imm_word())
                    .ok_or(IsaError::MalformedInstruction { start, index })?;
                regs.add_value(rd, imm);
            }

            Opcode::Push => {
                let (_, rs) = instr
                    .uses()
                    .next()
                    .ok_or(IsaError::MalformedInstruction { start, index })?;
                spill.push(regs.vacate(rs));
            }

            Opcode::Pop => {
                let rd = instr
                    .def()
                    .ok_or(IsaError::MalformedInstruction { start, index })?;
                let frame = spill.pop().ok_or(AnalysisError::SpillUnderflow { address })?;
                regs.restore(rd, frame);
            }

            Opcode::Op2 | Opcode::Op3 => {
                if config.clobber_opaque_defs {
                    if let Some(rd) = instr.def() {
                        regs.vacate(rd);
                        regs.add_unknown(rd);
                    }
                }
            }
        }

        if op.is_spill() {
            tracing::debug!(
                "{:#010x}: {} r{}, spill depth {}",
                address,
                op.mnemonic(),
                instr.operands()[0].bits(),
                spill.depth()
            );
        }

        if config.trace {
            tracing::trace!(
                "{:#010x}: {:<4} occupied={} spill_depth={}",
                address,
                op.mnemonic(),
                regs.len(),
                spill.depth()
            );
        }
    }

    *stack = spill;
    Ok(regs)
}

/// Verify that every register the instruction reads is occupied
fn check_uses(regs: &Registry, address: Address, instr: &Instruction) -> Result<()> {
    match instr.uses().find(|&(_, reg)| !regs.occupied(reg)) {
        Some((slot, register)) => Err(AnalysisError::UnoccupiedRegister {
            address,
            slot,
            register,
        }),
        None => Ok(()),
    }
}
