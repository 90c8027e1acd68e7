//! # Opcode Definitions
//!
//! Every opcode has a fixed operand shape: the role each of the three slots
//! plays. The same table drives structural decoding and the dataflow pass.
//!
//! ```text
//! tag  mnemonic  slot0        slot1      slot2
//! 0    nop       -            -          -
//! 1    li        def          imm[7:0]   imm[15:8]
//! 2    push      use          -          -
//! 3    pop       def          -          -
//! 4    br        use (target) -          -
//! 5    cbr       use (target) use        use
//! 6    op        def          use        -
//! 7    op        def          use        use
//! ```

use crate::register::Operand;
use serde::{Deserialize, Serialize};

/// Instruction opcode
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Opcode {
    /// NOP: no-op
    Nop = 0,
    /// LI: load immediate to register (`li Rn, imm`)
    Li = 1,
    /// PUSH: spill a single register to storage (`push Rn`)
    Push = 2,
    /// POP: restore a single register from storage (`pop Rn`)
    Pop = 3,
    /// BR: unconditional branch to register (`br Rt`)
    Br = 4,
    /// CBR: branch to Rt if an unspecified comparison of Rn and Rm holds (`cbr Rt, Rn, Rm`)
    Cbr = 5,
    /// OP2: opaque operation with one destination and one source (`op Rn, Rm`)
    Op2 = 6,
    /// OP3: opaque operation with one destination and two sources (`op Rn, Rm, Rk`)
    Op3 = 7,
}

/// Role of an operand slot for a given opcode
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperandRole {
    /// Slot must hold the invalid sentinel
    Unused,
    /// Register written by the instruction
    Def,
    /// Register read by the instruction; must be occupied before execution
    Use,
    /// Raw immediate byte, any value
    Immediate,
}

impl OperandRole {
    /// Check whether a slot value fits this role
    #[inline]
    pub const fn accepts(self, operand: Operand) -> bool {
        match self {
            OperandRole::Unused => !operand.is_valid(),
            OperandRole::Def | OperandRole::Use => operand.is_valid(),
            OperandRole::Immediate => true,
        }
    }
}

impl Opcode {
    /// All opcodes in tag order
    pub const ALL: [Opcode; 8] = [
        Opcode::Nop,
        Opcode::Li,
        Opcode::Push,
        Opcode::Pop,
        Opcode::Br,
        Opcode::Cbr,
        Opcode::Op2,
        Opcode::Op3,
    ];

    /// Try to convert from u8
    pub fn from_u8(value: u8) -> Option<Self> {
        Self::ALL.get(value as usize).copied()
    }

    /// Convert to u8
    #[inline]
    pub const fn to_u8(self) -> u8 {
        self as u8
    }

    /// Get assembly mnemonic
    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Nop => "nop",
            Opcode::Li => "li",
            Opcode::Push => "push",
            Opcode::Pop => "pop",
            Opcode::Br => "br",
            Opcode::Cbr => "cbr",
            Opcode::Op2 | Opcode::Op3 => "op",
        }
    }

    /// Operand shape of this opcode
    pub const fn roles(self) -> [OperandRole; 3] {
        use OperandRole::*;
        match self {
            Opcode::Nop => [Unused, Unused, Unused],
            Opcode::Li => [Def, Immediate, Immediate],
            Opcode::Push => [Use, Unused, Unused],
            Opcode::Pop => [Def, Unused, Unused],
            Opcode::Br => [Use, Unused, Unused],
            Opcode::Cbr => [Use, Use, Use],
            Opcode::Op2 => [Def, Use, Unused],
            Opcode::Op3 => [Def, Use, Use],
        }
    }

    /// Check whether a slot array matches this opcode's shape
    pub fn matches(self, slots: &[Operand; 3]) -> bool {
        self.roles()
            .iter()
            .zip(slots.iter())
            .all(|(role, &slot)| role.accepts(slot))
    }

    /// Check if this opcode transfers control
    #[inline]
    pub const fn is_branch(self) -> bool {
        matches!(self, Opcode::Br | Opcode::Cbr)
    }

    /// Check if this opcode always transfers control (no fall-through)
    #[inline]
    pub const fn is_unconditional_branch(self) -> bool {
        matches!(self, Opcode::Br)
    }

    /// Check if this opcode touches spill storage
    #[inline]
    pub const fn is_spill(self) -> bool {
        matches!(self, Opcode::Push | Opcode::Pop)
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.mnemonic())
    }
}
