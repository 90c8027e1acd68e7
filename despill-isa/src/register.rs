//! Register identifiers and raw operand slots

use crate::error::IsaError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// General-purpose register (r0-r254)
///
/// The register file has no fixed size; every byte except the invalid
/// sentinel names a register.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Register(u8);

impl Register {
    /// Highest register index
    pub const MAX_INDEX: u8 = Operand::INVALID.0 - 1;

    #[inline]
    pub const fn from_index(index: u8) -> Option<Self> {
        if index <= Self::MAX_INDEX {
            Some(Self(index))
        } else {
            None
        }
    }

    #[inline]
    pub const fn index(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Register {
    type Error = IsaError;

    fn try_from(index: u8) -> Result<Self, IsaError> {
        Self::from_index(index).ok_or(IsaError::InvalidRegister(index))
    }
}

impl From<Register> for u8 {
    fn from(reg: Register) -> u8 {
        reg.0
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

/// Raw instruction operand slot
///
/// Usually a register identifier. Unused slots hold [`Operand::INVALID`].
/// The immediate-load opcode reuses two slots as raw immediate bytes, so any
/// byte value is representable here.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Operand(u8);

impl Operand {
    /// Sentinel for a vacant slot
    pub const INVALID: Self = Self(0xFF);

    /// Operand from a raw slot byte
    #[inline]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn is_valid(self) -> bool {
        self.0 != Self::INVALID.0
    }

    /// Register named by this slot, if the slot is occupied
    #[inline]
    pub const fn register(self) -> Option<Register> {
        Register::from_index(self.0)
    }
}

impl Default for Operand {
    fn default() -> Self {
        Self::INVALID
    }
}

impl From<Register> for Operand {
    fn from(reg: Register) -> Self {
        Self(reg.0)
    }
}

impl From<Option<Register>> for Operand {
    fn from(reg: Option<Register>) -> Self {
        reg.map_or(Self::INVALID, Self::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_range() {
        assert_eq!(Register::from_index(0).map(Register::index), Some(0));
        assert_eq!(Register::from_index(254).map(Register::index), Some(254));
        assert_eq!(Register::from_index(255), None);
    }

    #[test]
    fn test_operand_sentinel() {
        assert!(!Operand::INVALID.is_valid());
        assert_eq!(Operand::INVALID.register(), None);
        assert_eq!(Operand::default(), Operand::INVALID);
        assert_eq!(Operand::from(None), Operand::INVALID);
    }

    #[test]
    fn test_operand_from_register() {
        let r42 = Register::from_index(42).unwrap();
        let op = Operand::from(r42);
        assert!(op.is_valid());
        assert_eq!(op.bits(), 42);
        assert_eq!(op.register(), Some(r42));
    }

    #[test]
    fn test_register_try_from() {
        assert_eq!(Register::try_from(42u8).map(Register::index), Ok(42));
        assert_eq!(Register::try_from(255u8), Err(IsaError::InvalidRegister(255)));
    }

    #[test]
    fn test_register_serde_rejects_sentinel() {
        let r42 = Register::from_index(42).unwrap();
        let bytes = bincode::serialize(&r42).unwrap();
        assert_eq!(bytes, vec![42]);
        assert_eq!(bincode::deserialize::<Register>(&bytes).unwrap(), r42);

        assert!(bincode::deserialize::<Register>(&[0xFF]).is_err());
    }

    #[test]
    fn test_register_display() {
        assert_eq!(Register::from_index(127).unwrap().to_string(), "r127");
    }
}
