//! Machine word with an out-of-band validity tag
//!
//! A word is 32 bits wide, one of which is reserved for validity. The value
//! part is therefore 31 bits, and all arithmetic wraps within it. Instead of
//! hiding the validity bit inside the integer, [`Word`] carries an explicit
//! known/unknown discriminant; [`Word::to_bits`] and [`Word::from_bits`]
//! provide the packed layout when bit-budget parity is needed.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of value bits in a word
pub const WORD_VALUE_BITS: u32 = 31;

/// Mask selecting the value part of a word
pub const WORD_VALUE_MASK: u32 = (1 << WORD_VALUE_BITS) - 1;

/// Reserved bit marking an unknown word in the packed layout
const UNKNOWN_BIT: u32 = 1 << WORD_VALUE_BITS;

/// Statically known value or an unknown input
///
/// The unknown sentinel orders before every known value. Serialized in the
/// packed layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "PackedWord", into = "PackedWord")]
pub struct Word(Option<u32>);

/// Serialized form of [`Word`]
#[derive(Serialize, Deserialize)]
#[serde(transparent)]
struct PackedWord(u32);

impl From<PackedWord> for Word {
    fn from(packed: PackedWord) -> Self {
        Word::from_bits(packed.0)
    }
}

impl From<Word> for PackedWord {
    fn from(word: Word) -> Self {
        PackedWord(word.to_bits())
    }
}

impl Word {
    /// The unknown sentinel
    pub const UNKNOWN: Self = Self(None);

    /// Known word (value is truncated to 31 bits)
    #[inline]
    pub const fn new(value: u32) -> Self {
        Self(Some(value & WORD_VALUE_MASK))
    }

    /// Known word from a signed value, two's complement within 31 bits
    #[inline]
    pub const fn from_signed(value: i32) -> Self {
        Self::new(value as u32)
    }

    /// Value part, if known
    #[inline]
    pub const fn value(self) -> Option<u32> {
        self.0
    }

    /// Value part sign-extended from 31 bits, if known
    pub const fn signed_value(self) -> Option<i32> {
        match self.0 {
            Some(v) => Some(((v << 1) as i32) >> 1),
            None => None,
        }
    }

    #[inline]
    pub const fn is_known(self) -> bool {
        self.0.is_some()
    }

    #[inline]
    pub const fn is_unknown(self) -> bool {
        self.0.is_none()
    }

    /// Wrapping addition on the value part; unknown if either side is unknown
    pub fn wrapping_add(self, rhs: Self) -> Self {
        match (self.0, rhs.0) {
            (Some(a), Some(b)) => Self::new(a.wrapping_add(b)),
            _ => Self::UNKNOWN,
        }
    }

    /// Wrapping subtraction on the value part; unknown if either side is unknown
    pub fn wrapping_sub(self, rhs: Self) -> Self {
        match (self.0, rhs.0) {
            (Some(a), Some(b)) => Self::new(a.wrapping_sub(b)),
            _ => Self::UNKNOWN,
        }
    }

    /// Packed 32-bit layout: value in bits 0-30, bit 31 set for unknown
    #[inline]
    pub const fn to_bits(self) -> u32 {
        match self.0 {
            Some(v) => v,
            None => UNKNOWN_BIT,
        }
    }

    /// Inverse of [`Word::to_bits`]; any word with bit 31 set is unknown
    #[inline]
    pub const fn from_bits(bits: u32) -> Self {
        if bits & UNKNOWN_BIT != 0 {
            Self::UNKNOWN
        } else {
            Self(Some(bits))
        }
    }
}

impl From<u32> for Word {
    fn from(value: u32) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(v) => write!(f, "{:#010x}", v),
            None => write!(f, "unknown"),
        }
    }
}
