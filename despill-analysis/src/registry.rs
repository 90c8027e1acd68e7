//! GPR file occupancy map
//!
//! A [`Registry`] records, per register, the set of values the register may
//! hold at a program point. The set can mix known constants and the unknown
//! sentinel. A register with at least one tracked value is *occupied*.

use despill_isa::{Register, Word};
use std::collections::{BTreeMap, BTreeSet};

/// Set of values a register may hold
pub type Values = BTreeSet<Word>;

/// Per-register value sets
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    /// Invariant: no entry maps to an empty set
    values: BTreeMap<Register, Values>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value to the register; returns false if it was already tracked
    pub fn add_value(&mut self, reg: Register, value: Word) -> bool {
        self.values.entry(reg).or_default().insert(value)
    }

    /// Add the unknown sentinel to the register
    pub fn add_unknown(&mut self, reg: Register) -> bool {
        self.add_value(reg, Word::UNKNOWN)
    }

    /// Remove every record of the register, returning what it held
    pub fn vacate(&mut self, reg: Register) -> Values {
        self.values.remove(&reg).unwrap_or_default()
    }

    /// Replace the register's values; an empty set vacates it
    pub fn restore(&mut self, reg: Register, values: Values) {
        if values.is_empty() {
            self.values.remove(&reg);
        } else {
            self.values.insert(reg, values);
        }
    }

    /// All tracked values for the register
    pub fn values(&self, reg: Register) -> Option<&Values> {
        self.values.get(&reg)
    }

    /// Occupancy of the register, whether by values or unknowns
    #[inline]
    pub fn occupied(&self, reg: Register) -> bool {
        self.values.contains_key(&reg)
    }

    /// Occupied registers in index order
    pub fn registers(&self) -> impl Iterator<Item = Register> + '_ {
        self.values.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Register, &Values)> + '_ {
        self.values.iter().map(|(&reg, vals)| (reg, vals))
    }

    /// Number of occupied registers
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Fold another registry into this one
    ///
    /// Union per register: a register occupied on any incoming path stays
    /// occupied, with every value it may hold on any path.
    pub fn merge(&mut self, other: &Registry) {
        for (&reg, vals) in &other.values {
            self.values
                .entry(reg)
                .or_default()
                .extend(vals.iter().copied());
        }
    }
}

impl FromIterator<(Register, Word)> for Registry {
    fn from_iter<I: IntoIterator<Item = (Register, Word)>>(iter: I) -> Self {
        let mut registry = Registry::new();
        for (reg, value) in iter {
            registry.add_value(reg, value);
        }
        registry
    }
}
