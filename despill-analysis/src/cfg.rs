//! Control-flow graph
//!
//! Nodes are basic blocks keyed by start address; edges are the branches to
//! block start addresses. Each node also carries the entry and exit
//! [`Registry`] of its block.
//!
//! ## Invariants
//!
//! - Only validated blocks are stored
//! - No two blocks' `[start, start + len)` ranges overlap
//! - Stored blocks never change length; mutable access only allows
//!   in-place instruction replacement

use crate::config::AnalysisConfig;
use crate::dataflow::analyze_block;
use crate::error::{AnalysisError, Result};
use crate::registry::Registry;
use crate::spill::SpillStack;
use despill_isa::{Address, BasicBlock, Instruction};
use std::collections::BTreeMap;
use std::ops::{Bound, Deref};

/// Half-open address range of a block
#[derive(Debug, Clone, Copy)]
struct Interval {
    begin: u64,
    end: u64,
}

impl Interval {
    fn of(block: &BasicBlock) -> Self {
        Self {
            begin: u64::from(block.start_address()),
            end: block.end_address(),
        }
    }

    fn overlaps(&self, other: &Interval) -> bool {
        self.begin < other.end && other.begin < self.end
    }
}

/// Block plus its dataflow state
#[derive(Debug, Clone)]
struct Node {
    block: BasicBlock,
    entry: Option<Registry>,
    exit: Option<Registry>,
}

/// Address-ordered, overlap-free collection of basic blocks
#[derive(Debug, Clone, Default)]
pub struct ControlFlowGraph {
    blocks: BTreeMap<Address, Node>,
    config: AnalysisConfig,
}

impl ControlFlowGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: AnalysisConfig) -> Self {
        Self {
            blocks: BTreeMap::new(),
            config,
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    // ========== Construction ==========

    /// Insert a validated block
    ///
    /// Only address-adjacent blocks are examined: scanning stops in each
    /// direction as soon as an overlap becomes impossible. On rejection the
    /// graph is unchanged.
    pub fn add_basic_block(&mut self, block: BasicBlock) -> Result<()> {
        let start = block.start_address();
        if !block.is_valid() {
            tracing::debug!("rejecting unvalidated block {:#010x}", start);
            return Err(AnalysisError::InvalidBlock { address: start });
        }

        let incoming = Interval::of(&block);

        // preceding blocks, including one at the same start address
        for node in self.blocks.range(..=start).rev().map(|(_, node)| node) {
            let present = Interval::of(&node.block);
            if incoming.begin >= present.end {
                break;
            }
            if incoming.overlaps(&present) {
                return Err(Self::overlap(incoming, present));
            }
        }

        // succeeding blocks
        let after = (Bound::Excluded(start), Bound::Unbounded);
        for node in self.blocks.range(after).map(|(_, node)| node) {
            let present = Interval::of(&node.block);
            if present.begin >= incoming.end {
                break;
            }
            if present.overlaps(&incoming) {
                return Err(Self::overlap(incoming, present));
            }
        }

        tracing::debug!(
            "inserted block [{:#010x}, {:#010x})",
            incoming.begin,
            incoming.end
        );
        self.blocks.insert(
            start,
            Node {
                block,
                entry: None,
                exit: None,
            },
        );
        Ok(())
    }

    fn overlap(incoming: Interval, present: Interval) -> AnalysisError {
        tracing::debug!(
            "rejecting block [{:#010x}, {:#010x}): overlaps [{:#010x}, {:#010x})",
            incoming.begin,
            incoming.end,
            present.begin,
            present.end
        );
        // begin values come from Address, so they fit back
        AnalysisError::OverlappingBlock {
            start: incoming.begin as Address,
            end: incoming.end,
            existing_start: present.begin as Address,
            existing_end: present.end,
        }
    }

    // ========== Lookup ==========

    pub fn get_basic_block(&self, address: Address) -> Option<&BasicBlock> {
        self.blocks.get(&address).map(|node| &node.block)
    }

    /// Mutable access to a stored block
    pub fn get_basic_block_mut(&mut self, address: Address) -> Option<BlockMut<'_>> {
        self.blocks.get_mut(&address).map(|node| BlockMut { node })
    }

    /// Block whose address range contains `address`
    pub fn block_containing(&self, address: Address) -> Option<&BasicBlock> {
        self.blocks
            .range(..=address)
            .next_back()
            .map(|(_, node)| &node.block)
            .filter(|block| block.contains(address))
    }

    /// Blocks in address order
    pub fn iter(&self) -> impl Iterator<Item = &BasicBlock> + '_ {
        self.blocks.values().map(|node| &node.block)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Statically known exit targets of a block that are present in the graph
    pub fn successors(&self, address: Address) -> Result<Vec<Address>> {
        let block = self
            .get_basic_block(address)
            .ok_or(AnalysisError::BlockNotFound { address })?;
        Ok(block
            .exit_targets()
            .iter()
            .copied()
            .filter(|target| self.blocks.contains_key(target))
            .collect())
    }

    // ========== Dataflow State ==========

    /// Seed or overwrite the entry registry of a block
    ///
    /// Any previously computed exit registry is discarded.
    pub fn set_registry(&mut self, address: Address, registry: Registry) -> Result<()> {
        let node = self.node_mut(address)?;
        tracing::debug!(
            "seeding block {:#010x} with {} occupied registers",
            address,
            registry.len()
        );
        node.entry = Some(registry);
        node.exit = None;
        Ok(())
    }

    pub fn entry_registry(&self, address: Address) -> Option<&Registry> {
        self.blocks.get(&address).and_then(|node| node.entry.as_ref())
    }

    /// Exit registry of a block, present only after a successful [`calc_registry`]
    ///
    /// [`calc_registry`]: ControlFlowGraph::calc_registry
    pub fn exit_registry(&self, address: Address) -> Option<&Registry> {
        self.blocks.get(&address).and_then(|node| node.exit.as_ref())
    }

    /// Compute the exit registry of a block from its entry registry
    ///
    /// `stack` is the spill stack of the current run. On failure the block
    /// has no exit registry and `stack` is unchanged.
    pub fn calc_registry(&mut self, address: Address, stack: &mut SpillStack) -> Result<()> {
        let node = self
            .blocks
            .get_mut(&address)
            .ok_or(AnalysisError::BlockNotFound { address })?;
        node.exit = None;

        let entry = node
            .entry
            .as_ref()
            .ok_or(AnalysisError::UnseededEntry { address })?;

        match analyze_block(&node.block, entry, stack, &self.config) {
            Ok(exit) => {
                tracing::debug!(
                    "block {:#010x}: {} occupied registers at exit, spill depth {}",
                    address,
                    exit.len(),
                    stack.depth()
                );
                node.exit = Some(exit);
                Ok(())
            }
            Err(err) => {
                tracing::warn!("dataflow aborted in block {:#010x}: {}", address, err);
                Err(err)
            }
        }
    }

    /// Merge the exit registry of `from` into the entry registry of `to`
    ///
    /// Seeds `to` if it has no entry registry yet. `to` loses any computed
    /// exit registry.
    pub fn propagate(&mut self, from: Address, to: Address) -> Result<()> {
        let exit = self
            .blocks
            .get(&from)
            .ok_or(AnalysisError::BlockNotFound { address: from })?
            .exit
            .clone()
            .ok_or(AnalysisError::MissingExit { address: from })?;

        let target = self.node_mut(to)?;
        match target.entry.as_mut() {
            Some(entry) => entry.merge(&exit),
            None => target.entry = Some(exit),
        }
        target.exit = None;

        tracing::debug!("propagated exit of {:#010x} into {:#010x}", from, to);
        Ok(())
    }

    fn node_mut(&mut self, address: Address) -> Result<&mut Node> {
        self.blocks
            .get_mut(&address)
            .ok_or(AnalysisError::BlockNotFound { address })
    }
}

/// Mutable handle to a block stored in a [`ControlFlowGraph`]
///
/// Allows replacing instructions in place, which keeps the block's address
/// range fixed. Any replacement discards the block's exit registry.
pub struct BlockMut<'a> {
    node: &'a mut Node,
}

impl BlockMut<'_> {
    /// Replace an instruction, returning the previous one; the block must be re-validated
    pub fn replace_instr(&mut self, index: usize, instr: Instruction) -> Result<Instruction> {
        let old = self.node.block.replace_instr(index, instr)?;
        self.node.exit = None;
        Ok(old)
    }

    pub fn validate(&mut self) -> Result<()> {
        self.node.block.validate()?;
        Ok(())
    }
}

impl Deref for BlockMut<'_> {
    type Target = BasicBlock;

    fn deref(&self) -> &BasicBlock {
        &self.node.block
    }
}
