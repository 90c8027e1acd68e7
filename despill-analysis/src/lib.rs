//! # Despill Analysis
//!
//! Control-flow graph construction and a forward dataflow pass that tracks
//! register occupancy through spill/fill (`push`/`pop`) sequences.
//!
//! ## Features
//!
//! - **Overlap-free CFG**: blocks keyed by start address, overlapping ranges rejected
//! - **Registry**: per-register sets of known constants and unknowns
//! - **Spill stack**: LIFO frames of vacated value sets, owned by each run
//! - **Operand legality**: reads of unoccupied registers abort the run
//!
//! ## Example
//!
//! ```rust
//! use despill_analysis::{ControlFlowGraph, Registry, SpillStack};
//! use despill_isa::{BasicBlock, Instruction, Register};
//!
//! let r1 = Register::from_index(1).unwrap();
//! let mut bb = BasicBlock::new(0x1000);
//! bb.add_instr(Instruction::push(r1));
//! bb.add_instr(Instruction::pop(r1));
//! bb.validate().unwrap();
//!
//! let mut graph = ControlFlowGraph::new();
//! graph.add_basic_block(bb).unwrap();
//!
//! let mut entry = Registry::new();
//! entry.add_unknown(r1);
//! graph.set_registry(0x1000, entry.clone()).unwrap();
//!
//! let mut stack = SpillStack::new();
//! graph.calc_registry(0x1000, &mut stack).unwrap();
//! assert_eq!(graph.exit_registry(0x1000), Some(&entry));
//! ```

pub mod error;
pub mod config;
pub mod registry;
pub mod spill;
pub mod dataflow;
pub mod cfg;

pub use error::{AnalysisError, Result};
pub use config::AnalysisConfig;
pub use registry::{Registry, Values};
pub use spill::SpillStack;
pub use dataflow::analyze_block;
pub use cfg::{BlockMut, ControlFlowGraph};
