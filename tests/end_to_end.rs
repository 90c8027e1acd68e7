//! End-to-end de-spilling scenarios
//!
//! These tests verify the complete workflow:
//! 1. Build and validate basic blocks
//! 2. Insert them into a control-flow graph
//! 3. Seed entry state and compute exit state block by block
//! 4. Propagate exit state along the simulated control flow

use despill_analysis::{AnalysisConfig, AnalysisError, ControlFlowGraph, Registry, SpillStack, Values};
use despill_isa::{Address, BasicBlock, Instruction, Register, Word};
use tracing_subscriber::EnvFilter;

const CALLER: Address = 0x7000;
const RETURN_SITE: Address = 0x7004;
const CALLEE: Address = 0x7f00;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn reg(index: u8) -> Register {
    Register::from_index(index).unwrap()
}

fn block(start: Address, instrs: &[Instruction]) -> BasicBlock {
    let mut bb = BasicBlock::new(start);
    for &instr in instrs {
        bb.add_instr(instr);
    }
    bb.validate().expect("block should validate");
    bb
}

/// Caller spills r127, loads the callee and return addresses, and branches
/// to the callee; the return site restores r127 and branches through it.
fn call_graph(config: AnalysisConfig) -> ControlFlowGraph {
    let mut graph = ControlFlowGraph::with_config(config);

    graph
        .add_basic_block(block(
            CALLER,
            &[
                Instruction::push(reg(127)),
                Instruction::li(reg(42), 0x7f00),
                Instruction::li(reg(127), 0x7004),
                Instruction::br(reg(42)),
            ],
        ))
        .unwrap();

    graph
        .add_basic_block(block(
            RETURN_SITE,
            &[Instruction::pop(reg(127)), Instruction::br(reg(127))],
        ))
        .unwrap();

    // callee preserves r127 around its body
    graph
        .add_basic_block(block(
            CALLEE,
            &[
                Instruction::push(reg(127)),
                Instruction::pop(reg(127)),
                Instruction::br(reg(127)),
            ],
        ))
        .unwrap();

    graph
}

#[test]
fn test_call_and_return_restores_spilled_register() {
    init_tracing();
    let mut graph = call_graph(AnalysisConfig::traced());

    let mut seed = Registry::new();
    seed.add_unknown(reg(127));
    graph.set_registry(CALLER, seed.clone()).unwrap();

    let mut stack = SpillStack::new();
    graph.calc_registry(CALLER, &mut stack).unwrap();

    let caller_exit = graph.exit_registry(CALLER).unwrap();
    assert_eq!(caller_exit.values(reg(42)), Some(&Values::from([Word::new(0x7f00)])));
    assert_eq!(caller_exit.values(reg(127)), Some(&Values::from([Word::new(0x7004)])));
    assert_eq!(stack.frames(), &[Values::from([Word::UNKNOWN])]);

    // simulated callee push/pop cycle
    graph.propagate(CALLER, CALLEE).unwrap();
    graph.calc_registry(CALLEE, &mut stack).unwrap();
    assert_eq!(stack.depth(), 1);
    assert_eq!(
        graph.exit_registry(CALLEE).unwrap().values(reg(127)),
        Some(&Values::from([Word::new(0x7004)]))
    );

    // return to the caller's return site
    graph.propagate(CALLEE, RETURN_SITE).unwrap();
    graph.calc_registry(RETURN_SITE, &mut stack).unwrap();

    let return_exit = graph.exit_registry(RETURN_SITE).unwrap();
    assert_eq!(return_exit.values(reg(127)), seed.values(reg(127)));
    assert!(stack.is_empty());
}

#[test]
fn test_return_site_alone_underflows() {
    init_tracing();
    let mut graph = call_graph(AnalysisConfig::default());

    let mut seed = Registry::new();
    seed.add_unknown(reg(127));
    graph.set_registry(RETURN_SITE, seed).unwrap();

    let err = graph
        .calc_registry(RETURN_SITE, &mut SpillStack::new())
        .unwrap_err();
    assert_eq!(err, AnalysisError::SpillUnderflow { address: RETURN_SITE });
    assert!(graph.exit_registry(RETURN_SITE).is_none());
}

#[test]
fn test_unseeded_caller_fails() {
    let mut graph = call_graph(AnalysisConfig::default());
    assert_eq!(
        graph.calc_registry(CALLER, &mut SpillStack::new()),
        Err(AnalysisError::UnseededEntry { address: CALLER })
    );
}

#[test]
fn test_caller_without_r127_fails_at_push() {
    let mut graph = call_graph(AnalysisConfig::default());
    graph.set_registry(CALLER, Registry::new()).unwrap();

    let err = graph.calc_registry(CALLER, &mut SpillStack::new()).unwrap_err();
    assert_eq!(
        err,
        AnalysisError::UnoccupiedRegister { address: CALLER, slot: 0, register: reg(127) }
    );
}

#[test]
fn test_independent_runs_need_a_cleared_stack() {
    let mut graph = call_graph(AnalysisConfig::default());
    let mut seed = Registry::new();
    seed.add_unknown(reg(127));

    let mut stack = SpillStack::new();
    for _ in 0..2 {
        graph.set_registry(CALLER, seed.clone()).unwrap();
        graph.calc_registry(CALLER, &mut stack).unwrap();
    }
    // leaked frame from the first run
    assert_eq!(stack.depth(), 2);

    stack.clear();
    graph.set_registry(CALLER, seed).unwrap();
    graph.calc_registry(CALLER, &mut stack).unwrap();
    assert_eq!(stack.depth(), 1);
}

#[test]
fn test_overlapping_callee_is_rejected() {
    let mut graph = call_graph(AnalysisConfig::default());
    let err = graph
        .add_basic_block(block(0x7003, &[Instruction::nop(), Instruction::nop()]))
        .unwrap_err();
    assert!(matches!(err, AnalysisError::OverlappingBlock { existing_start: 0x7000, .. }));
    assert_eq!(graph.len(), 3);
}
