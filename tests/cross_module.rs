//! Cross-crate integration tests
//!
//! Raw instruction records are decoded, grouped into blocks, analyzed and
//! listed again, exercising isa, analysis and disassembler together.

use despill_analysis::{AnalysisError, ControlFlowGraph, Registry, SpillStack, Values};
use despill_disassembler::{decode, disassemble, disassemble_block, DisassemblerError};
use despill_isa::{Address, BasicBlock, Instruction, IsaError, Register, Word};

fn reg(index: u8) -> Register {
    Register::from_index(index).unwrap()
}

/// Decode raw records into a validated block
fn decode_block(start: Address, code: &[u32]) -> Result<BasicBlock, DisassemblerError> {
    let mut bb = BasicBlock::new(start);
    for &word in code {
        bb.add_instr(decode(word)?);
    }
    bb.validate().expect("decoded block should validate");
    Ok(bb)
}

#[test]
fn test_decoded_program_analyzes() {
    let head = [
        Instruction::li(reg(1), 0x10).to_u32(),
        Instruction::push(reg(1)).to_u32(),
        Instruction::li(reg(1), 0x20).to_u32(),
    ];
    let tail = [
        Instruction::pop(reg(1)).to_u32(),
        Instruction::br(reg(1)).to_u32(),
    ];

    let mut graph = ControlFlowGraph::new();
    graph.add_basic_block(decode_block(0x400, &head).unwrap()).unwrap();
    graph.add_basic_block(decode_block(0x403, &tail).unwrap()).unwrap();
    assert_eq!(graph.successors(0x400).unwrap(), vec![0x403]);

    let mut stack = SpillStack::new();
    graph.set_registry(0x400, Registry::new()).unwrap();
    graph.calc_registry(0x400, &mut stack).unwrap();
    assert_eq!(
        graph.exit_registry(0x400).unwrap().values(reg(1)),
        Some(&Values::from([Word::new(0x20)]))
    );

    graph.propagate(0x400, 0x403).unwrap();
    graph.calc_registry(0x403, &mut stack).unwrap();
    assert_eq!(
        graph.exit_registry(0x403).unwrap().values(reg(1)),
        Some(&Values::from([Word::new(0x10)]))
    );
    assert!(stack.is_empty());
}

#[test]
fn test_malformed_record_stops_block_construction() {
    // br with no target register
    let code = [Instruction::nop().to_u32(), 0xFFFF_FF04];
    assert_eq!(
        decode_block(0x0, &code).unwrap_err(),
        DisassemblerError::MalformedInstruction(0xFFFF_FF04)
    );
}

#[test]
fn test_listing_of_graph_blocks() {
    let mut bb = BasicBlock::new(0x7000);
    bb.add_instr(Instruction::push(reg(127)));
    bb.add_instr(Instruction::li(reg(42), 0x7f00));
    bb.add_instr(Instruction::br(reg(42)));
    bb.validate().unwrap();

    let mut graph = ControlFlowGraph::new();
    graph.add_basic_block(bb).unwrap();

    let listing: String = graph.iter().map(disassemble_block).collect();
    assert!(listing.starts_with("; block 0x00007000 (3 instructions, valid)\n"));
    assert!(listing.contains("0x00007000:  FFFF7F02  push\t007f\n"));
    assert!(listing.contains("li\t002a, 0x00007f00"));
    assert!(listing.contains("0x00007002:"));
    assert!(listing.ends_with("; exits: -\n"));
}

#[test]
fn test_listing_after_replacement() {
    let mut bb = BasicBlock::new(0x10);
    bb.add_instr(Instruction::nop());
    bb.add_instr(Instruction::nop());
    bb.validate().unwrap();

    let mut graph = ControlFlowGraph::new();
    graph.add_basic_block(bb).unwrap();

    let mut block = graph.get_basic_block_mut(0x10).unwrap();
    block.replace_instr(1, Instruction::br(reg(3))).unwrap();
    assert!(!block.is_valid());
    assert!(disassemble_block(&block).contains("unvalidated"));

    block.validate().unwrap();
    assert!(disassemble_block(&block).contains("br\t0003"));
}

#[test]
fn test_raw_listing_marks_bad_records() {
    let code = [Instruction::op2(reg(1), reg(2)).to_u32(), 0x0000_0009];
    let asm = disassemble(0x20, &code);
    assert!(asm.contains("op\t0001, 0002"));
    assert!(asm.contains("0x00000021:"));
    assert!(asm.contains("; ERROR:"));
}

#[test]
fn test_block_errors_surface_through_graph() {
    let mut bb = BasicBlock::new(0x30);
    bb.add_instr(Instruction::br(reg(1)));
    bb.add_instr(Instruction::nop());

    let mut graph = ControlFlowGraph::new();
    assert_eq!(
        graph.add_basic_block(bb.clone()),
        Err(AnalysisError::InvalidBlock { address: 0x30 })
    );

    let err: AnalysisError = bb.validate().unwrap_err().into();
    assert_eq!(err, AnalysisError::Isa(IsaError::EarlyBranch { start: 0x30, index: 0 }));
}
