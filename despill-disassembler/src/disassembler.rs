//! Listings for blocks and raw code

use crate::decoder::decode;
use crate::formatter::format;
use despill_isa::{Address, BasicBlock};

/// Disassemble a basic block into assembly text
pub fn disassemble_block(block: &BasicBlock) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "; block 0x{:08X} ({} instructions, {})\n",
        block.start_address(),
        block.len(),
        if block.is_valid() { "valid" } else { "unvalidated" }
    ));

    for (addr, instr) in block.iter() {
        output.push_str(&format!("0x{:08X}:  {:08X}  {}\n", addr, instr.to_u32(), format(instr)));
    }

    if block.is_valid() {
        let exits: Vec<String> = block
            .exit_targets()
            .iter()
            .map(|target| format!("0x{:08X}", target))
            .collect();
        let exits = if exits.is_empty() { "-".to_string() } else { exits.join(", ") };
        output.push_str(&format!("; exits: {}\n", exits));
    }

    output
}

/// Disassemble raw 32-bit instruction records laid out from `start`
pub fn disassemble(start: Address, code: &[u32]) -> String {
    let mut output = String::new();

    for (i, &word) in code.iter().enumerate() {
        let addr = start.wrapping_add(i as u32);
        output.push_str(&format!("0x{:08X}:  {:08X}  ", addr, word));

        match decode(word) {
            Ok(instr) => output.push_str(&format(&instr)),
            Err(e) => output.push_str(&format!("; ERROR: {}", e)),
        }

        output.push('\n');
    }

    output
}
