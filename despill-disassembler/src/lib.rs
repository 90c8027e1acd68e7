//! # Despill Disassembler
//!
//! Render Despill instructions and basic blocks as assembly text.
//!
//! ## Example
//!
//! ```rust
//! use despill_disassembler::{render_into, required_len};
//! use despill_isa::{Instruction, Register};
//!
//! let instr = Instruction::push(Register::from_index(42).unwrap());
//!
//! let mut buffer = vec![0u8; required_len(&instr)];
//! let written = render_into(&instr, &mut buffer).unwrap();
//! assert_eq!(&buffer[..written], b"push\t002a");
//! ```

pub mod error;
pub mod decoder;
pub mod formatter;
pub mod disassembler;

pub use error::{DisassemblerError, Result};
pub use decoder::decode;
pub use formatter::{format, render_into, required_len};
pub use disassembler::{disassemble, disassemble_block};
