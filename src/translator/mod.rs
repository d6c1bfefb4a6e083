//! Translator from the stack VM language to Hack assembly.
//!
//! Pipeline: source text → [`parser`] (with [`validate`]) → [`Instruction`]
//! stream → [`codegen`] → assembly text, driven by [`emit`].
//!
//! Each compiled unit is translated independently. The unit name qualifies
//! `static` symbols as `<unit>.<index>`; comparison labels are keyed by the
//! zero-based instruction position so they are unique within a unit.

pub mod asm;
pub mod codegen;
pub mod config;
pub mod emit;
pub mod errors;
pub mod instruction;
pub mod parser;
pub mod segment;
pub mod validate;


pub use codegen::CodeGenerator;
pub use config::Config;
pub use emit::{
    Translation, output_path_for, render_diagnostic, translate_file, translate_source,
    unit_name_for,
};
pub use errors::TranslateError;
pub use instruction::{ArithmeticOp, BranchKind, Instruction, StackKind, Symbol};
pub use parser::{Parser, SourceInstruction, parse, parse_line};
pub use segment::Segment;
