//! Code generator: one target assembly block per VM instruction.
//!
//! Output is a pure function of the instruction, its zero-based position in
//! the unit and the unit name. Comparison labels are keyed by position, so a
//! unit never defines the same synthesized label twice.

use crate::translator::asm::{Asm, SP};
use crate::translator::errors::TranslateError;
use crate::translator::instruction::{
    ArithmeticOp, BranchKind, Instruction, Lowering, StackKind, Symbol,
};
use crate::translator::segment::Segment;
use crate::translator::validate::check_unit_name;

/// Caller-frame registers saved by a function prologue, in push order.
pub const SAVED_FRAME: [&str; 4] = ["LCL", "ARG", "THIS", "THAT"];

/// Prefix of user-declared labels in the output.
pub const USER_LABEL_PREFIX: &str = "L.";
/// Synthesized label marking the `true` arm of a comparison.
pub const TRUE_LABEL: &str = "EQUAL";
/// Synthesized label marking the store after a comparison.
pub const JOIN_LABEL: &str = "WRITE";

/// Translates instructions of one unit.
#[derive(Debug, Clone)]
pub struct CodeGenerator {
    unit: String,
    annotate: bool,
}

impl CodeGenerator {
    /// Creates a generator for `unit`, whose name qualifies static symbols.
    pub fn new(unit: &str, annotate: bool) -> Result<Self, TranslateError> {
        check_unit_name(unit)?;
        Ok(Self {
            unit: unit.to_string(),
            annotate,
        })
    }

    /// Emits the block for `instruction` at zero-based `position`.
    pub fn generate(
        &self,
        instruction: &Instruction,
        position: usize,
    ) -> Result<String, TranslateError> {
        let mut out = Asm::new();
        if self.annotate {
            out.comment(instruction);
        }
        match instruction {
            Instruction::StackOp {
                kind: StackKind::Push,
                segment,
                index,
            } => self.push(&mut out, *segment, *index)?,
            Instruction::StackOp {
                kind: StackKind::Pop,
                segment,
                index,
            } => self.pop(&mut out, *segment, *index)?,
            Instruction::ArithmeticOp(op) => arithmetic(&mut out, *op, position),
            Instruction::BranchOp { kind, symbol } => branch(&mut out, *kind, symbol),
            Instruction::FunctionDecl { num_locals, .. } => prologue(&mut out, *num_locals),
        }
        Ok(out.into_string())
    }

    fn push(&self, out: &mut Asm, segment: Segment, index: u16) -> Result<(), TranslateError> {
        let read = segment.read(index, &self.unit)?;
        out.append(&read).push_d();
        Ok(())
    }

    fn pop(&self, out: &mut Asm, segment: Segment, index: u16) -> Result<(), TranslateError> {
        let write = segment.write(index, &self.unit)?;
        out.append(&write.setup).pop_d().append(&write.store);
        Ok(())
    }
}

/// Pops `y` into D and points A at `x`, leaving SP one past `x`.
fn binary_header(out: &mut Asm) {
    out.pop_d().op("A=A-1");
}

fn arithmetic(out: &mut Asm, op: ArithmeticOp, position: usize) {
    match op.lowering() {
        Lowering::Binary(compute) => {
            binary_header(out);
            out.op(compute);
        }
        Lowering::Unary(compute) => {
            out.top().op(compute);
        }
        Lowering::Compare(jump) => {
            let on_true = format!("{TRUE_LABEL}{position}");
            let join = format!("{JOIN_LABEL}{position}");
            binary_header(out);
            out.op("D=D-M")
                .at(&on_true)
                .op(&format!("D;{jump}"))
                .op("D=0")
                .at(&join)
                .op("0;JMP")
                .label(&on_true)
                .op("D=-1")
                .label(&join)
                .top()
                .op("M=D");
        }
    }
}

/// Output name of a user-declared label.
pub fn user_label(symbol: &Symbol) -> String {
    format!("{USER_LABEL_PREFIX}{symbol}")
}

fn branch(out: &mut Asm, kind: BranchKind, symbol: &Symbol) {
    let target = user_label(symbol);
    match kind {
        BranchKind::Label => {
            out.label(target);
        }
        BranchKind::Goto => {
            out.at(target).op("0;JMP");
        }
        BranchKind::IfGoto => {
            out.pop_d().at(target).op("D;JNE");
        }
    }
}

/// Saves the caller frame, then zeroes `num_locals` fresh slots and moves SP past them.
fn prologue(out: &mut Asm, num_locals: u16) {
    for register in SAVED_FRAME {
        out.at(register).op("D=M").push_d();
    }
    out.at(SP).op("A=M");
    for _ in 0..num_locals {
        out.op("M=0").op("A=A+1");
    }
    out.op("D=A").at(SP).op("M=D");
}
