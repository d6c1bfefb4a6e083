//! Line-oriented writer for target assembly text.
//!
//! Every emitted line ends with `\n`, so blocks concatenate without separators.

use std::fmt::{Display, Write};

/// Stack pointer register.
pub const SP: &str = "SP";
/// Scratch register used to hold a computed target address across a pop.
pub const SCRATCH: &str = "R13";

/// Accumulates assembly lines.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Asm {
    text: String,
}

impl Asm {
    pub fn new() -> Self {
        Self::default()
    }

    /// `// text`
    pub fn comment(&mut self, text: impl Display) -> &mut Self {
        let _ = writeln!(self.text, "// {text}");
        self
    }

    /// `@target` (load an address or constant into A).
    pub fn at(&mut self, target: impl Display) -> &mut Self {
        let _ = writeln!(self.text, "@{target}");
        self
    }

    /// A compute instruction such as `D=M` or `D;JNE`.
    pub fn op(&mut self, instruction: &str) -> &mut Self {
        self.text.push_str(instruction);
        self.text.push('\n');
        self
    }

    /// `(name)` (branch target marker).
    pub fn label(&mut self, name: impl Display) -> &mut Self {
        let _ = writeln!(self.text, "({name})");
        self
    }

    /// Appends another fragment.
    pub fn append(&mut self, other: &Asm) -> &mut Self {
        self.text.push_str(&other.text);
        self
    }

    /// Advances the stack pointer and stores D in the new top cell.
    pub fn push_d(&mut self) -> &mut Self {
        self.at(SP).op("AM=M+1").op("A=A-1").op("M=D")
    }

    /// Retreats the stack pointer and loads the popped cell into D.
    pub fn pop_d(&mut self) -> &mut Self {
        self.at(SP).op("AM=M-1").op("D=M")
    }

    /// Points A at the current top-of-stack cell without moving the stack pointer.
    pub fn top(&mut self) -> &mut Self {
        self.at(SP).op("A=M-1")
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }
}
