use hackvm_derive::Error;

/// Errors that can occur while loading or running target assembly.
#[derive(Debug, Error)]
pub enum EmulatorError {
    /// Line is neither an A-instruction, a C-instruction nor a label.
    #[error("line {line}: cannot parse '{text}'")]
    Syntax { line: usize, text: String },
    /// `@value` literal above the 15-bit range.
    #[error("line {line}: constant {value} does not fit in 15 bits")]
    ConstantOutOfRange { line: usize, value: String },
    /// Computation field not in the instruction table.
    #[error("line {line}: invalid computation '{comp}'")]
    InvalidComputation { line: usize, comp: String },
    /// Destination field not a combination of A, D and M.
    #[error("line {line}: invalid destination '{dest}'")]
    InvalidDestination { line: usize, dest: String },
    /// Jump field not one of the seven conditions.
    #[error("line {line}: invalid jump '{jump}'")]
    InvalidJump { line: usize, jump: String },
    /// Label or variable name does not match the symbol grammar.
    #[error("line {line}: invalid symbol '{symbol}'")]
    InvalidSymbol { line: usize, symbol: String },
    /// Same label declared twice.
    #[error("line {line}: label '{label}' already defined")]
    DuplicateLabel { line: usize, label: String },
    /// More instructions than ROM slots.
    #[error("line {line}: program exceeds {max} instructions")]
    ProgramTooLarge { line: usize, max: usize },
    /// Every RAM cell from the first variable address up is taken.
    #[error("line {line}: no RAM left for variable '{symbol}'")]
    OutOfMemory { line: usize, symbol: String },
    /// Memory access through `M` with `A` past the end of RAM.
    #[error("memory access at {address} out of bounds (pc {pc})")]
    MemoryOutOfBounds { address: u16, pc: usize },
    /// Program did not halt within the step budget.
    #[error("program did not halt within {limit} steps")]
    StepLimitExceeded { limit: u64 },
}
