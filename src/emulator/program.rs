//! Symbolic assembly loader.
//!
//! Two passes over the text: the first records the instruction address of
//! every `(LABEL)`, the second decodes instructions and allocates each unseen
//! non-label symbol a RAM cell, starting at [`FIRST_VARIABLE`].
//!
//! # Syntax
//!
//! ```text
//! @value | @symbol        // load A
//! dest=comp;jump          // dest and jump are optional
//! (LABEL)                 // names the next instruction
//! ```
//!
//! Whitespace inside an instruction is ignored.

use std::collections::HashMap;

use crate::emulator::errors::EmulatorError;
use crate::translator::validate::is_symbol;

/// RAM address of the first allocated variable.
pub const FIRST_VARIABLE: u16 = 16;
/// Largest `@value` literal.
pub const MAX_CONSTANT: u16 = 0x7FFF;
/// Number of instruction slots in ROM.
pub const ROM_SIZE: usize = 1 << 15;

const PREDEFINED: [(&str, u16); 7] = [
    ("SP", 0),
    ("LCL", 1),
    ("ARG", 2),
    ("THIS", 3),
    ("THAT", 4),
    ("SCREEN", 16384),
    ("KBD", 24576),
];

/// ALU function of a C-instruction, with `A` standing for either A or M.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum AluOp {
    Zero,
    One,
    MinusOne,
    D,
    A,
    NotD,
    NotA,
    NegD,
    NegA,
    DPlusOne,
    APlusOne,
    DMinusOne,
    AMinusOne,
    DPlusA,
    DMinusA,
    AMinusD,
    DAndA,
    DOrA,
}

const ALU_TABLE: [(&str, AluOp); 18] = [
    ("0", AluOp::Zero),
    ("1", AluOp::One),
    ("-1", AluOp::MinusOne),
    ("D", AluOp::D),
    ("A", AluOp::A),
    ("!D", AluOp::NotD),
    ("!A", AluOp::NotA),
    ("-D", AluOp::NegD),
    ("-A", AluOp::NegA),
    ("D+1", AluOp::DPlusOne),
    ("A+1", AluOp::APlusOne),
    ("D-1", AluOp::DMinusOne),
    ("A-1", AluOp::AMinusOne),
    ("D+A", AluOp::DPlusA),
    ("D-A", AluOp::DMinusA),
    ("A-D", AluOp::AMinusD),
    ("D&A", AluOp::DAndA),
    ("D|A", AluOp::DOrA),
];

impl AluOp {
    /// Evaluates with 16-bit wrapping arithmetic; `y` is A or M.
    pub fn eval(self, d: u16, y: u16) -> u16 {
        match self {
            AluOp::Zero => 0,
            AluOp::One => 1,
            AluOp::MinusOne => u16::MAX,
            AluOp::D => d,
            AluOp::A => y,
            AluOp::NotD => !d,
            AluOp::NotA => !y,
            AluOp::NegD => d.wrapping_neg(),
            AluOp::NegA => y.wrapping_neg(),
            AluOp::DPlusOne => d.wrapping_add(1),
            AluOp::APlusOne => y.wrapping_add(1),
            AluOp::DMinusOne => d.wrapping_sub(1),
            AluOp::AMinusOne => y.wrapping_sub(1),
            AluOp::DPlusA => d.wrapping_add(y),
            AluOp::DMinusA => d.wrapping_sub(y),
            AluOp::AMinusD => y.wrapping_sub(d),
            AluOp::DAndA => d & y,
            AluOp::DOrA => d | y,
        }
    }
}

/// Computation field: ALU function plus whether `y` is read from memory.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Comp {
    pub op: AluOp,
    pub reads_memory: bool,
}

/// Destination registers of a C-instruction.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Dest {
    pub a: bool,
    pub d: bool,
    pub m: bool,
}

/// Jump condition, tested against the computed value as a signed word.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum Jump {
    #[default]
    Never,
    Gt,
    Eq,
    Ge,
    Lt,
    Ne,
    Le,
    Always,
}

impl Jump {
    pub fn taken(self, value: u16) -> bool {
        let v = value as i16;
        match self {
            Jump::Never => false,
            Jump::Gt => v > 0,
            Jump::Eq => v == 0,
            Jump::Ge => v >= 0,
            Jump::Lt => v < 0,
            Jump::Ne => v != 0,
            Jump::Le => v <= 0,
            Jump::Always => true,
        }
    }
}

/// One decoded instruction.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Op {
    /// `@value`
    Load(u16),
    /// `dest=comp;jump`
    Compute { dest: Dest, comp: Comp, jump: Jump },
}

/// Decoded program plus its resolved symbol table.
#[derive(Debug, Clone)]
pub struct Program {
    pub ops: Vec<Op>,
    pub symbols: HashMap<String, u16>,
}

impl Program {
    /// Instruction address of a label, or RAM address of a variable.
    pub fn symbol(&self, name: &str) -> Option<u16> {
        self.symbols.get(name).copied()
    }
}

/// Strips the comment and all whitespace from a line.
fn clean(line: &str) -> String {
    let code = match line.find("//") {
        Some(pos) => &line[..pos],
        None => line,
    };
    code.split_whitespace().collect()
}

fn label_name(text: &str) -> Option<&str> {
    text.strip_prefix('(')?.strip_suffix(')')
}

fn predefined_symbols() -> HashMap<String, u16> {
    let mut symbols: HashMap<String, u16> = PREDEFINED
        .iter()
        .map(|(name, addr)| (name.to_string(), *addr))
        .collect();
    for r in 0..16u16 {
        symbols.insert(format!("R{r}"), r);
    }
    symbols
}

fn parse_comp(line: usize, text: &str) -> Result<Comp, EmulatorError> {
    let reads_memory = text.contains('M');
    if reads_memory && text.contains('A') {
        return Err(EmulatorError::InvalidComputation {
            line,
            comp: text.to_string(),
        });
    }
    let normalized = text.replace('M', "A");
    ALU_TABLE
        .iter()
        .find(|(name, _)| *name == normalized)
        .map(|(_, op)| Comp {
            op: *op,
            reads_memory,
        })
        .ok_or_else(|| EmulatorError::InvalidComputation {
            line,
            comp: text.to_string(),
        })
}

fn parse_dest(line: usize, text: &str) -> Result<Dest, EmulatorError> {
    let invalid = || EmulatorError::InvalidDestination {
        line,
        dest: text.to_string(),
    };
    let mut dest = Dest::default();
    if text.is_empty() {
        return Err(invalid());
    }
    for c in text.chars() {
        let slot = match c {
            'A' => &mut dest.a,
            'D' => &mut dest.d,
            'M' => &mut dest.m,
            _ => return Err(invalid()),
        };
        if *slot {
            return Err(invalid());
        }
        *slot = true;
    }
    Ok(dest)
}

fn parse_jump(line: usize, text: &str) -> Result<Jump, EmulatorError> {
    match text {
        "JGT" => Ok(Jump::Gt),
        "JEQ" => Ok(Jump::Eq),
        "JGE" => Ok(Jump::Ge),
        "JLT" => Ok(Jump::Lt),
        "JNE" => Ok(Jump::Ne),
        "JLE" => Ok(Jump::Le),
        "JMP" => Ok(Jump::Always),
        _ => Err(EmulatorError::InvalidJump {
            line,
            jump: text.to_string(),
        }),
    }
}

fn parse_compute(line: usize, text: &str) -> Result<Op, EmulatorError> {
    let (dest, rest) = match text.split_once('=') {
        Some((dest, rest)) => (parse_dest(line, dest)?, rest),
        None => (Dest::default(), text),
    };
    let (comp, jump) = match rest.split_once(';') {
        Some((comp, jump)) => (comp, parse_jump(line, jump)?),
        None => (rest, Jump::Never),
    };
    Ok(Op::Compute {
        dest,
        comp: parse_comp(line, comp)?,
        jump,
    })
}

/// Parses symbolic assembly into a [`Program`].
pub fn load(source: &str) -> Result<Program, EmulatorError> {
    let mut symbols = predefined_symbols();
    let mut labels: HashMap<String, u16> = HashMap::new();

    // First pass: label addresses
    let mut lines = Vec::new();
    for (idx, raw) in source.lines().enumerate() {
        let line = idx + 1;
        let text = clean(raw);
        if text.is_empty() {
            continue;
        }
        if let Some(name) = label_name(&text) {
            if !is_symbol(name) {
                return Err(EmulatorError::InvalidSymbol {
                    line,
                    symbol: name.to_string(),
                });
            }
            if labels.contains_key(name) || symbols.contains_key(name) {
                return Err(EmulatorError::DuplicateLabel {
                    line,
                    label: name.to_string(),
                });
            }
            labels.insert(name.to_string(), lines.len() as u16);
            continue;
        }
        if lines.len() == ROM_SIZE {
            return Err(EmulatorError::ProgramTooLarge {
                line,
                max: ROM_SIZE,
            });
        }
        lines.push((line, text));
    }
    symbols.extend(labels);

    // Second pass: decode, allocating variables on first use
    let mut next_variable = FIRST_VARIABLE;
    let mut ops = Vec::with_capacity(lines.len());
    for (line, text) in lines {
        let op = match text.strip_prefix('@') {
            Some(value) if value.starts_with(|c: char| c.is_ascii_digit()) => {
                match value.parse::<u16>() {
                    Ok(v) if v <= MAX_CONSTANT => Op::Load(v),
                    Ok(_) => {
                        return Err(EmulatorError::ConstantOutOfRange {
                            line,
                            value: value.to_string(),
                        });
                    }
                    Err(_) if value.bytes().all(|b| b.is_ascii_digit()) => {
                        return Err(EmulatorError::ConstantOutOfRange {
                            line,
                            value: value.to_string(),
                        });
                    }
                    Err(_) => {
                        return Err(EmulatorError::Syntax {
                            line,
                            text: text.clone(),
                        });
                    }
                }
            }
            Some(name) => {
                if !is_symbol(name) {
                    return Err(EmulatorError::InvalidSymbol {
                        line,
                        symbol: name.to_string(),
                    });
                }
                match symbols.get(name) {
                    Some(addr) => Op::Load(*addr),
                    None => {
                        if next_variable > MAX_CONSTANT {
                            return Err(EmulatorError::OutOfMemory {
                                line,
                                symbol: name.to_string(),
                            });
                        }
                        let addr = next_variable;
                        next_variable += 1;
                        symbols.insert(name.to_string(), addr);
                        Op::Load(addr)
                    }
                }
            }
            None if text.starts_with('(') => {
                return Err(EmulatorError::Syntax {
                    line,
                    text: text.clone(),
                });
            }
            None => parse_compute(line, &text)?,
        };
        ops.push(op);
    }

    Ok(Program { ops, symbols })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predefined_and_variables() {
        let program = load("@SP\n@R13\n@counter\n@other\n@counter\n@SCREEN\n").unwrap();
        assert_eq!(
            program.ops,
            vec![
                Op::Load(0),
                Op::Load(13),
                Op::Load(16),
                Op::Load(17),
                Op::Load(16),
                Op::Load(16384),
            ]
        );
        assert_eq!(program.symbol("counter"), Some(16));
    }

    #[test]
    fn program_must_fit_in_rom() {
        let full = "D=0\n".repeat(ROM_SIZE);
        assert_eq!(load(&full).unwrap().ops.len(), ROM_SIZE);

        // labels take no slot
        let labelled = format!("{full}(END)\n");
        assert_eq!(load(&labelled).unwrap().symbol("END"), Some(ROM_SIZE as u16));

        let over = "D=0\n".repeat(ROM_SIZE + 1);
        assert!(matches!(
            load(&over),
            Err(EmulatorError::ProgramTooLarge {
                line,
                max: ROM_SIZE,
            }) if line == ROM_SIZE + 1
        ));
    }

    #[test]
    fn variables_must_fit_in_ram() {
        let slots = (MAX_CONSTANT - FIRST_VARIABLE) as usize + 1;
        let fits: String = (0..slots).map(|i| format!("@v{i}\n")).collect();
        let program = load(&fits).unwrap();
        assert_eq!(program.symbol(&format!("v{}", slots - 1)), Some(MAX_CONSTANT));

        // reusing a variable needs no new cell
        let reused = format!("{fits}@v0\n");
        assert!(load(&reused).is_ok());

        let over = format!("{fits}@extra\n");
        assert!(matches!(
            load(&over),
            Err(EmulatorError::OutOfMemory { line, ref symbol }) if line == slots + 1 && symbol == "extra"
        ));
    }

    #[test]
    fn labels_resolve_to_instruction_addresses() {
        let program = load("// start\n@END\n0;JMP\n(END)\n@END\n0;JMP\n").unwrap();
        assert_eq!(program.symbol("END"), Some(2));
        assert_eq!(program.ops[0], Op::Load(2));
    }

    #[test]
    fn duplicate_labels_rejected() {
        assert!(matches!(
            load("(A1)\n(A1)\n"),
            Err(EmulatorError::DuplicateLabel { line: 2, .. })
        ));
        assert!(matches!(
            load("(SP)\n"),
            Err(EmulatorError::DuplicateLabel { .. })
        ));
    }

    #[test]
    fn compute_fields() {
        let program = load("AM = M+1\nD;JNE\nM=D&M\n").unwrap();
        assert_eq!(
            program.ops[0],
            Op::Compute {
                dest: Dest {
                    a: true,
                    d: false,
                    m: true
                },
                comp: Comp {
                    op: AluOp::APlusOne,
                    reads_memory: true
                },
                jump: Jump::Never
            }
        );
        assert!(matches!(
            program.ops[1],
            Op::Compute {
                jump: Jump::Ne,
                ..
            }
        ));
    }

    #[test]
    fn rejects_non_standard_forms() {
        assert!(matches!(
            load("M=M&D\n"),
            Err(EmulatorError::InvalidComputation { .. })
        ));
        assert!(matches!(
            load("D=A+M\n"),
            Err(EmulatorError::InvalidComputation { .. })
        ));
        assert!(matches!(
            load("X=D\n"),
            Err(EmulatorError::InvalidDestination { .. })
        ));
        assert!(matches!(
            load("0;JUMP\n"),
            Err(EmulatorError::InvalidJump { .. })
        ));
        assert!(matches!(
            load("@32768\n"),
            Err(EmulatorError::ConstantOutOfRange { .. })
        ));
        assert!(matches!(load("@9x\n"), Err(EmulatorError::Syntax { .. })));
    }

    #[test]
    fn jump_conditions_are_signed() {
        assert!(Jump::Lt.taken(0xFFFF));
        assert!(!Jump::Gt.taken(0x8000));
        assert!(Jump::Eq.taken(0));
        assert!(!Jump::Never.taken(0));
    }

    #[test]
    fn alu_wraps() {
        assert_eq!(AluOp::DPlusA.eval(0x7FFF, 1), 0x8000);
        assert_eq!(AluOp::NegA.eval(0, 1), 0xFFFF);
        assert_eq!(AluOp::AMinusD.eval(3, 5), 2);
    }
}
