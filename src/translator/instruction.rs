//! Instruction model.
//!
//! The [`for_each_arithmetic!`](crate::for_each_arithmetic) macro holds the
//! canonical arithmetic/logic command table and invokes a callback macro for
//! code generation, so the mnemonic set and the lowering shape of each command
//! are declared in exactly one place.
//!
//! This module generates:
//! - The [`ArithmeticOp`] enum with mnemonic lookups
//! - [`ArithmeticOp::lowering`], consumed by the
//!   [`codegen`](super::codegen) module

use std::fmt;

use crate::translator::errors::TranslateError;
use crate::translator::segment::Segment;
use crate::translator::validate::check_symbol;

/// Invokes a callback macro with the complete arithmetic command list.
#[macro_export]
macro_rules! for_each_arithmetic {
    ($callback:ident) => {
        $callback! {
            // =========================
            // Binary, in place
            // =========================
            /// add ; x + y
            Add, "add" => Binary("M=D+M"),
            /// sub ; x - y
            Sub, "sub" => Binary("M=M-D"),
            /// and ; x & y (bitwise)
            And, "and" => Binary("M=D&M"),
            /// or ; x | y (bitwise)
            Or, "or" => Binary("M=D|M"),
            // =========================
            // Unary, in place
            // =========================
            /// neg ; -y
            Neg, "neg" => Unary("M=-M"),
            /// not ; !y (bitwise)
            Not, "not" => Unary("M=!M"),
            // =========================
            // Comparison (true = -1, false = 0)
            // =========================
            /// eq ; x == y
            Eq, "eq" => Compare("JEQ"),
            /// gt ; x > y, tested as (y - x) < 0
            /// (the subtraction wraps, so the result is wrong once |x - y| >= 2^15)
            Gt, "gt" => Compare("JLT"),
            /// lt ; x < y, tested as (y - x) > 0
            /// (same 16-bit wrap as gt)
            Lt, "lt" => Compare("JGT"),
        }
    };
}

#[macro_export]
macro_rules! define_arithmetic {
    (
        $(
            $(#[$doc:meta])*
            $name:ident, $mnemonic:literal => $shape:ident($arg:literal)
        ),* $(,)?
    ) => {
        /// Stack arithmetic and logic commands.
        #[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
        pub enum ArithmeticOp {
            $(
                $(#[$doc])*
                $name,
            )*
        }

        impl ArithmeticOp {
            /// All commands in table order.
            pub const ALL: &'static [ArithmeticOp] = &[$( ArithmeticOp::$name, )*];

            pub const fn mnemonic(&self) -> &'static str {
                match self {
                    $( ArithmeticOp::$name => $mnemonic, )*
                }
            }

            pub fn from_mnemonic(word: &str) -> Option<Self> {
                match word {
                    $( $mnemonic => Some(ArithmeticOp::$name), )*
                    _ => None,
                }
            }

            /// How the command is lowered to target code.
            pub const fn lowering(&self) -> Lowering {
                match self {
                    $( ArithmeticOp::$name => Lowering::$shape($arg), )*
                }
            }
        }
    };
}

for_each_arithmetic!(define_arithmetic);

/// Lowering shape of an [`ArithmeticOp`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Lowering {
    /// Pop `y` into D, address `x` in place, then apply the computation.
    Binary(&'static str),
    /// Rewrite the top of stack in place with the computation.
    Unary(&'static str),
    /// Compute `y - x` as for a binary op, then branch on the jump condition.
    Compare(&'static str),
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum StackKind {
    Push,
    Pop,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum BranchKind {
    Label,
    Goto,
    IfGoto,
}

impl StackKind {
    pub const fn keyword(self) -> &'static str {
        match self {
            StackKind::Push => "push",
            StackKind::Pop => "pop",
        }
    }
}

impl BranchKind {
    pub const fn keyword(self) -> &'static str {
        match self {
            BranchKind::Label => "label",
            BranchKind::Goto => "goto",
            BranchKind::IfGoto => "if-goto",
        }
    }
}

/// Identifier matching `[A-Za-z_.$:][A-Za-z0-9_.$:]*`.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Symbol(String);

impl Symbol {
    pub fn new(name: &str) -> Result<Self, TranslateError> {
        check_symbol(name)?;
        Ok(Symbol(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One parsed VM command.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Instruction {
    StackOp {
        kind: StackKind,
        segment: Segment,
        index: u16,
    },
    ArithmeticOp(ArithmeticOp),
    BranchOp {
        kind: BranchKind,
        symbol: Symbol,
    },
    FunctionDecl {
        name: Symbol,
        num_locals: u16,
    },
}

/// Renders the instruction in canonical source form.
impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::StackOp {
                kind,
                segment,
                index,
            } => write!(f, "{} {} {}", kind.keyword(), segment, index),
            Instruction::ArithmeticOp(op) => f.write_str(op.mnemonic()),
            Instruction::BranchOp { kind, symbol } => write!(f, "{} {}", kind.keyword(), symbol),
            Instruction::FunctionDecl { name, num_locals } => {
                write!(f, "function {} {}", name, num_locals)
            }
        }
    }
}
