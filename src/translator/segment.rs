//! Segment model.
//!
//! Each of the eight segments maps `(segment, index)` onto the target machine's
//! flat memory through one of four addressing strategies (see [`Addressing`]).
//! A segment knows how to emit the fragment that reads the addressed value into
//! the accumulator (`D`) and the fragment that writes `D` back.

use std::fmt;
use std::str::FromStr;

use crate::translator::asm::{Asm, SCRATCH};
use crate::translator::errors::TranslateError;
use crate::translator::validate::check_bounds;

/// Named addressing region of the VM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Segment {
    Constant,
    Static,
    Local,
    Argument,
    This,
    That,
    Pointer,
    Temp,
}

/// How a segment resolves an index to a physical location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Addressing {
    /// No storage; the index is the value. Read-only.
    Constant,
    /// `*base + index`, where `base` names the register holding the pointer.
    Indirect { base: &'static str },
    /// `base + index`, with `index < size`.
    Fixed { base: u16, size: u16 },
    /// Symbol `<unit>.<index>` allocated by the downstream assembler.
    Static,
}

/// Code that stores `D` into a segment location.
///
/// Computing an indirect address clobbers `D`, so that part is emitted before
/// the value is loaded (`setup`) and the store itself after (`store`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteFragment {
    pub setup: Asm,
    pub store: Asm,
}

impl Segment {
    /// All segments in declaration order.
    pub const ALL: [Segment; 8] = [
        Segment::Constant,
        Segment::Static,
        Segment::Local,
        Segment::Argument,
        Segment::This,
        Segment::That,
        Segment::Pointer,
        Segment::Temp,
    ];

    /// Returns the source-language name of the segment.
    pub const fn name(self) -> &'static str {
        match self {
            Segment::Constant => "constant",
            Segment::Static => "static",
            Segment::Local => "local",
            Segment::Argument => "argument",
            Segment::This => "this",
            Segment::That => "that",
            Segment::Pointer => "pointer",
            Segment::Temp => "temp",
        }
    }

    pub const fn addressing(self) -> Addressing {
        match self {
            Segment::Constant => Addressing::Constant,
            Segment::Static => Addressing::Static,
            Segment::Local => Addressing::Indirect { base: "LCL" },
            Segment::Argument => Addressing::Indirect { base: "ARG" },
            Segment::This => Addressing::Indirect { base: "THIS" },
            Segment::That => Addressing::Indirect { base: "THAT" },
            Segment::Pointer => Addressing::Fixed { base: 3, size: 2 },
            Segment::Temp => Addressing::Fixed { base: 5, size: 8 },
        }
    }

    /// Physical address of a fixed-base location, after the bounds check.
    fn fixed_address(self, base: u16, size: u16, index: u16) -> Result<u16, TranslateError> {
        check_bounds(self.name(), index, size)?;
        Ok(base + index)
    }

    /// Emits code that loads the addressed value into `D`.
    pub fn read(self, index: u16, unit: &str) -> Result<Asm, TranslateError> {
        let mut out = Asm::new();
        match self.addressing() {
            Addressing::Constant => {
                out.at(index).op("D=A");
            }
            Addressing::Indirect { base } => {
                out.at(base).op("D=M").at(index).op("A=D+A").op("D=M");
            }
            Addressing::Fixed { base, size } => {
                out.at(self.fixed_address(base, size, index)?).op("D=M");
            }
            Addressing::Static => {
                out.at(static_symbol(unit, index)).op("D=M");
            }
        }
        Ok(out)
    }

    /// Emits code that stores `D` at the addressed location.
    pub fn write(self, index: u16, unit: &str) -> Result<WriteFragment, TranslateError> {
        let mut fragment = WriteFragment::default();
        match self.addressing() {
            Addressing::Constant => {
                return Err(TranslateError::UnsupportedOperation {
                    operation: "pop constant segment",
                });
            }
            Addressing::Indirect { base } => {
                fragment
                    .setup
                    .at(base)
                    .op("D=M")
                    .at(index)
                    .op("D=D+A")
                    .at(SCRATCH)
                    .op("M=D");
                fragment.store.at(SCRATCH).op("A=M").op("M=D");
            }
            Addressing::Fixed { base, size } => {
                fragment
                    .store
                    .at(self.fixed_address(base, size, index)?)
                    .op("M=D");
            }
            Addressing::Static => {
                fragment.store.at(static_symbol(unit, index)).op("M=D");
            }
        }
        Ok(fragment)
    }
}

/// Symbol of a static variable: `<unit>.<index>`.
pub fn static_symbol(unit: &str, index: u16) -> String {
    format!("{unit}.{index}")
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Segment {
    type Err = TranslateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Segment::ALL
            .into_iter()
            .find(|segment| segment.name() == s)
            .ok_or_else(|| TranslateError::UnknownSegment {
                segment: s.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for segment in Segment::ALL {
            assert_eq!(segment.name().parse::<Segment>().unwrap(), segment);
        }
        assert!(matches!(
            "heap".parse::<Segment>(),
            Err(TranslateError::UnknownSegment { .. })
        ));
        // names are case-sensitive
        assert!("Local".parse::<Segment>().is_err());
    }

    #[test]
    fn constant_read_is_literal() {
        let asm = Segment::Constant.read(17, "Main").unwrap();
        assert_eq!(asm.as_str(), "@17\nD=A\n");
    }

    #[test]
    fn constant_write_rejected() {
        let err = Segment::Constant.write(0, "Main").unwrap_err();
        assert!(matches!(err, TranslateError::UnsupportedOperation { .. }));
        assert_eq!(err.to_string(), "cannot pop constant segment");
    }

    #[test]
    fn indirect_read_and_write() {
        let asm = Segment::That.read(5, "Main").unwrap();
        assert_eq!(asm.as_str(), "@THAT\nD=M\n@5\nA=D+A\nD=M\n");

        let fragment = Segment::Local.write(2, "Main").unwrap();
        assert_eq!(fragment.setup.as_str(), "@LCL\nD=M\n@2\nD=D+A\n@R13\nM=D\n");
        assert_eq!(fragment.store.as_str(), "@R13\nA=M\nM=D\n");
    }

    #[test]
    fn indirect_has_no_fixed_bound() {
        assert!(Segment::Argument.read(32767, "Main").is_ok());
        assert!(Segment::Argument.write(32767, "Main").is_ok());
    }

    #[test]
    fn fixed_addresses() {
        assert_eq!(Segment::Temp.read(5, "Main").unwrap().as_str(), "@10\nD=M\n");
        assert_eq!(Segment::Pointer.read(1, "Main").unwrap().as_str(), "@4\nD=M\n");

        let fragment = Segment::Pointer.write(0, "Main").unwrap();
        assert!(fragment.setup.is_empty());
        assert_eq!(fragment.store.as_str(), "@3\nM=D\n");
    }

    #[test]
    fn fixed_bounds() {
        assert!(Segment::Temp.read(7, "Main").is_ok());
        assert!(Segment::Pointer.read(1, "Main").is_ok());
        assert!(matches!(
            Segment::Temp.read(8, "Main"),
            Err(TranslateError::OutOfBounds {
                segment: "temp",
                index: 8,
                size: 8
            })
        ));
        assert!(matches!(
            Segment::Pointer.write(2, "Main"),
            Err(TranslateError::OutOfBounds {
                segment: "pointer",
                index: 2,
                size: 2
            })
        ));
    }

    #[test]
    fn static_symbols_are_unit_qualified() {
        assert_eq!(
            Segment::Static.read(3, "Sys").unwrap().as_str(),
            "@Sys.3\nD=M\n"
        );
        assert_eq!(
            Segment::Static.write(3, "Main").unwrap().store.as_str(),
            "@Main.3\nM=D\n"
        );
    }
}
