//! Line-oriented parser for the VM language.
//!
//! # Syntax
//!
//! ```text
//! push <segment> <index>      pop <segment> <index>
//! add | sub | neg | eq | gt | lt | and | or | not
//! label <symbol>  | goto <symbol> | if-goto <symbol>
//! function <name> <num_locals>
//! ```
//!
//! - `//` starts a comment that runs to the end of the line
//! - Blank lines are skipped
//! - Tokens are separated by any whitespace
//!
//! [`parse`] is lazy: each call to `next` consumes source lines until one
//! instruction is produced. The first malformed line ends the sequence.

use std::iter::Enumerate;
use std::str::Lines;

use crate::translator::errors::TranslateError;
use crate::translator::instruction::{ArithmeticOp, BranchKind, Instruction, StackKind, Symbol};
use crate::translator::segment::Segment;
use crate::translator::validate::{check_arity, parse_index, parse_locals};

const COMMENT_MARKER: &str = "//";

#[derive(Debug, Clone, Copy)]
struct Token<'a> {
    text: &'a str,
    /// 1-based column in characters, not bytes.
    offset: usize,
}

/// Splits the code part of a line into whitespace-separated tokens.
fn tokenize(line: &str) -> Vec<Token<'_>> {
    let code = match line.find(COMMENT_MARKER) {
        Some(pos) => &line[..pos],
        None => line,
    };

    let mut out = Vec::with_capacity(3);
    // (byte index, column) of the token being read
    let mut start: Option<(usize, usize)> = None;
    for (col, (i, c)) in code.char_indices().enumerate() {
        if c.is_whitespace() {
            if let Some((s, offset)) = start.take() {
                out.push(Token {
                    text: &code[s..i],
                    offset,
                });
            }
        } else if start.is_none() {
            start = Some((i, col + 1));
        }
    }
    if let Some((s, offset)) = start {
        out.push(Token {
            text: &code[s..],
            offset,
        });
    }
    out
}

/// Parses one non-empty token list. Errors carry the column of the token at fault.
fn parse_tokens(line_no: usize, tokens: &[Token]) -> Result<Instruction, TranslateError> {
    let head = tokens[0];
    let args = &tokens[1..];
    // column of the argument at `i`, or of the command when the argument is missing
    let column = |i: usize| args.get(i).map(|t| t.offset).unwrap_or(head.offset);
    let locate = |i: usize| move |e: TranslateError| e.at(line_no, column(i));

    match head.text {
        "push" | "pop" => {
            check_arity(head.text, 2, args.len()).map_err(locate(args.len()))?;
            let kind = if head.text == "push" {
                StackKind::Push
            } else {
                StackKind::Pop
            };
            let segment = args[0].text.parse::<Segment>().map_err(locate(0))?;
            let index = parse_index(args[1].text).map_err(locate(1))?;
            Ok(Instruction::StackOp {
                kind,
                segment,
                index,
            })
        }
        "label" | "goto" | "if-goto" => {
            check_arity(head.text, 1, args.len()).map_err(locate(args.len()))?;
            let kind = match head.text {
                "label" => BranchKind::Label,
                "goto" => BranchKind::Goto,
                _ => BranchKind::IfGoto,
            };
            let symbol = Symbol::new(args[0].text).map_err(locate(0))?;
            Ok(Instruction::BranchOp { kind, symbol })
        }
        "function" => {
            check_arity(head.text, 2, args.len()).map_err(locate(args.len()))?;
            let name = Symbol::new(args[0].text).map_err(locate(0))?;
            let num_locals = parse_locals(args[1].text).map_err(locate(1))?;
            Ok(Instruction::FunctionDecl { name, num_locals })
        }
        word => match ArithmeticOp::from_mnemonic(word) {
            Some(op) => {
                check_arity(word, 0, args.len()).map_err(locate(0))?;
                Ok(Instruction::ArithmeticOp(op))
            }
            None => Err(TranslateError::UnrecognizedCommand {
                command: word.to_string(),
            }
            .at(line_no, head.offset)),
        },
    }
}

/// Parses a single source line.
///
/// Returns `Ok(None)` for blank and comment-only lines. `line_no` is 1-based
/// and only used to locate errors.
pub fn parse_line(line_no: usize, line: &str) -> Result<Option<Instruction>, TranslateError> {
    let tokens = tokenize(line);
    if tokens.is_empty() {
        return Ok(None);
    }
    parse_tokens(line_no, &tokens).map(Some)
}

/// An instruction together with the 1-based line it was parsed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceInstruction {
    pub line: usize,
    pub instruction: Instruction,
}

/// Lazy instruction stream over a source text.
///
/// Cloning yields an independent cursor at the same position; [`parse`] on the
/// same text restarts from the beginning.
#[derive(Debug, Clone)]
pub struct Parser<'a> {
    lines: Enumerate<Lines<'a>>,
    failed: bool,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            lines: source.lines().enumerate(),
            failed: false,
        }
    }
}

impl Iterator for Parser<'_> {
    type Item = Result<SourceInstruction, TranslateError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        for (idx, line) in self.lines.by_ref() {
            let line_no = idx + 1;
            match parse_line(line_no, line) {
                Ok(None) => continue,
                Ok(Some(instruction)) => {
                    return Some(Ok(SourceInstruction {
                        line: line_no,
                        instruction,
                    }));
                }
                Err(err) => {
                    self.failed = true;
                    return Some(Err(err));
                }
            }
        }
        None
    }
}

impl std::iter::FusedIterator for Parser<'_> {}

/// Returns a lazy parser over `source`.
pub fn parse(source: &str) -> Parser<'_> {
    Parser::new(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_one(line: &str) -> Result<Instruction, TranslateError> {
        parse_line(1, line).map(|i| i.expect("line holds an instruction"))
    }

    fn root_of(line: &str) -> TranslateError {
        match parse_one(line) {
            Err(TranslateError::Located { source, .. }) => *source,
            other => panic!("expected a located error, got {other:?}"),
        }
    }

    #[test]
    fn tokenize_tracks_columns() {
        let tokens = tokenize("  push\tlocal  3 // trailing");
        let got: Vec<_> = tokens.iter().map(|t| (t.text, t.offset)).collect();
        assert_eq!(got, vec![("push", 3), ("local", 8), ("3", 15)]);
    }

    #[test]
    fn columns_count_characters() {
        // U+3000 is a three-byte whitespace character
        let tokens = tokenize("push\u{3000}heap 1");
        let got: Vec<_> = tokens.iter().map(|t| (t.text, t.offset)).collect();
        assert_eq!(got, vec![("push", 1), ("heap", 6), ("1", 11)]);

        let err = parse_line(3, "push\u{3000}heap 1").unwrap_err();
        assert_eq!(err.location(), Some((3, 6)));
    }

    #[test]
    fn blank_and_comment_lines_are_skipped() {
        assert_eq!(parse_line(1, "").unwrap(), None);
        assert_eq!(parse_line(1, "   \t ").unwrap(), None);
        assert_eq!(parse_line(1, "// push constant 1").unwrap(), None);
    }

    #[test]
    fn comment_needs_no_space() {
        assert_eq!(
            parse_one("add// sum").unwrap(),
            Instruction::ArithmeticOp(ArithmeticOp::Add)
        );
    }

    #[test]
    fn stack_ops() {
        assert_eq!(
            parse_one("pop that 6").unwrap(),
            Instruction::StackOp {
                kind: StackKind::Pop,
                segment: Segment::That,
                index: 6
            }
        );
        assert!(matches!(root_of("push heap 1"), TranslateError::UnknownSegment { .. }));
        assert!(matches!(root_of("push constant x"), TranslateError::NotANumber { .. }));
        assert!(matches!(root_of("push constant -1"), TranslateError::NotANumber { .. }));
        assert!(matches!(root_of("push constant 32768"), TranslateError::OutOfRange { .. }));
        assert!(matches!(root_of("push constant"), TranslateError::ArityMismatch { .. }));
        assert!(matches!(
            root_of("push constant 1 2"),
            TranslateError::ArityMismatch { .. }
        ));
        assert!(parse_one("push constant 32767").is_ok());
    }

    #[test]
    fn arithmetic_arity() {
        assert!(matches!(
            root_of("add 5"),
            TranslateError::ArityMismatch {
                expected: 0,
                actual: 1,
                ..
            }
        ));
    }

    #[test]
    fn branches() {
        assert_eq!(
            parse_one("if-goto LOOP$1").unwrap(),
            Instruction::BranchOp {
                kind: BranchKind::IfGoto,
                symbol: Symbol::new("LOOP$1").unwrap()
            }
        );
        assert!(matches!(root_of("label"), TranslateError::ArityMismatch { .. }));
        assert!(matches!(root_of("goto 9lives"), TranslateError::InvalidSymbol { .. }));
    }

    #[test]
    fn functions() {
        assert_eq!(
            parse_one("function Main.fib 1024").unwrap(),
            Instruction::FunctionDecl {
                name: Symbol::new("Main.fib").unwrap(),
                num_locals: 1024
            }
        );
        assert!(matches!(
            root_of("function Main.fib 1025"),
            TranslateError::TooManyLocals { .. }
        ));
        assert!(matches!(root_of("function 1 0"), TranslateError::InvalidSymbol { .. }));
    }

    #[test]
    fn unknown_command() {
        assert!(matches!(root_of("call f 0"), TranslateError::UnrecognizedCommand { .. }));
        assert!(matches!(root_of("Add"), TranslateError::UnrecognizedCommand { .. }));
    }

    #[test]
    fn errors_point_at_the_offending_token() {
        let err = parse_line(4, "  push heap 1").unwrap_err();
        assert_eq!(err.location(), Some((4, 8)));

        let err = parse_line(2, "push constant 99999").unwrap_err();
        assert_eq!(err.location(), Some((2, 15)));

        // missing arguments point at the command
        let err = parse_line(7, "   label").unwrap_err();
        assert_eq!(err.location(), Some((7, 4)));
    }

    #[test]
    fn parser_yields_lines_and_stops_after_error() {
        let source = "// header\npush constant 1\n\nneg\nbogus\nadd\n";
        let items: Vec<_> = parse(source).collect();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].as_ref().unwrap().line, 2);
        assert_eq!(items[1].as_ref().unwrap().line, 4);
        assert!(items[2].is_err());
    }

    #[test]
    fn parser_is_fused_and_restartable() {
        let source = "push constant 2\nnope\npush constant 3\n";
        let mut parser = parse(source);
        let snapshot = parser.clone();
        assert!(parser.next().unwrap().is_ok());
        assert!(parser.next().unwrap().is_err());
        assert!(parser.next().is_none());
        assert!(parser.next().is_none());
        // the clone was taken before any line was consumed
        assert_eq!(snapshot.count(), 2);
    }

    #[test]
    fn crlf_sources() {
        let items: Vec<_> = parse("push constant 1\r\nadd\r\n").collect();
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|r| r.is_ok()));
    }
}
