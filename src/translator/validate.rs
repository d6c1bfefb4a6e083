//! Range, bounds and name checks shared by the parser and the code generator.

use crate::translator::errors::TranslateError;

/// Largest index a stack operation may carry (`0x7FFF`).
pub const MAX_INDEX: u16 = 0x7FFF;
/// Largest number of locals a function may declare.
pub const MAX_LOCALS: u16 = 1024;

/// Returns true if `name` matches `[A-Za-z_.$:][A-Za-z0-9_.$:]*`.
pub fn is_symbol(name: &str) -> bool {
    let is_head = |c: char| c.is_ascii_alphabetic() || matches!(c, '_' | '.' | '$' | ':');
    let mut chars = name.chars();
    match chars.next() {
        Some(head) if is_head(head) => chars.all(|c| is_head(c) || c.is_ascii_digit()),
        _ => false,
    }
}

/// Checks a label or function name against the identifier grammar.
pub fn check_symbol(name: &str) -> Result<(), TranslateError> {
    if is_symbol(name) {
        Ok(())
    } else {
        Err(TranslateError::InvalidSymbol {
            symbol: name.to_string(),
        })
    }
}

/// Checks that a unit name yields valid `<unit>.<index>` static symbols.
pub fn check_unit_name(name: &str) -> Result<(), TranslateError> {
    if is_symbol(name) {
        Ok(())
    } else {
        Err(TranslateError::InvalidUnitName {
            name: name.to_string(),
        })
    }
}

/// Parses an unsigned base-10 literal. Digits only: no sign, no radix prefix.
///
/// Returns `None` for a well-formed literal too large for `u32`.
fn parse_digits(tok: &str) -> Result<Option<u32>, TranslateError> {
    if tok.is_empty() || !tok.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TranslateError::NotANumber {
            token: tok.to_string(),
        });
    }
    Ok(tok.parse::<u32>().ok())
}

/// Parses a stack operation index in `[0, MAX_INDEX]`.
pub fn parse_index(tok: &str) -> Result<u16, TranslateError> {
    match parse_digits(tok)? {
        Some(value) if value <= MAX_INDEX as u32 => Ok(value as u16),
        _ => Err(TranslateError::OutOfRange {
            token: tok.to_string(),
            max: MAX_INDEX,
        }),
    }
}

/// Parses a function's local count in `[0, MAX_LOCALS]`.
pub fn parse_locals(tok: &str) -> Result<u16, TranslateError> {
    match parse_digits(tok)? {
        Some(value) if value <= MAX_LOCALS as u32 => Ok(value as u16),
        _ => Err(TranslateError::TooManyLocals {
            count: tok.to_string(),
            max: MAX_LOCALS,
        }),
    }
}

/// Checks `index < size` for a fixed-base segment.
pub fn check_bounds(segment: &'static str, index: u16, size: u16) -> Result<(), TranslateError> {
    if index < size {
        Ok(())
    } else {
        Err(TranslateError::OutOfBounds {
            segment,
            index,
            size,
        })
    }
}

/// Checks the token count of a command line, not counting the command itself.
pub fn check_arity(command: &str, expected: usize, actual: usize) -> Result<(), TranslateError> {
    if expected == actual {
        Ok(())
    } else {
        Err(TranslateError::ArityMismatch {
            command: command.to_string(),
            expected,
            actual,
        })
    }
}
