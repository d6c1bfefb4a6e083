//! Emission driver and file-level entry points.
//!
//! Drives the code generator over the parsed instruction stream, numbering
//! instructions in parse order. Translation is all-or-nothing: the first error
//! aborts the unit and no partial text is returned.

use std::fmt::Write;
use std::fs;
use std::path::{Path, PathBuf};

use crate::debug;
use crate::translator::codegen::CodeGenerator;
use crate::translator::config::Config;
use crate::translator::errors::TranslateError;
use crate::translator::parser::{SourceInstruction, parse};

/// Extension of VM source files.
pub const SOURCE_EXTENSION: &str = "vm";
/// Extension of emitted assembly files.
pub const OUTPUT_EXTENSION: &str = "asm";

/// Result of translating one unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    /// Assembly text; every line is newline-terminated.
    pub assembly: String,
    /// Number of instructions translated.
    pub instructions: usize,
}

/// 1-based character column of the first non-blank character of `line_no`.
fn first_column(source: &str, line_no: usize) -> usize {
    source
        .lines()
        .nth(line_no.saturating_sub(1))
        .and_then(|line| line.chars().position(|c| !c.is_whitespace()))
        .map_or(1, |pos| pos + 1)
}

/// Translates a whole unit.
pub fn translate_source(source: &str, config: &Config) -> Result<Translation, TranslateError> {
    config.validate()?;
    let generator = CodeGenerator::new(&config.unit, config.annotate)?;

    let mut assembly = String::new();
    let mut position = 0;
    for item in parse(source) {
        let SourceInstruction { line, instruction } = item?;
        let block = generator
            .generate(&instruction, position)
            .map_err(|e| e.at(line, first_column(source, line)))?;
        assembly.push_str(&block);
        position += 1;
    }

    Ok(Translation {
        assembly,
        instructions: position,
    })
}

/// Derives the unit name from a path's file stem.
pub fn unit_name_for(path: &Path) -> Result<String, TranslateError> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    let config = Config::new(stem);
    config.validate()?;
    Ok(config.unit)
}

/// Maps `X.vm` to `X.asm`. Returns `None` for any other extension.
pub fn output_path_for(input: &Path) -> Option<PathBuf> {
    match input.extension().and_then(|e| e.to_str()) {
        Some(SOURCE_EXTENSION) => Some(input.with_extension(OUTPUT_EXTENSION)),
        _ => None,
    }
}

/// Reads and translates a source file.
///
/// The unit is named `unit` when given, else after the file stem. On failure a
/// compiler-style diagnostic is written to stderr before the error is returned.
pub fn translate_file<P: AsRef<Path>>(
    path: P,
    unit: Option<&str>,
    annotate: bool,
) -> Result<Translation, TranslateError> {
    let path_ref = path.as_ref();
    let file = path_ref.display().to_string();
    let mut source = String::new();

    let result = (|| {
        let unit = match unit {
            Some(unit) => unit.to_string(),
            None => unit_name_for(path_ref)?,
        };
        let config = Config::new(unit).with_annotations(annotate);
        source = fs::read_to_string(path_ref).map_err(|e| TranslateError::Io {
            path: file.clone(),
            source: e,
        })?;
        translate_source(&source, &config)
    })();

    match &result {
        Ok(translation) => debug!(
            "{}: {} instruction(s), {} byte(s) of assembly",
            file,
            translation.instructions,
            translation.assembly.len()
        ),
        Err(err) => eprint!("{}", render_diagnostic(&file, &source, err)),
    }
    result
}

/// Formats a compiler-style diagnostic for a translation failure.
///
/// Located errors get a source excerpt with a caret under the offending token;
/// others are rendered as a single `error:` line.
pub fn render_diagnostic(file: &str, source: &str, err: &TranslateError) -> String {
    let mut diag = String::new();
    let _ = writeln!(diag, "error: {}", err.root());

    if let Some((line, offset)) = err.location() {
        let _ = writeln!(diag, " --> {file}:{line}:{offset}");
        if let Some(raw_line) = source.lines().nth(line.saturating_sub(1)) {
            let line_text = raw_line.trim_end_matches('\r');
            let underline = " ".repeat(offset.saturating_sub(1));
            let _ = writeln!(diag, "  |");
            let _ = writeln!(diag, "{:>4} | {}", line, line_text);
            let _ = writeln!(diag, "  | {}^", underline);
        }
    }

    diag
}
