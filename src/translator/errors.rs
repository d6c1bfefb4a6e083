use hackvm_derive::Error;

/// Errors that can occur while parsing or translating a compiled unit.
///
/// The core kinds are produced by the parser, the validator and the code
/// generator. [`TranslateError::Located`] wraps any of them with the source
/// position of the offending line once the emission driver knows it.
#[derive(Debug, Error)]
pub enum TranslateError {
    /// Wrong number of tokens for a command.
    #[error("'{command}' expects {expected} argument(s), got {actual}")]
    ArityMismatch {
        command: String,
        expected: usize,
        actual: usize,
    },
    /// Second token of `push`/`pop` is not a known segment.
    #[error("unknown segment '{segment}'")]
    UnknownSegment { segment: String },
    /// First token is not a command of the language.
    #[error("unrecognized command '{command}'")]
    UnrecognizedCommand { command: String },
    /// Numeric argument is not an unsigned base-10 integer.
    #[error("not a number: '{token}'")]
    NotANumber { token: String },
    /// Stack operation index outside `[0, max]`.
    #[error("index {token} out of range (max {max})")]
    OutOfRange { token: String, max: u16 },
    /// Label or function name does not match the identifier grammar.
    #[error("invalid symbol name '{symbol}'")]
    InvalidSymbol { symbol: String },
    /// Function local count outside `[0, max]`.
    #[error("function cannot have {count} locals (max {max})")]
    TooManyLocals { count: String, max: u16 },
    /// Fixed-base segment accessed past its physical size.
    #[error("index {index} is out of '{segment}' segment bounds (size {size})")]
    OutOfBounds {
        segment: &'static str,
        index: u16,
        size: u16,
    },
    /// Write requested against a segment that has no storage.
    #[error("cannot {operation}")]
    UnsupportedOperation { operation: &'static str },
    /// Unit name cannot qualify static symbols.
    #[error("invalid unit name '{name}': must be a valid symbol")]
    InvalidUnitName { name: String },
    /// File I/O error.
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// Core error decorated with its 1-based source line and column.
    #[error("line {line}:{offset}: {source}")]
    Located {
        line: usize,
        offset: usize,
        #[source]
        source: Box<TranslateError>,
    },
}

impl TranslateError {
    /// Attaches a source position unless the error already carries one.
    pub fn at(self, line: usize, offset: usize) -> Self {
        match self {
            located @ TranslateError::Located { .. } => located,
            other => TranslateError::Located {
                line,
                offset,
                source: Box::new(other),
            },
        }
    }

    /// Returns the underlying error kind, looking through [`TranslateError::Located`].
    pub fn root(&self) -> &TranslateError {
        match self {
            TranslateError::Located { source, .. } => source.root(),
            other => other,
        }
    }

    /// Returns `(line, offset)` for located errors.
    pub fn location(&self) -> Option<(usize, usize)> {
        match self {
            TranslateError::Located { line, offset, .. } => Some((*line, *offset)),
            _ => None,
        }
    }
}
