use thiserror::Error;

/// The ways a label-regex can be malformed.
///
/// Lexing cannot fail (any non-operator run of characters is a label), so
/// every failure is structural: an operator with a missing operand, or
/// parentheses that do not pair up.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RegexErrorKind {
    /// The expression ended where a label or group was expected.
    #[error("expression ends where a label or group is expected")]
    TruncatedExpression,
    /// A postfix repetition with nothing in front of it to repeat.
    #[error("'{op}' has nothing to repeat")]
    DanglingPostfix { op: char },
    /// A `.` or `|` without an operand on one side.
    #[error("'{op}' is missing an operand")]
    MissingOperand { op: char },
    /// `()`; groups must contain an expression.
    #[error("empty group")]
    EmptyGroup,
    /// A `)` with no group open.
    #[error("unmatched ')'")]
    StrayParen,
    /// A `(` whose group never closes.
    #[error("unclosed '('")]
    UnclosedGroup,
}

/// A malformed label-regex, with the offending 1-indexed column.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{kind} at column {column}")]
pub struct RegexError {
    /// Column at which the parser gave up.
    pub column: usize,
    /// What went wrong there.
    pub kind: RegexErrorKind,
}

impl RegexError {
    /// Creates a new [`RegexError`].
    #[must_use]
    pub fn new(column: usize, kind: RegexErrorKind) -> Self {
        Self { column, kind }
    }
}

/// Error emitted while reading grammar text, with the offending line.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message} at line {line}")]
pub struct GrammarError {
    /// Line at which the error occurred (1-indexed).
    pub line: usize,
    /// Human-readable error message.
    pub message: String,
}

impl GrammarError {
    /// Creates a new [`GrammarError`].
    #[must_use]
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

/// Invariant violation in a matrix operation. Always a programmer error:
/// callers are expected to line shapes up before invoking the operation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MatrixError {
    #[error("shape mismatch in {op}: {lhs:?} vs {rhs:?}")]
    ShapeMismatch {
        op: &'static str,
        lhs: (usize, usize),
        rhs: (usize, usize),
    },
}

/// Failure loading a named dataset or CSV graph.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("unknown dataset {0:?}")]
    UnknownName(String),
    #[error("malformed csv at line {line}: {message}")]
    Malformed { line: usize, message: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Top-level failure of a query entry point.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("regex error: {0}")]
    Regex(#[from] RegexError),
    #[error("grammar error: {0}")]
    Grammar(#[from] GrammarError),
    #[error(transparent)]
    Matrix(#[from] MatrixError),
    #[error("unknown symbol {0:?}")]
    UnknownSymbol(String),
    #[error("i/o error: {0}")]
    Io(#[from] DatasetError),
    #[error("query cancelled")]
    Cancelled,
    /// Reserved for embedding front-ends that type-check query expressions.
    #[error("type mismatch: {0}")]
    TypeMismatch(String),
}
