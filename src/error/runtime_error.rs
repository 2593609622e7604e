use crate::ast::Span;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Represents all errors that can occur during evaluation.
///
/// Runtime errors are reported to the diagnostic sink and the offending
/// operation yields a neutral value; evaluation never unwinds.
pub enum RuntimeError {
    /// A value had an unexpected or incompatible type.
    TypeError {
        /// Details about the type mismatch.
        details: String,
        /// Where the operation was evaluated.
        span:    Span,
    },
    /// A range failed to normalize against its collection.
    InvalidRange {
        /// What was being sliced.
        target: &'static str,
        /// Where the range was applied.
        span:   Span,
    },
    /// An index fell outside its collection after normalization.
    IndexOutOfBounds {
        /// The requested index as written.
        index: i64,
        /// The collection length.
        len:   usize,
        /// Where the index was applied.
        span:  Span,
    },
    /// The wrong number of arguments was supplied to a function.
    ArityMismatch {
        /// The called function name.
        name:     String,
        /// Parameters the function declares.
        expected: usize,
        /// Arguments actually supplied.
        found:    usize,
        /// The call site.
        span:     Span,
    },
    /// Attempted division by zero.
    DivisionByZero {
        /// Where the division was evaluated.
        span: Span,
    },
    /// Attempted modulo by zero.
    ModuloByZero {
        /// Where the modulo was evaluated.
        span: Span,
    },
    /// Tried to rebind a `fixed` variable.
    FixedReassignment {
        /// The variable name.
        name: String,
        /// The assignment site.
        span: Span,
    },
    /// Tried to rebind a `fixed` function-valued variable.
    FunctionReassignment {
        /// The variable name.
        name: String,
        /// The assignment site.
        span: Span,
    },
    /// Tried to rebind or mutate a non-dynamic array.
    ImmutableArray {
        /// The array name.
        name: String,
        /// The mutation site.
        span: Span,
    },
    /// Assigned to a name with no existing binding.
    UnknownVariable {
        /// The variable name.
        name: String,
        /// The assignment site.
        span: Span,
    },
    /// Called an unknown function.
    UnknownFunction {
        /// The function name.
        name: String,
        /// The call site.
        span: Span,
    },
    /// A conditional chain without fallback was asked for a value and no
    /// arm matched.
    IncompleteChain {
        /// Where the chain was evaluated.
        span: Span,
    },
    /// An argument had the right type but an invalid value.
    InvalidArgument {
        /// Details about why the argument is invalid.
        details: String,
        /// The call site.
        span:    Span,
    },
    /// A string operation ran into invalid UTF-8.
    InvalidUtf8 {
        /// The codec's description of the failure.
        details: String,
        /// Where the operation was evaluated.
        span:    Span,
    },
}

impl std::fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TypeError { details, span } => {
                write!(f, "Error at {span}: Type error: {details}.")
            },
            Self::InvalidRange { target, span } => {
                write!(f, "Error at {span}: Invalid range for {target} slice.")
            },
            Self::IndexOutOfBounds { index, len, span } => {
                write!(f,
                       "Error at {span}: Index {index} out of bounds for length {len}.")
            },
            Self::ArityMismatch { name, expected, found, span } => {
                write!(f,
                       "Error at {span}: Function '{name}' expects {expected} argument(s), found \
                        {found}.")
            },
            Self::DivisionByZero { span } => write!(f, "Error at {span}: Division by zero."),
            Self::ModuloByZero { span } => write!(f, "Error at {span}: Modulo by zero."),
            Self::FixedReassignment { name, span } => {
                write!(f, "Error at {span}: Cannot reassign 'fixed' variable '{name}'.")
            },
            Self::FunctionReassignment { name, span } => {
                write!(f,
                       "Error at {span}: Cannot reassign function variable '{name}'; function \
                        bindings are immutable. Create a new variable instead.")
            },
            Self::ImmutableArray { name, span } => {
                write!(f,
                       "Error at {span}: Array '{name}' is not dynamic and cannot be modified.")
            },
            Self::UnknownVariable { name, span } => {
                write!(f, "Error at {span}: Assignment to undefined variable '{name}'.")
            },
            Self::UnknownFunction { name, span } => {
                write!(f, "Error at {span}: Unknown function '{name}'.")
            },
            Self::IncompleteChain { span } => {
                write!(f,
                       "Error at {span}: Conditional chain without fallback used in a context \
                        that requires a value.")
            },
            Self::InvalidArgument { details, span } => {
                write!(f, "Error at {span}: Invalid argument: {details}.")
            },
            Self::InvalidUtf8 { details, span } => {
                write!(f, "Error at {span}: Invalid UTF-8: {details}.")
            },
        }
    }
}

impl std::error::Error for RuntimeError {}
