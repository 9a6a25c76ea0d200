use std::path::PathBuf;

use thiserror::Error;

use crate::frontend::ast::Type;

/// Fatal error raised while compiling a single unit. There is no recovery:
/// the first error aborts the unit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("expected {expected}, but found {found}")]
    Syntax { expected: String, found: String },

    #[error("unresolved symbol `{name}` in `{subroutine}`")]
    UnresolvedSymbol { name: String, subroutine: String },

    #[error("`{name}` is declared more than once in {scope}")]
    DuplicateSymbol { name: String, scope: String },

    #[error("`{callee}` takes {expected} argument(s) but {found} were supplied")]
    Arity {
        callee: String,
        expected: usize,
        found: usize,
    },

    #[error("cannot call a subroutine on `{name}` of primitive type `{ty}`")]
    InvalidReceiver { name: String, ty: Type },
}

impl CompileError {
    pub fn syntax(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::Syntax {
            expected: expected.into(),
            found: found.into(),
        }
    }

    pub fn code(&self) -> u64 {
        match self {
            CompileError::Syntax { .. } => 1,
            CompileError::UnresolvedSymbol { .. } => 2,
            CompileError::DuplicateSymbol { .. } => 3,
            CompileError::Arity { .. } => 4,
            CompileError::InvalidReceiver { .. } => 5,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            CompileError::Syntax { .. } => "syntax error",
            CompileError::UnresolvedSymbol { .. } => "unresolved symbol",
            CompileError::DuplicateSymbol { .. } => "duplicate declaration",
            CompileError::Arity { .. } => "wrong number of arguments",
            CompileError::InvalidReceiver { .. } => "invalid receiver",
        }
    }
}

pub type CompileResult<T> = Result<T, CompileError>;

/// Error surfaced by a multi-unit build: either a unit failed to compile or
/// the driver could not read/write a file.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("{unit}: {source}")]
    Unit {
        unit: String,
        #[source]
        source: CompileError,
    },

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no source units found in {}", path.display())]
    NoSources { path: PathBuf },
}

pub type BuildResult<T> = Result<T, BuildError>;
