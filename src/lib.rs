pub mod backend;
pub mod common;
pub mod driver;
pub mod frontend;

pub use frontend::{ast, lexer, parser, resolve, scanner};

pub use frontend::lexer::{Lexer, Token, tokenize};
pub use frontend::parser::{Parser, parse_class};
pub use frontend::resolve::{SignatureTable, SymbolTable};
pub use frontend::scanner::Scanner;

pub use backend::compiler::{CompilationUnit, compile_class};
pub use backend::vm::Instruction;

pub use driver::{Build, BuildOptions, CompiledUnit, compile_source};

pub use common::error::{BuildError, CompileError, CompileResult};
pub use common::error_reporter;
