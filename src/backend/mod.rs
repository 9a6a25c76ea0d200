pub mod compiler;
pub mod runtime;
pub mod vm;
