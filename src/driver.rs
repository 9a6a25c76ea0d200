//! Multi-unit build: parse every unit, register every signature, then
//! generate code for each unit against the shared signature table.

use std::{
    fs,
    path::{Path, PathBuf},
};

use rayon::prelude::*;

use crate::backend::compiler::compile_class;
use crate::backend::vm::{Instruction, render};
use crate::common::error::{BuildError, BuildResult, CompileError, CompileResult};
use crate::frontend::{ast::Class, lexer::tokenize, parser::parse_class, resolve::SignatureTable};

pub const SOURCE_EXTENSION: &str = "jack";
pub const OUTPUT_EXTENSION: &str = "vm";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOptions {
    /// Pre-register the runtime library (`Memory`, `Math`, `String`) so
    /// calls into it are arity-checked and classified.
    pub runtime_signatures: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            runtime_signatures: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledUnit {
    pub name: String,
    pub instructions: Vec<Instruction>,
}

impl CompiledUnit {
    pub fn to_vm_text(&self) -> String {
        render(&self.instructions)
    }
}

#[derive(Debug, Clone)]
struct SourceUnit {
    name: String,
    text: String,
}

#[derive(Debug, Clone, Default)]
pub struct Build {
    options: BuildOptions,
    sources: Vec<SourceUnit>,
}

impl Build {
    pub fn new(options: BuildOptions) -> Self {
        Self {
            options,
            sources: vec![],
        }
    }

    pub fn add_source(&mut self, name: impl Into<String>, text: impl Into<String>) -> &mut Self {
        self.sources.push(SourceUnit {
            name: name.into(),
            text: text.into(),
        });
        self
    }

    /// Compile every unit. Output order follows the order units were added;
    /// the first failing unit aborts the whole build.
    pub fn compile(&self) -> BuildResult<Vec<CompiledUnit>> {
        let classes = self
            .sources
            .par_iter()
            .map(|source| {
                parse_class(&tokenize(&source.text)).map_err(|err| unit_error(&source.name, err))
            })
            .collect::<BuildResult<Vec<Class>>>()?;

        // every unit's signatures must be known before any call is compiled
        let mut signatures = SignatureTable::new();
        for (source, class) in self.sources.iter().zip(&classes) {
            signatures
                .register_class(class)
                .map_err(|err| unit_error(&source.name, err))?;
        }
        if self.options.runtime_signatures {
            signatures.add_runtime();
        }

        self.sources
            .par_iter()
            .zip(classes.par_iter())
            .map(|(source, class)| -> BuildResult<CompiledUnit> {
                let instructions =
                    compile_class(class, &signatures).map_err(|err| unit_error(&source.name, err))?;
                Ok(CompiledUnit {
                    name: source.name.clone(),
                    instructions,
                })
            })
            .collect()
    }
}

fn unit_error(unit: &str, source: CompileError) -> BuildError {
    BuildError::Unit {
        unit: unit.into(),
        source,
    }
}

/// Compile a single standalone unit: only its own subroutines and the
/// runtime library are known.
pub fn compile_source(text: &str) -> CompileResult<Vec<Instruction>> {
    let class = parse_class(&tokenize(text))?;
    let mut signatures = SignatureTable::new();
    signatures.register_class(&class)?;
    signatures.add_runtime();

    compile_class(&class, &signatures)
}

/// A `.jack` file yields itself; a directory yields the `.jack` files
/// directly inside it, sorted by path.
pub fn collect_sources(path: &Path) -> BuildResult<Vec<PathBuf>> {
    let io_error = |source| BuildError::Io {
        path: path.to_path_buf(),
        source,
    };

    if !path.is_dir() {
        // surface a missing file as an I/O error now rather than at read time
        fs::metadata(path).map_err(io_error)?;
        return Ok(vec![path.to_path_buf()]);
    }

    let mut sources = vec![];
    for entry in fs::read_dir(path).map_err(io_error)? {
        let entry = entry.map_err(io_error)?;
        let candidate = entry.path();
        if candidate.is_file() && has_source_extension(&candidate) {
            sources.push(candidate);
        }
    }

    if sources.is_empty() {
        return Err(BuildError::NoSources {
            path: path.to_path_buf(),
        });
    }

    sources.sort();
    Ok(sources)
}

fn has_source_extension(path: &Path) -> bool {
    path.extension().and_then(|ext| ext.to_str()) == Some(SOURCE_EXTENSION)
}

/// `<stem>.vm` beside the source, or inside `out_dir` when given.
pub fn output_path(source: &Path, out_dir: Option<&Path>) -> PathBuf {
    let file_name = source.with_extension(OUTPUT_EXTENSION);
    match (out_dir, file_name.file_name()) {
        (Some(dir), Some(name)) => dir.join(name),
        _ => file_name,
    }
}

pub fn read_source(path: &Path) -> BuildResult<String> {
    fs::read_to_string(path).map_err(|source| BuildError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub fn write_unit(path: &Path, unit: &CompiledUnit) -> BuildResult<()> {
    fs::write(path, unit.to_vm_text()).map_err(|source| BuildError::Io {
        path: path.to_path_buf(),
        source,
    })
}
