use colored::Colorize;

use crate::common::error::{BuildError, CompileError};

const IO_ERROR_ID: u64 = 100;

fn header(id: u64, title: &str) -> String {
    format!("{}: {}", format!("error[E{:04}]", id).red().bold(), title.bold())
}

fn location(unit: &str) -> String {
    format!(" {} {}", "-->".bright_blue(), unit)
}

/// Render a unit's compile error as a multi-line diagnostic.
pub fn format_compile_error(unit: &str, error: &CompileError) -> String {
    let mut lines = vec![header(error.code(), error.title()), location(unit)];
    lines.push(format!("  {}", "|".bright_blue()));
    lines.push(format!("  {} {}", "=".bright_blue(), error.to_string().red()));

    // hint for the errors with an obvious fix
    match error {
        CompileError::UnresolvedSymbol { name, .. } => lines.push(format!(
            "  {} declare `{}` as a field, static, parameter or local",
            "help:".green(),
            name
        )),
        CompileError::InvalidReceiver { name, .. } => lines.push(format!(
            "  {} `{}` must have a class type to receive a call",
            "help:".green(),
            name
        )),
        _ => {}
    }

    lines.join("\n")
}

pub fn format_build_error(error: &BuildError) -> String {
    match error {
        BuildError::Unit { unit, source } => format_compile_error(unit, source),
        BuildError::Io { path, source } => format!(
            "{}\n{}\n  {} {}",
            header(IO_ERROR_ID, "cannot access file"),
            location(&path.display().to_string()),
            "=".bright_blue(),
            source.to_string().red()
        ),
        BuildError::NoSources { path } => format!(
            "{}\n{}",
            header(IO_ERROR_ID, "no source units"),
            location(&path.display().to_string())
        ),
    }
}

pub fn report_build_error(error: &BuildError) {
    eprintln!("{}", format_build_error(error));
}
