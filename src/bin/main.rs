use std::{fs, path::PathBuf, process};

use clap::Parser;
use colored::Colorize;

use jack_core::{
    Build, BuildError, BuildOptions,
    driver::{collect_sources, output_path, read_source, write_unit},
    error_reporter::report_build_error,
};

/// Compile class source units into stack-VM code
#[derive(Parser, Debug)]
#[command(name = "jackc")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Source files or directories of `.jack` files
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Print the generated code instead of writing `.vm` files
    #[arg(long, conflicts_with = "out_dir")]
    stdout: bool,

    /// Write `.vm` files into this directory instead of beside the sources
    #[arg(short, long, value_name = "DIR")]
    out_dir: Option<PathBuf>,

    /// Do not print a status line per written file
    #[arg(short, long)]
    quiet: bool,

    /// Do not pre-register the runtime library signatures
    #[arg(long)]
    no_runtime: bool,
}

fn run(args: &Args) -> Result<(), BuildError> {
    let mut sources = vec![];
    for path in &args.paths {
        sources.extend(collect_sources(path)?);
    }

    let mut build = Build::new(BuildOptions {
        runtime_signatures: !args.no_runtime,
    });
    for source in &sources {
        build.add_source(source.display().to_string(), read_source(source)?);
    }

    let units = build.compile()?;

    if let Some(dir) = &args.out_dir {
        fs::create_dir_all(dir).map_err(|source| BuildError::Io {
            path: dir.clone(),
            source,
        })?;
    }

    for (source, unit) in sources.iter().zip(&units) {
        if args.stdout {
            print!("{}", unit.to_vm_text());
            continue;
        }

        let target = output_path(source, args.out_dir.as_deref());
        write_unit(&target, unit)?;

        if !args.quiet {
            println!(
                "{:>12} {} -> {}",
                "Compiled".green().bold(),
                source.display(),
                target.display()
            );
        }
    }

    Ok(())
}

fn main() {
    let args = Args::parse();

    if let Err(error) = run(&args) {
        report_build_error(&error);
        process::exit(1);
    }
}
