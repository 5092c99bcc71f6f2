// logwrap: generate logging/interception wrappers for C shared libraries

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use logwrap::codegen::{self, GenContext};
use logwrap::config::Config;
use logwrap::diag::Diagnostics;
use logwrap::error::Error;
use logwrap::parser::parse_header;

/// Generate a logging wrapper library from a C header.
#[derive(Debug, Parser)]
#[command(name = "logwrap")]
#[command(about = "Generates logging/interception wrappers for C shared libraries")]
struct Cli {
    /// C header declaring the functions to wrap.
    header: PathBuf,

    /// Shared library the wrappers forward to (e.g. libfoo.so.1).
    libname: String,

    /// Output C source file.
    output: PathBuf,

    /// Configuration file (JSON) with formatter, checker and override
    /// settings.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Symbol prefix to use (defaults to one derived from the library
    /// name).
    #[arg(short, long)]
    prefix: Option<String>,

    /// Also write a sample makefile covering the preset switch
    /// combinations.
    #[arg(short = 'M', long)]
    makefile: Option<PathBuf>,

    /// Print the recovered declaration tables instead of generating.
    #[arg(short, long)]
    dump: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Error> {
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::empty(),
    };

    let ignore_tokens = config.get_regexp("global", "ignore-tokens-regexp")?;
    let source = fs::read_to_string(&cli.header)?;

    let mut diags = Diagnostics::new();
    let decls = parse_header(&source, ignore_tokens.as_ref(), &mut diags)?;

    if cli.dump {
        dump_declarations(&decls);
        report(&diags);
        return Ok(());
    }

    let prefix = cli
        .prefix
        .unwrap_or_else(|| codegen::prefix_from_libname(&cli.libname));
    let ctx = GenContext {
        header: cli.header.to_string_lossy().into_owned(),
        libname: cli.libname.clone(),
        prefix: codegen::sanitize_prefix(&prefix),
        progname: env!("CARGO_PKG_NAME").to_string(),
        config: &config,
    };

    let generated = codegen::generate(&decls, &ctx, &mut diags)?;
    fs::write(&cli.output, generated)?;

    if let Some(makefile) = &cli.makefile {
        let (text, same_dir) = codegen::makefile::render(makefile, &cli.output, &ctx);
        if !same_dir {
            eprintln!(
                "warning: source and makefile are not in the same folder, using absolute paths"
            );
        }
        fs::write(makefile, text)?;
    }

    report(&diags);
    Ok(())
}

fn report(diags: &Diagnostics) {
    for diag in diags.iter() {
        eprintln!("{}", diag);
    }
}

fn dump_declarations(decls: &logwrap::parser::decl::Declarations) {
    fn section<T: std::fmt::Display>(
        title: &str,
        table: &rustc_hash::FxHashMap<String, T>,
    ) {
        if table.is_empty() {
            return;
        }
        println!("\n{}", title);
        let mut names: Vec<&String> = table.keys().collect();
        names.sort();
        for name in names {
            println!("\t{}", table[name]);
        }
    }

    section("enum", &decls.enums);
    section("function", &decls.functions);
    section("global", &decls.globals);
    section("struct", &decls.structs);
    section("typedef", &decls.typedefs);
}
