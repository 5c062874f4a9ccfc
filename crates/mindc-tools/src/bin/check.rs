//!
//! Loads a serialized definition bundle and checks it.
//!
//! Usage: `mindc-check <bundle> [--root NAME]... [--options FILE] [--signatures FILE] [--json]`

use anyhow::{Context, Result};
use clap::Parser;
use mindc::ast::error::CompileError;
use mindc::{CompilerOptions, Frontend, SourceMap, StaticIdlSignatures};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "mindc-check")]
#[command(about = "Load a MessagePack definition bundle and report diagnostics")]
struct Args {
    /// Path to the definition bundle
    bundle: PathBuf,

    /// Definitions to check (default: every definition in the bundle)
    #[arg(long = "root")]
    roots: Vec<String>,

    /// Compiler options as JSON
    #[arg(long)]
    options: Option<PathBuf>,

    /// Signature hierarchy as JSON: `{ "signature": ["parent", ...] }`
    #[arg(long)]
    signatures: Option<PathBuf>,

    /// Print a JSON report on stdout
    #[arg(long)]
    json: bool,
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn diagnostics_json(diagnostics: &[CompileError]) -> serde_json::Value {
    diagnostics
        .iter()
        .map(|d| {
            serde_json::json!({
                "kind": d.kind.name(),
                "message": d.message,
            })
        })
        .collect()
}

fn run(args: Args) -> Result<bool> {
    let options: CompilerOptions = match &args.options {
        Some(path) => read_json(path)?,
        None => CompilerOptions::default(),
    };
    let mut idl = StaticIdlSignatures::new();
    if let Some(path) = &args.signatures {
        let table: BTreeMap<String, Vec<String>> = read_json(path)?;
        for (signature, parents) in table {
            for parent in parents {
                idl = idl.with(signature.clone(), parent);
            }
        }
    }

    let bytes =
        fs::read(&args.bundle).with_context(|| format!("reading {}", args.bundle.display()))?;
    let definitions = mindc::deserialize_definitions(&bytes)
        .with_context(|| format!("decoding {}", args.bundle.display()))?;
    info!("Loaded {} definitions from {}", definitions.len(), args.bundle.display());

    let roots: Vec<String> = if args.roots.is_empty() {
        definitions.iter().map(|d| d.name.clone()).collect()
    } else {
        args.roots.clone()
    };
    let names: Vec<&str> = roots.iter().map(String::as_str).collect();

    let fe = Frontend::builder().idl(idl).build();
    let result = mindc::compile_definitions(&fe, definitions, &names, options);

    let no_sources = SourceMap::new();
    let (ok, errors, warnings) = match &result {
        Ok(compiled) => (true, Vec::new(), compiled.warnings.clone()),
        Err(errors) => (false, errors.clone(), Vec::new()),
    };

    if args.json {
        let report = serde_json::json!({
            "ok": ok,
            "checked": names.len(),
            "errors": diagnostics_json(&errors),
            "warnings": diagnostics_json(&warnings),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(ok);
    }

    if !warnings.is_empty() {
        warn!("Warnings found:\n{}", mindc::format_errors(&warnings, &no_sources));
    }
    match result {
        Ok(compiled) => {
            info!("Successfully checked {} definitions", compiled.roots.len());
            info!("  - Loaded: {}", compiled.context.definition_count());
        }
        Err(errors) => {
            error!("Errors found:\n{}", mindc::format_errors(&errors, &no_sources));
        }
    }
    Ok(ok)
}

fn main() {
    mindc_tools::init_logging();

    let args = Args::parse();
    match run(args) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(err) => {
            error!("{:#}", err);
            process::exit(2);
        }
    }
}
