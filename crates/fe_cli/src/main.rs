// crates/fe_cli/src/main.rs
//
// Exit codes, error mapping, logging setup, and the run path
// (load catalog → resolve strategy → allocate → canonical JSON out).

mod args; // sibling module in this crate

mod exitcodes {
    pub const OK: i32 = 0;
    /// Arguments, catalog schema, strategy config.
    pub const VALIDATION: i32 = 2;
    /// A role bucket cannot fill its quota.
    pub const INSUFFICIENT: i32 = 3;
    pub const IO: i32 = 4;
}

use std::io::Write;
use std::process::ExitCode;

use env_logger::Env;
use serde::Serialize;

use args::{parse_and_validate as parse_cli, Args};

use fe_io::prelude::{
    load_price_list, load_strategy_config, to_canonical_bytes, write_canonical_file, HeaderSynonyms, IoError,
};
use fe_pipeline::{CatalogStore, GenerateRequest, Generator, PairRequest, PipelineError};

/// Central error type for CLI → exit-code mapping.
#[derive(Debug)]
enum MainError {
    /// Schema / config / request validation failures
    Validation(String),
    /// Catalog cannot satisfy the requested quotas
    Insufficient(String),
    /// I/O errors (read/write/path/limits)
    Io(String),
}

impl std::fmt::Display for MainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MainError::Validation(m) | MainError::Insufficient(m) | MainError::Io(m) => f.write_str(m),
        }
    }
}

fn main() -> ExitCode {
    let args = match parse_cli() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("fe: error: {e}");
            return ExitCode::from(exitcodes::VALIDATION as u8);
        }
    };

    let default_filter = if args.quiet { "warn" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();

    let rc = match run_once(&args) {
        Ok(()) => exitcodes::OK,
        Err(e) => {
            eprintln!("fe: error: {e}");
            map_error(&e)
        }
    };
    ExitCode::from(rc as u8)
}

/// Map our typed errors to the exit-code table.
fn map_error(e: &MainError) -> i32 {
    use exitcodes::*;
    match e {
        MainError::Validation(_) => VALIDATION,
        MainError::Insufficient(_) => INSUFFICIENT,
        MainError::Io(_) => IO,
    }
}

/// Translate fe_pipeline::PipelineError into MainError buckets.
fn map_pipeline_err(e: PipelineError) -> MainError {
    use PipelineError::*;
    match e {
        Schema(m) => MainError::Validation(format!("schema: {m}")),
        Config(m) => MainError::Validation(format!("config: {m}")),
        Allocate(a) => MainError::Insufficient(a.to_string()),
        Io(m) => MainError::Io(m),
    }
}

fn map_io_err(e: IoError) -> MainError {
    map_pipeline_err(PipelineError::from(e))
}

fn run_once(args: &Args) -> Result<(), MainError> {
    // 1) Optional price list (schema-checked)
    let prices = match &args.price_list {
        Some(p) => Some(load_price_list(p).map_err(map_io_err)?),
        None => None,
    };

    // 2) Catalog snapshot
    let store = CatalogStore::new();
    let snapshot = store
        .load_path(&args.catalog, &HeaderSynonyms::default(), prices)
        .map_err(map_pipeline_err)?;

    if args.validate_only {
        emit(args, &snapshot.report())?;
        log::info!("validate-only: inputs OK");
        return Ok(());
    }

    // 3) Strategy config + generator
    let mut generator = Generator::new(snapshot);
    if let Some(p) = &args.strategies {
        generator = generator.with_config(load_strategy_config(p).map_err(map_io_err)?);
    }

    let request = GenerateRequest {
        mode: args.mode.clone(),
        budget_min: args.budget_min,
        budget_max: args.budget_max,
        seed: args.seed.clone(),
        cheapest: args.cheapest,
    };

    // 4) Allocate and write
    match args.pair_mode() {
        Some(second) => {
            let req = PairRequest {
                base: request,
                second_mode: Some(second.to_string()),
                min_distinct: args.min_distinct,
            };
            let doc = generator.generate_pair(&req).map_err(map_pipeline_err)?;
            emit(args, &doc)
        }
        None => {
            let doc = generator.generate(&request).map_err(map_pipeline_err)?;
            emit(args, &doc)
        }
    }
}

/// Canonical JSON to `--out` (atomic write) or stdout.
fn emit<T: Serialize>(args: &Args, value: &T) -> Result<(), MainError> {
    match &args.out {
        Some(path) => {
            write_canonical_file(path, value).map_err(map_io_err)?;
            log::info!("wrote {}", path.display());
            Ok(())
        }
        None => {
            let mut bytes = to_canonical_bytes(value).map_err(map_io_err)?;
            bytes.push(b'\n');
            std::io::stdout()
                .lock()
                .write_all(&bytes)
                .map_err(|e| MainError::Io(format!("write stdout: {e}")))
        }
    }
}
