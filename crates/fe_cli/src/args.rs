// crates/fe_cli/src/args.rs
//
// Offline CLI argument surface (types + validation).
//
// Rules:
// - No networked paths (reject any scheme:// like http/https/file)
// - --catalog is required and must be an existing local file
// - Optional inputs: --price-list, --strategies (existing local files)
// - Output: --out file (default: stdout)
// - --min-distinct is a fraction in [0, 1] and only meaningful with --pair
// - --validate-only loads + normalizes inputs and reports, without allocating

use clap::Parser;
use std::{
    env, fs,
    path::{Path, PathBuf},
};

/// Parsed CLI arguments (raw).
#[derive(Debug, Parser, Clone)]
#[command(
    name = "fe",
    disable_help_subcommand = true,
    about = "Offline roster generator for fantasy football auctions"
)]
pub struct Args {
    // --- Inputs ---
    /// Catalog export (CSV with `;`, `,` or tab delimiters, or JSON).
    #[arg(long)]
    pub catalog: PathBuf,
    /// Price list JSON (name → credits) applied over catalog prices.
    #[arg(long)]
    pub price_list: Option<PathBuf>,
    /// Strategy config JSON adding or overriding modes.
    #[arg(long)]
    pub strategies: Option<PathBuf>,

    // --- Request ---
    /// Strategy mode (equilibrata, offensiva, difensiva, or a configured name).
    #[arg(long, default_value = "equilibrata")]
    pub mode: String,
    /// Lower budget bound in credits.
    #[arg(long)]
    pub budget_min: Option<f64>,
    /// Upper budget bound in credits.
    #[arg(long)]
    pub budget_max: Option<f64>,
    /// Seed string; a fresh one is minted and echoed when omitted.
    #[arg(long)]
    pub seed: Option<String>,
    /// Return the deterministic cheapest composition instead of searching.
    #[arg(long, conflicts_with = "pair")]
    pub cheapest: bool,

    // --- Pair ---
    /// Generate a second roster distinct from the first. Takes an optional mode
    /// for the second roster (default: --mode).
    #[arg(long, num_args = 0..=1, default_missing_value = "")]
    pub pair: Option<String>,
    /// Minimum fraction of the second roster not in the first.
    #[arg(long, default_value_t = 0.6, value_parser = parse_fraction)]
    pub min_distinct: f64,

    // --- Output & control ---
    /// Output file for the canonical JSON document (default: stdout).
    #[arg(long)]
    pub out: Option<PathBuf>,
    /// Load and normalize inputs only; print the catalog report.
    #[arg(long)]
    pub validate_only: bool,
    /// Only warnings and errors on stderr.
    #[arg(long)]
    pub quiet: bool,
}

impl Args {
    /// Mode of the second roster when `--pair` is given.
    pub fn pair_mode(&self) -> Option<&str> {
        self.pair.as_deref().map(|m| if m.trim().is_empty() { self.mode.as_str() } else { m })
    }
}

/// Errors surfaced by argument validation.
/// Keep messages short/stable (handy for scripts/tests).
#[derive(Debug)]
pub enum CliError {
    NonLocalPath(String),
    NotFound(String),
    BadBudget(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use CliError::*;
        match self {
            NonLocalPath(p) => write!(f, "path must be local file (no scheme): {p}"),
            NotFound(p) => write!(f, "file not found: {p}"),
            BadBudget(s) => write!(f, "invalid budget: {s}"),
        }
    }
}
impl std::error::Error for CliError {}

/// Fraction parser for --min-distinct: a finite number in [0, 1].
pub fn parse_fraction(s: &str) -> Result<f64, String> {
    let v: f64 = s.trim().parse().map_err(|_| format!("not a number: {s}"))?;
    if !v.is_finite() || !(0.0..=1.0).contains(&v) {
        return Err("fraction must be within [0, 1]".into());
    }
    Ok(v)
}

/// Reject any explicit URI scheme (e.g., http://, https://, file://).
#[inline]
fn has_scheme(s: &str) -> bool {
    let lower = s.trim().to_ascii_lowercase();
    fe_io::looks_like_url_strict(&lower)
        || lower.starts_with("http:")
        || lower.starts_with("https:")
        || lower.starts_with("file:")
}

#[inline]
fn ensure_local_path(p: &Path) -> Result<(), CliError> {
    if let Some(s) = p.to_str() {
        if has_scheme(s) {
            return Err(CliError::NonLocalPath(s.to_string()));
        }
    }
    Ok(())
}

/// Ensure a path is local (no scheme) and exists as a regular file.
fn ensure_local_exists(p: &Path, label: &'static str) -> Result<(), CliError> {
    ensure_local_path(p)?;
    let meta = fs::metadata(p).map_err(|_| CliError::NotFound(format!("{label} {}", p.display())))?;
    if !meta.is_file() {
        return Err(CliError::NotFound(format!("{label} {}", p.display())));
    }
    Ok(())
}

/// Best-effort normalization to an absolute path.
fn normalize_path(p: &Path) -> PathBuf {
    fs::canonicalize(p).unwrap_or_else(|_| {
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            env::current_dir().unwrap_or_else(|_| PathBuf::from(".")).join(p)
        }
    })
}

/// Check flags that clap cannot express, then normalize paths.
pub fn validate(mut args: Args) -> Result<Args, CliError> {
    if let Some(out) = &args.out {
        ensure_local_path(out)?;
    }
    ensure_local_exists(&args.catalog, "--catalog")?;
    if let Some(p) = &args.price_list {
        ensure_local_exists(p, "--price-list")?;
    }
    if let Some(p) = &args.strategies {
        ensure_local_exists(p, "--strategies")?;
    }

    for (label, v) in [("--budget-min", args.budget_min), ("--budget-max", args.budget_max)] {
        if let Some(x) = v {
            if !x.is_finite() || x < 0.0 {
                return Err(CliError::BadBudget(format!("{label} {x}")));
            }
        }
    }
    if let (Some(lo), Some(hi)) = (args.budget_min, args.budget_max) {
        if lo > hi {
            return Err(CliError::BadBudget(format!("--budget-min {lo} > --budget-max {hi}")));
        }
    }

    args.catalog = normalize_path(&args.catalog);
    args.price_list = args.price_list.take().map(|p| normalize_path(&p));
    args.strategies = args.strategies.take().map(|p| normalize_path(&p));
    args.out = args.out.take().map(|p| normalize_path(&p));
    Ok(args)
}

/// Entry point used by main.rs
pub fn parse_and_validate() -> Result<Args, CliError> {
    validate(Args::parse())
}
