//! `fig` command line front-end
//!
//! Parses and evaluates expressions, answers config and auth queries against
//! a JSON store file, and runs an interactive REPL.

mod repl;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use fig::{
    globals, parse, BasicAuth, ConfigGetter, MemoryStore, ScopeBuilder, Settings,
    Store, Value,
};

#[derive(Debug, Parser)]
#[command(version, about = "Evaluate fig config expressions", long_about = None)]
struct Cli {
    /// Settings file (JSON)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    fn command(&self) -> &Command {
        self.command.as_ref().unwrap_or(&Command::Repl)
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the canonical tree and parse errors as JSON
    Parse(ParseArgs),
    /// Evaluate an expression
    Eval(EvalArgs),
    /// Evaluate a stored config entry
    Get(GetArgs),
    /// Check credentials against a stored basic-auth policy
    Auth(AuthArgs),
    /// Store the standard basic-auth policy and print the updated store
    SetAuth(SetAuthArgs),
    /// Interactive read-eval-print loop
    Repl,
}

#[derive(Debug, Args)]
struct ParseArgs {
    expr: String,
}

#[derive(Debug, Args)]
struct EvalArgs {
    expr: String,

    /// Argument bound to `it`, as JSON
    #[arg(long, value_name = "JSON")]
    arg: Option<String>,
}

#[derive(Debug, Args)]
struct GetArgs {
    key: String,

    /// Store file: a JSON object of key to expression
    #[arg(long, value_name = "FILE")]
    store: PathBuf,

    /// Argument bound to `it`, as JSON
    #[arg(long, value_name = "JSON")]
    arg: Option<String>,
}

#[derive(Debug, Args)]
struct AuthArgs {
    #[arg(long, value_name = "FILE")]
    store: PathBuf,

    #[arg(long)]
    user: String,

    #[arg(long)]
    password: String,

    /// API name, or a request path to derive it from
    #[arg(long, default_value = "")]
    api: String,
}

#[derive(Debug, Args)]
struct SetAuthArgs {
    #[arg(long, value_name = "FILE")]
    store: PathBuf,

    #[arg(long)]
    user: String,

    #[arg(long)]
    password: String,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let settings = match &cli.config {
        Some(path) => Settings::from_file(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => Settings::default(),
    };
    debug!(?settings, "settings");

    match cli.command() {
        Command::Parse(args) => parse_command(args),
        Command::Eval(args) => eval_command(args, &settings),
        Command::Get(args) => get_command(args, settings),
        Command::Auth(args) => auth_command(args, settings),
        Command::SetAuth(args) => set_auth_command(args, settings),
        Command::Repl => repl::run(&settings),
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// ═══════════════════════════════════════════════════════════════════════
// Commands
// ═══════════════════════════════════════════════════════════════════════

fn parse_command(args: &ParseArgs) -> anyhow::Result<()> {
    let parsed = parse(&args.expr)?;
    let report = serde_json::json!({
        "tree": parsed.expr.to_tree_string(),
        "code": parsed.expr.to_string(),
        "errors": parsed.errors,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn eval_command(args: &EvalArgs, settings: &Settings) -> anyhow::Result<()> {
    let arg = Value::from_json(&parse_arg(args.arg.as_deref())?);
    let mut builder = ScopeBuilder::new(globals());
    builder.bind_value(settings.argument_name.as_str(), arg)?;
    let scope = builder.build();

    let value = fig::eval_source(&settings.context(), &args.expr, &scope)?;
    println!("{}", value.to_native().to_json());
    Ok(())
}

fn get_command(args: &GetArgs, settings: Settings) -> anyhow::Result<()> {
    let store = load_store(&args.store)?;
    let arg = parse_arg(args.arg.as_deref())?;
    let getter = ConfigGetter::with_settings(store, settings);
    let result = getter.get(&args.key, &arg)?;
    println!("{}", result.to_json());
    Ok(())
}

fn auth_command(args: &AuthArgs, settings: Settings) -> anyhow::Result<()> {
    let store = load_store(&args.store)?;
    let api = fig::api_name(&args.api);
    let auth = BasicAuth::with_settings(store, settings);
    if !auth.authorize(&args.user, &args.password, api) {
        bail!("access denied for {} on {:?}", args.user, api);
    }
    println!("allowed");
    Ok(())
}

fn set_auth_command(args: &SetAuthArgs, settings: Settings) -> anyhow::Result<()> {
    let store = if args.store.exists() {
        load_store(&args.store)?
    } else {
        MemoryStore::new()
    };
    let store = add_user(store, settings, &args.user, &args.password);
    let (_, config) = store.get_since(0);
    let sorted: BTreeMap<String, String> = config.into_iter().collect();
    println!("{}", serde_json::to_string_pretty(&sorted)?);
    Ok(())
}

/// Store the basic-auth policy for `user` under the configured prefix.
fn add_user(
    store: MemoryStore,
    settings: Settings,
    user: &str,
    password: &str,
) -> Arc<MemoryStore> {
    let store = Arc::new(store);
    BasicAuth::with_settings(Arc::clone(&store), settings).set_password(user, password);
    store
}

// ═══════════════════════════════════════════════════════════════════════
// Inputs
// ═══════════════════════════════════════════════════════════════════════

/// The `it` argument: JSON text when given, `true` otherwise.
fn parse_arg(text: Option<&str>) -> anyhow::Result<serde_json::Value> {
    match text {
        Some(text) => serde_json::from_str(text).context("--arg is not valid JSON"),
        None => Ok(serde_json::Value::Bool(true)),
    }
}

fn load_store(path: &Path) -> anyhow::Result<MemoryStore> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading store {}", path.display()))?;
    let store =
        parse_store(&text).with_context(|| format!("decoding store {}", path.display()))?;
    debug!(path = %path.display(), version = store.version(), "loaded store");
    Ok(store)
}

/// A store file is a JSON object mapping keys to expression source.
fn parse_store(text: &str) -> anyhow::Result<MemoryStore> {
    let entries: BTreeMap<String, String> = serde_json::from_str(text)?;
    Ok(MemoryStore::from_entries(entries))
}
