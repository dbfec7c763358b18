use anyhow::{Context as AnyhowContext, Result};
use clap::{Args, Parser, Subcommand};
use datasource_finder::{
    CodeTransformation, DataSourceFinder, InstanceOfPredicate, LookupContext, ProjectLayout,
    RuntimeModuleLoader,
};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "datasource-finder")]
#[command(about = "Locate and load a project's data source configuration", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for JSON)
    #[arg(long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the candidate paths and search roots without loading anything
    Plan(LookupArgs),

    /// Locate, load and print the first matching data source
    Find(FindArgs),
}

#[derive(Args, Clone)]
struct LookupArgs {
    /// Project root (defaults to the current directory)
    #[arg(long)]
    root: Option<PathBuf>,

    /// Lookup context file (.toml or .json); flags override its fields
    #[arg(long)]
    context: Option<PathBuf>,

    /// File name tried before "data-source"
    #[arg(long)]
    file_name: Option<String>,

    /// Extra search root (absolute) or directory pattern (relative)
    #[arg(long)]
    directory: Option<String>,

    /// Use candidate paths literally, skipping tsconfig adjustment
    #[arg(long)]
    preserve_file_paths: bool,

    /// tsconfig file or directory (defaults to <root>/tsconfig.json)
    #[arg(long)]
    tsconfig: Option<PathBuf>,

    /// The module runtime executes TypeScript directly
    #[arg(long)]
    jit: bool,
}

#[derive(Args)]
struct FindArgs {
    #[command(flatten)]
    lookup: LookupArgs,

    /// JavaScript runtime used to load modules
    #[arg(long, default_value = "node")]
    runtime: String,

    /// Argument passed to the runtime before the loader script (repeatable)
    #[arg(long = "runtime-arg", allow_hyphen_values = true)]
    runtime_args: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    match cli.command {
        Commands::Plan(args) => run_plan(args).await,
        Commands::Find(args) => run_find(args).await,
    }
}

async fn run_plan(args: LookupArgs) -> Result<()> {
    let (root, ctx) = resolve_lookup(&args)?;
    let finder = build_finder(RuntimeModuleLoader::default(), &root, &args);

    let plan = finder.plan(&ctx).await.context("Failed to build search plan")?;
    println!("{}", serde_json::to_string_pretty(&plan)?);
    Ok(())
}

async fn run_find(args: FindArgs) -> Result<()> {
    let (root, ctx) = resolve_lookup(&args.lookup)?;
    let loader = RuntimeModuleLoader::new(&args.runtime)
        .with_args(args.runtime_args.iter().cloned())
        .with_working_dir(&root);
    let finder = build_finder(loader, &root, &args.lookup);

    let found = finder
        .find(&ctx)
        .await
        .with_context(|| format!("Failed to resolve data source in {}", root.display()))?;
    if found.is_none() {
        log::info!("No data source found");
    }
    println!("{}", serde_json::to_string_pretty(&found)?);
    Ok(())
}

fn build_finder(
    loader: RuntimeModuleLoader,
    root: &Path,
    args: &LookupArgs,
) -> DataSourceFinder<RuntimeModuleLoader, InstanceOfPredicate> {
    let finder = DataSourceFinder::new(loader, InstanceOfPredicate::data_source()).with_root(root);
    if args.jit {
        finder.with_code_transformation(CodeTransformation::JustInTime)
    } else {
        finder
    }
}

fn resolve_lookup(args: &LookupArgs) -> Result<(PathBuf, LookupContext)> {
    let root = match &args.root {
        Some(root) => root.clone(),
        None => env::current_dir().context("Failed to read current directory")?,
    };

    let mut ctx = match &args.context {
        Some(path) => load_context(path)?,
        None => LookupContext::default(),
    };
    if let Some(file_name) = &args.file_name {
        ctx.file_name = Some(file_name.clone());
    }
    if let Some(directory) = &args.directory {
        ctx.directory = Some(directory.clone());
    }
    if args.preserve_file_paths {
        ctx.preserve_file_paths = true;
    }
    if let Some(tsconfig) = &args.tsconfig {
        ctx.project_layout = ProjectLayout::File(tsconfig.clone());
    }

    Ok((root, ctx))
}

fn load_context(path: &Path) -> Result<LookupContext> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read context file {}", path.display()))?;
    let is_toml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

    if is_toml {
        toml::from_str(&raw).with_context(|| format!("Invalid context file {}", path.display()))
    } else {
        serde_json::from_str(&raw)
            .with_context(|| format!("Invalid context file {}", path.display()))
    }
}
