use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use njast_config::{ConfigDiagnostics, NjastConfig};
use njast_resolve::{evaluate_type, ClassResolver, ResolvedType, ResolverCache};
use njast_syntax::{parse, Ast, JavaLevel, NodeId, ParseOptions, Span, SyntaxError};
use serde::Serialize;

#[derive(Parser)]
#[command(
    name = "njast",
    version,
    about = "Java source parsing and type evaluation for editors"
)]
struct Cli {
    /// Config file to use instead of discovering `njast.toml`
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse a file and summarize its declarations and errors
    Parse(ParseArgs),
    /// Print the innermost node at a position
    Locate(PositionArgs),
    /// Evaluate the type of the expression at a position
    Type(PositionArgs),
    /// List project types a simple name could be imported as
    SuggestImport(SuggestImportArgs),
}

#[derive(Args)]
struct ParseArgs {
    /// File to parse
    file: PathBuf,
    /// Record syntax errors and keep going
    #[arg(long)]
    lenient: bool,
    /// JDK level to parse against (6 or 7)
    #[arg(long)]
    level: Option<u16>,
    /// Parse the file as a run of members and statements
    #[arg(long)]
    partial: bool,
    /// Emit JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct PositionArgs {
    /// File to parse
    file: PathBuf,
    /// 1-based line
    line: u32,
    /// 1-based column
    ch: u32,
    /// Emit JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct SuggestImportArgs {
    /// File the name appears in; selects the project searched
    file: PathBuf,
    /// Simple type name
    name: String,
    /// Emit JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{err:#}");
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run(cli: Cli) -> Result<i32> {
    let (config, diagnostics) = load_config(cli.config.as_deref())?;
    njast_config::init_tracing(&config.logging);
    report_diagnostics(&diagnostics)?;

    match cli.command {
        Command::Parse(args) => {
            let mut options = config.parse_options();
            options.strict &= !args.lenient;
            options.partial = args.partial;
            if let Some(level) = args.level {
                if !matches!(level, 6 | 7) {
                    bail!("unsupported language level {level}; expected 6 or 7");
                }
                options = options.with_level(JavaLevel::new(level));
            }

            let text = read_source(&args.file)?;
            let summary = match parse(&args.file, &text, &options) {
                Ok(ast) => ParseSummary::new(&ast),
                Err(err) => ParseSummary::failed(&args.file, err),
            };
            let exit = if summary.errors.is_empty() { 0 } else { 1 };
            print_output(&summary, args.json)?;
            Ok(exit)
        }
        Command::Locate(args) => {
            let ast = parse_buffer(&args.file, &config)?;
            let id = locate(&ast, &args)?;
            print_output(&LocateReport::new(&ast, id), args.json)?;
            Ok(0)
        }
        Command::Type(args) => {
            let ast = Arc::new(parse_buffer(&args.file, &config)?);
            let id = locate(&ast, &args)?;
            let cache = resolver_cache(&config);
            let resolver = cache.from_ast(&ast);

            let node = LocateReport::new(&ast, id);
            match evaluate_type(&ast, id, resolver.as_ref()).await {
                Ok(resolved) => {
                    print_output(&TypeReport { node, resolved }, args.json)?;
                    Ok(0)
                }
                Err(err) => {
                    tracing::debug!(target: "njast.cli", error = ?err, "evaluation failed");
                    eprintln!("{} at {}: {err}", node.kind, node.span);
                    Ok(1)
                }
            }
        }
        Command::SuggestImport(args) => {
            let ast = Arc::new(parse_buffer(&args.file, &config)?);
            let cache = resolver_cache(&config);
            let resolver = cache.from_ast(&ast);
            let suggestions = resolver
                .suggest_import(&args.name)
                .await
                .with_context(|| format!("failed to list types for {}", args.name))?;
            print_output(&Suggestions { suggestions }, args.json)?;
            Ok(0)
        }
    }
}

fn load_config(explicit: Option<&Path>) -> Result<(NjastConfig, ConfigDiagnostics)> {
    if let Some(path) = explicit {
        return NjastConfig::load_from_path_with_diagnostics(path)
            .with_context(|| format!("failed to load config {}", path.display()));
    }
    let cwd = std::env::current_dir().context("failed to read the working directory")?;
    let (config, _path, diagnostics) = njast_config::load_for_dir(&cwd)?;
    Ok((config, diagnostics))
}

fn report_diagnostics(diagnostics: &ConfigDiagnostics) -> Result<()> {
    for key in &diagnostics.unknown_keys {
        tracing::warn!(target: "njast.cli", %key, "unknown config key");
    }
    for warning in &diagnostics.warnings {
        tracing::warn!(target: "njast.cli", ?warning, "config warning");
    }
    if let Some(error) = diagnostics.errors.first() {
        bail!("invalid config: {error:?}");
    }
    Ok(())
}

fn resolver_cache(config: &NjastConfig) -> ResolverCache {
    ResolverCache::new()
        .with_extra_roots(config.resolver.extra_source_roots.clone())
        .with_level(config.level())
        .with_caching(config.resolver.cache)
}

fn read_source(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Parses a file the way an editor buffer is parsed: leniently, under an
/// absolute path so that resolvers can find its project.
fn parse_buffer(path: &Path, config: &NjastConfig) -> Result<Ast> {
    let text = read_source(path)?;
    let path = std::path::absolute(path)
        .with_context(|| format!("failed to make {} absolute", path.display()))?;
    let options = ParseOptions {
        strict: false,
        ..config.parse_options()
    };
    parse(&path, &text, &options).with_context(|| format!("failed to parse {}", path.display()))
}

fn locate(ast: &Ast, args: &PositionArgs) -> Result<NodeId> {
    ast.locate(args.line, args.ch).with_context(|| {
        format!(
            "{}:{}:{} is outside the file",
            args.file.display(),
            args.line,
            args.ch
        )
    })
}

trait HumanOutput {
    fn print_human(&self);
}

fn print_output<T: Serialize + HumanOutput>(value: &T, json: bool) -> Result<()> {
    if json {
        let out = serde_json::to_string_pretty(value)?;
        println!("{out}");
    } else {
        value.print_human();
    }
    Ok(())
}

#[derive(Serialize)]
struct ImportSummary {
    path: String,
    is_static: bool,
    is_star: bool,
}

#[derive(Serialize)]
struct ParseSummary {
    path: PathBuf,
    package: Option<String>,
    imports: Vec<ImportSummary>,
    types: Vec<String>,
    members: Vec<String>,
    errors: Vec<SyntaxError>,
}

impl ParseSummary {
    fn new(ast: &Ast) -> Self {
        Self {
            path: ast.path().to_owned(),
            package: ast.package().map(str::to_owned),
            imports: ast
                .imports()
                .map(|import| ImportSummary {
                    path: import.path.clone(),
                    is_static: import.is_static,
                    is_star: import.is_star,
                })
                .collect(),
            types: ast.type_names().map(str::to_owned).collect(),
            members: ast
                .qualifieds()
                .keys()
                .filter(|name| name.contains('#'))
                .cloned()
                .collect(),
            errors: ast.errors().to_vec(),
        }
    }

    fn failed(path: &Path, error: SyntaxError) -> Self {
        Self {
            path: path.to_owned(),
            package: None,
            imports: Vec::new(),
            types: Vec::new(),
            members: Vec::new(),
            errors: vec![error],
        }
    }
}

impl HumanOutput for ParseSummary {
    fn print_human(&self) {
        if let Some(package) = &self.package {
            println!("package {package}");
        }
        for import in &self.imports {
            let kind = if import.is_static { "import static" } else { "import" };
            let star = if import.is_star { ".*" } else { "" };
            println!("{kind} {}{star}", import.path);
        }
        for ty in &self.types {
            println!("type {ty}");
        }
        for member in &self.members {
            println!("member {member}");
        }
        for error in &self.errors {
            println!("error:{}:{}: {}", error.line, error.ch, error.message);
        }
    }
}

#[derive(Serialize)]
struct LocateReport {
    kind: &'static str,
    span: Span,
    /// Kinds of the enclosing nodes, outermost first.
    ancestors: Vec<&'static str>,
}

impl LocateReport {
    fn new(ast: &Ast, id: NodeId) -> Self {
        let mut ancestors = ast
            .ancestors(id)
            .map(|ancestor| ast.kind(ancestor).name())
            .collect::<Vec<_>>();
        ancestors.reverse();
        Self {
            kind: ast.kind(id).name(),
            span: ast.span(id),
            ancestors,
        }
    }
}

impl HumanOutput for LocateReport {
    fn print_human(&self) {
        println!("{} {}", self.kind, self.span);
        if !self.ancestors.is_empty() {
            println!("  in {}", self.ancestors.join(" > "));
        }
    }
}

#[derive(Serialize)]
struct TypeReport {
    node: LocateReport,
    resolved: ResolvedType,
}

impl HumanOutput for TypeReport {
    fn print_human(&self) {
        let dims = "[]".repeat(self.resolved.array as usize);
        println!("{}{dims}", self.resolved.ty);
        println!("  from {:?} at {} {}", self.resolved.from, self.node.kind, self.node.span);
    }
}

#[derive(Serialize)]
struct Suggestions {
    suggestions: Vec<String>,
}

impl HumanOutput for Suggestions {
    fn print_human(&self) {
        for suggestion in &self.suggestions {
            println!("{suggestion}");
        }
    }
}
