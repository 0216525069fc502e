use anyhow::{Context, anyhow, bail};
use clap::{Parser, Subcommand, ValueEnum};
use qspec::{
    CompileOptions, Format, FunctionSignature, Registry, ScriptEvaluator, compile, compile_value,
    diagnostics, functions,
};
use serde::Serialize;

mod logging;

pub type Result<T> = anyhow::Result<T>;

#[derive(Parser)]
#[command(name = "qspec")]
#[command(about = "Compile query scripts into operation graphs", long_about = None)]
struct Cli {
    /// Raise log verbosity (-v debug, -vv trace). Also logs the compiled spec.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a script and print its operation graph.
    Compile {
        /// Script file to compile.
        script: String,

        /// Extra builtin script as NAME=PATH. May be repeated.
        #[arg(long = "builtin", value_name = "NAME=PATH")]
        builtins: Vec<String>,

        /// Export only the table bound to this variable, plus its ancestors.
        #[arg(long)]
        node: Option<String>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,

        #[arg(short = 'o', long)]
        out: Option<String>,
    },
    /// List builtin functions and their signatures as JSON.
    Functions,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

impl From<OutputFormat> for Format {
    fn from(f: OutputFormat) -> Self {
        match f {
            OutputFormat::Json => Format::Json,
            OutputFormat::Text => Format::Text,
        }
    }
}

#[derive(Serialize)]
struct FunctionInfo<'a> {
    name: &'a str,
    signature: &'a FunctionSignature,
    side_effect: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose)?;

    match cli.cmd {
        Commands::Compile {
            script,
            builtins,
            node,
            format,
            out,
        } => {
            // 1) Builtins: registration problems are fatal before any compile.
            let registry = build_registry(&builtins)?;

            // 2) Compile.
            let source = std::fs::read_to_string(&script)
                .with_context(|| format!("read script {}", script))?;
            let options = CompileOptions::default().verbose(cli.verbose > 0);
            let result = match &node {
                Some(name) => compile_value(&registry, &ScriptEvaluator, &source, name, &options),
                None => compile(&registry, &ScriptEvaluator, &source, &options),
            };
            let spec =
                result.map_err(|e| anyhow!(diagnostics::error_message(&script, &source, &e)))?;

            // 3) Render.
            let rendered = spec.formatted(format.into())?;
            match out {
                Some(out) => {
                    std::fs::write(&out, rendered).with_context(|| format!("write {}", out))?;
                    println!("Wrote {}", out);
                }
                None => print!("{}", rendered),
            }
        }
        Commands::Functions => {
            let registry = build_registry(&[])?;
            let listing: Vec<FunctionInfo> = registry
                .functions()
                .map(|f| FunctionInfo {
                    name: f.name(),
                    signature: f.signature(),
                    side_effect: f.has_side_effect(),
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&listing)?);
        }
    }

    Ok(())
}

fn build_registry(builtins: &[String]) -> Result<Registry> {
    let mut registry = Registry::new();
    functions::register_all(&mut registry)?;

    for spec in builtins {
        let Some((name, path)) = spec.split_once('=') else {
            bail!("--builtin expects NAME=PATH, got {}", spec);
        };
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("read builtin script {}", path))?;
        registry.register_script(name, &source)?;
    }

    registry.seal(&ScriptEvaluator).context("seal builtins")?;
    Ok(registry)
}
