//! CLI: reads a JSON Schema from a file or stdin and writes Joi source.
//!
//! Usage:
//!   joi-codegen schema.json > schema.ts
//!   joi-codegen --bundle --types --export openapi.json -o schemas.ts
//!   joi-codegen --legacy --extension < schema.json
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use joi_codegen::options::CodegenConfig;

#[derive(Parser)]
#[command(name = "joi-codegen")]
#[command(version, about = "Generate Joi validators from JSON Schema", long_about = None)]
struct Cli {
    /// Schema document; `-` or nothing reads stdin
    input: Option<PathBuf>,

    /// Output file; stdout when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Convert every entry of `definitions` / `components.schemas`
    #[arg(long)]
    bundle: bool,

    /// Target the legacy `joi` package (Joi.lazy self references)
    #[arg(long)]
    legacy: bool,

    /// Emit allOf/oneOf through the extendedJoi extension
    #[arg(long)]
    extension: bool,

    /// Identifier the Joi library is imported as
    #[arg(long)]
    joi_name: Option<String>,

    /// Property holding the allOf/oneOf extension
    #[arg(long)]
    extended_joi_name: Option<String>,

    /// Annotate bindings with their Joi schema type
    #[arg(long)]
    types: bool,

    /// Prefix every binding with `export`
    #[arg(long)]
    export: bool,

    /// Binding label for a root schema without a title
    #[arg(long)]
    label: Option<String>,

    /// JSON config file; flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Named document for `<ID>#/...` references (repeatable)
    #[arg(long = "sub-schema", value_name = "ID=FILE")]
    sub_schemas: Vec<String>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn config(&self) -> Result<CodegenConfig> {
        let mut config = match &self.config {
            Some(path) => CodegenConfig::from_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => CodegenConfig::default(),
        };
        config.dialect.use_legacy |= self.legacy;
        config.dialect.use_extension |= self.extension;
        config.format.with_type_declaration |= self.types;
        if self.export {
            config.format.export_prefix = "export ".into();
        }
        if let Some(name) = &self.joi_name {
            config.format.joi_name = name.clone();
        }
        if let Some(name) = &self.extended_joi_name {
            config.format.extended_joi_name = name.clone();
        }
        if let Some(label) = &self.label {
            config.label = label.clone();
        }
        for entry in &self.sub_schemas {
            let (id, path) = entry
                .split_once('=')
                .with_context(|| format!("--sub-schema expects ID=FILE, got '{entry}'"))?;
            let document = joi_codegen::load_document(Path::new(path))
                .with_context(|| format!("loading sub-schema {path}"))?;
            config.sub_schemas.insert(id.to_string(), document);
        }
        Ok(config)
    }

    fn read_input(&self) -> Result<serde_json::Value> {
        match self.input.as_deref() {
            Some(path) if path.as_os_str() != "-" => joi_codegen::load_document(path)
                .with_context(|| format!("loading schema {}", path.display())),
            _ => {
                let mut text = String::new();
                std::io::stdin()
                    .read_to_string(&mut text)
                    .context("reading schema from stdin")?;
                serde_json::from_str(&text).context("parsing schema from stdin")
            }
        }
    }
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_filter(filter);

    if tracing_subscriber::registry()
        .with(fmt_layer)
        .try_init()
        .is_err()
    {
        eprintln!("Warning: tracing subscriber already initialized");
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = cli.config()?;
    let document = cli.read_input()?;

    let source = if cli.bundle {
        joi_codegen::convert_document(&document, &config).context("converting bundle")?
    } else {
        joi_codegen::convert(&document, &config).context("converting schema")?
    };

    match &cli.output {
        Some(path) => std::fs::write(path, &source)
            .with_context(|| format!("writing {}", path.display()))?,
        None => print!("{source}"),
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    run(&cli)
}
