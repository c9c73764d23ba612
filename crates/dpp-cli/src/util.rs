use std::fs;
use std::io::{self, Read};
use std::path::Path;

use anyhow::{Context as _, bail};
use dpp_config::ViewConfig;
use dpp_schema::JsonSchema;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

/// Settings shared by all commands.
pub struct Context {
    pub config: ViewConfig,
    pub pretty: bool,
}

/// Read input from a file path, or from stdin when the path is `-`.
pub fn read_input(path: &str) -> anyhow::Result<String> {
    if path == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Error reading from stdin")?;
        Ok(buffer)
    } else {
        fs::read_to_string(path).with_context(|| format!("Error reading file {path}"))
    }
}

/// Helper to get display path for error messages
pub fn display_path(path: &str) -> &str {
    if path == "-" { "<stdin>" } else { path }
}

pub fn read_json(path: &str) -> anyhow::Result<Value> {
    let content = read_input(path)?;
    serde_json::from_str(&content)
        .with_context(|| format!("Invalid JSON in {}", display_path(path)))
}

/// Read and lower a passport schema using the configured semantic-id key.
pub fn read_schema(path: &str, ctx: &Context) -> anyhow::Result<JsonSchema> {
    let value = read_json(path)?;
    let schema = ctx.config.parser.lower_schema(&value);
    debug!(
        path = display_path(path),
        components = schema.components.len(),
        "loaded schema"
    );
    Ok(schema)
}

/// Stdin can only be consumed once.
pub fn ensure_single_stdin(paths: &[&str]) -> anyhow::Result<()> {
    if paths.iter().filter(|path| **path == "-").count() > 1 {
        bail!("only one input can be read from stdin");
    }
    Ok(())
}

pub fn print_json<T: Serialize>(value: &T, pretty: bool) -> anyhow::Result<()> {
    let output = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .context("Error serializing JSON")?;
    println!("{output}");
    Ok(())
}

/// The explicit configuration file, else the nearest one above the working
/// directory, else the defaults.
pub fn load_config(explicit: Option<&Path>) -> anyhow::Result<ViewConfig> {
    if let Some(path) = explicit {
        return ViewConfig::load(path)
            .with_context(|| format!("Error loading configuration {}", path.display()));
    }
    let cwd = std::env::current_dir().context("Error reading the working directory")?;
    match ViewConfig::load_from_dir(&cwd) {
        Ok(Some((path, config))) => {
            info!(path = %path.display(), "using configuration file");
            Ok(config)
        }
        Ok(None) => Ok(ViewConfig::default()),
        Err(e) => Err(e).context("Error loading configuration"),
    }
}
