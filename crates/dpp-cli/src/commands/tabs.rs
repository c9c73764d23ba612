use anyhow::bail;
use dpp_view::{Parser, TabDefinition};

use crate::util::{Context, ensure_single_stdin, print_json, read_json, read_schema};

#[derive(clap::Args)]
pub struct Args {
    /// Path to the passport JSON Schema (use - for stdin)
    pub schema: String,
    /// Path to the passport data (use - for stdin)
    pub data: String,
    /// Only output the tab with this id
    #[arg(long)]
    pub tab: Option<String>,
}

pub fn run(args: Args, ctx: &Context) -> anyhow::Result<()> {
    ensure_single_stdin(&[args.schema.as_str(), args.data.as_str()])?;
    let schema = read_schema(&args.schema, ctx)?;
    let data = read_json(&args.data)?;

    let tabs = Parser::new(&schema, &ctx.config.parser).generate_tabs(&data);
    match args.tab {
        Some(id) => print_json(&select_tab(tabs, &id)?, ctx.pretty),
        None => print_json(&tabs, ctx.pretty),
    }
}

/// Pick one tab by id.
pub fn select_tab(tabs: Vec<TabDefinition>, id: &str) -> anyhow::Result<TabDefinition> {
    let available: Vec<String> = tabs.iter().map(|tab| tab.id.clone()).collect();
    match tabs.into_iter().find(|tab| tab.id == id) {
        Some(tab) => Ok(tab),
        None => bail!("no tab '{id}' (available: {})", available.join(", ")),
    }
}
