use dpp_view::extract_metrics_with;

use crate::util::{Context, print_json, read_json};

#[derive(clap::Args)]
pub struct Args {
    /// Path to the passport data (use - for stdin)
    pub data: String,
}

pub fn run(args: Args, ctx: &Context) -> anyhow::Result<()> {
    let data = read_json(&args.data)?;
    let metrics = extract_metrics_with(&data, &ctx.config.metrics);
    print_json(&metrics, ctx.pretty)
}
