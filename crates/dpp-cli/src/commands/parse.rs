use dpp_view::Parser;

use crate::util::{Context, ensure_single_stdin, print_json, read_json, read_schema};

#[derive(clap::Args)]
pub struct Args {
    /// Path to the passport JSON Schema (use - for stdin)
    pub schema: String,
    /// Path to the passport data (use - for stdin)
    pub data: String,
}

pub fn run(args: Args, ctx: &Context) -> anyhow::Result<()> {
    ensure_single_stdin(&[args.schema.as_str(), args.data.as_str()])?;
    let schema = read_schema(&args.schema, ctx)?;
    let data = read_json(&args.data)?;

    let properties = Parser::new(&schema, &ctx.config.parser).parse_schema(&data);
    print_json(&properties, ctx.pretty)
}
