use dpp_view::{CustomRenderers, ExpandState, Parser, RenderNode, Renderer};
use serde::Serialize;
use tracing::debug;

use crate::commands::tabs::select_tab;
use crate::outline::outline;
use crate::util::{Context, ensure_single_stdin, print_json, read_json, read_schema};

#[derive(clap::Args)]
pub struct Args {
    /// Path to the passport JSON Schema (use - for stdin)
    pub schema: String,
    /// Path to the passport data (use - for stdin)
    pub data: String,
    /// Only render the tab with this id
    #[arg(long)]
    pub tab: Option<String>,
    /// Expand the group with this node id (key path joined by '/')
    #[arg(long, value_name = "NODE")]
    pub expand: Vec<String>,
    /// Collapse the group with this node id (key path joined by '/')
    #[arg(long, value_name = "NODE")]
    pub collapse: Vec<String>,
    /// Property key rendered as a composition chart
    #[arg(long, value_name = "KEY", default_value = "materialComposition")]
    pub chart: Vec<String>,
    /// Output the render tree as JSON instead of an outline
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct RenderedTab {
    id: String,
    label: String,
    nodes: Vec<RenderNode>,
}

pub fn run(args: Args, ctx: &Context) -> anyhow::Result<()> {
    ensure_single_stdin(&[args.schema.as_str(), args.data.as_str()])?;
    let schema = read_schema(&args.schema, ctx)?;
    let data = read_json(&args.data)?;

    let mut tabs = Parser::new(&schema, &ctx.config.parser).generate_tabs(&data);
    if let Some(id) = &args.tab {
        tabs = vec![select_tab(tabs, id)?];
    }

    let mut state = ExpandState::new();
    for id in args.expand {
        state.set(id, true);
    }
    for id in args.collapse {
        state.set(id, false);
    }

    let mut custom = CustomRenderers::new();
    for key in args.chart {
        debug!(key = %key, "registering composition chart");
        custom.register(key, ctx.config.composition_renderer());
    }

    let renderer = Renderer::new(&ctx.config.render, &custom);
    let rendered: Vec<RenderedTab> = tabs
        .into_iter()
        .map(|tab| RenderedTab {
            nodes: renderer.render(&tab.properties, 0, &state, &data),
            id: tab.id,
            label: tab.label,
        })
        .collect();

    if args.json {
        return print_json(&rendered, ctx.pretty);
    }
    let text: Vec<String> = rendered
        .iter()
        .map(|tab| outline(&tab.label, &tab.nodes))
        .collect();
    print!("{}", text.join("\n"));
    Ok(())
}
