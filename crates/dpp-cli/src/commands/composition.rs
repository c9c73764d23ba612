use dpp_view::{Composition, compute_composition};

use crate::util::{Context, print_json, read_json};

const SVG_SIZE: f64 = 200.0;

#[derive(clap::Args)]
pub struct Args {
    /// Path to a JSON list of records with a name and a numeric share (use - for stdin)
    pub items: String,
    /// Keep only the largest shares
    #[arg(long)]
    pub compact: bool,
    /// Output an SVG pie chart instead of JSON
    #[arg(long)]
    pub svg: bool,
}

pub fn run(args: Args, ctx: &Context) -> anyhow::Result<()> {
    let value = read_json(&args.items)?;

    let mut renderer = ctx.config.composition_renderer();
    renderer.compact |= args.compact;
    let items = renderer.items(&value);
    let composition = compute_composition(&items, renderer.compact, &renderer.palette);

    if args.svg {
        print!("{}", svg(&composition));
        Ok(())
    } else {
        print_json(&composition, ctx.pretty)
    }
}

fn svg(composition: &Composition) -> String {
    let center = SVG_SIZE / 2.0;
    let radius = center - 10.0;
    let mut out = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{SVG_SIZE}\" height=\"{SVG_SIZE}\" viewBox=\"0 0 {SVG_SIZE} {SVG_SIZE}\">\n"
    );
    for slice in &composition.slices {
        let path = slice.arc_path(center, center, radius);
        if path.is_empty() {
            continue;
        }
        out.push_str(&format!(
            "  <path d=\"{path}\" fill=\"{}\"><title>{}</title></path>\n",
            slice.color,
            escape(&slice.item.name)
        ));
    }
    out.push_str("</svg>\n");
    out
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
