use clap::Parser;
use wps_scene_viewer::{
    cli::Cli,
    console::{ConsoleSink, FileConsole, LogConsole},
    context::Context,
    data_structures::{modifier::ModelModifier, scene_graph::HeadlessScene},
    flow,
    resources::HttpFetcher,
};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let console: Box<dyn ConsoleSink> = match &cli.console {
        Some(path) => Box::new(FileConsole::open(path)?),
        None => Box::new(LogConsole),
    };
    let ctx = Context::new(
        HeadlessScene::new(),
        ModelModifier::default(),
        cli.form_fields(),
        cli.template.clone(),
        console,
    );

    flow::run(ctx, HttpFetcher::new(cli.assets.clone()))
}
