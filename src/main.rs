use std::fs;
use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use gymstats::aggregate;
use gymstats::chart;
use gymstats::config::{Cli, Command};
use gymstats::filter;
use gymstats::server;

fn main() -> Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let cli = Cli::parse();

    match cli.command {
        Command::Serve(args) => {
            let dataset = args.data.load().context("Failed to load datasets")?;
            actix_web::rt::System::new()
                .block_on(server::run_server(&args.host, args.port, Arc::new(dataset)))
                .with_context(|| format!("Server on {}:{} failed", args.host, args.port))?;
        }
        Command::Summary { data, filter: filter_args } => {
            let dataset = data.load().context("Failed to load datasets")?;
            let criteria = filter_args.criteria()?;
            let view = filter::filter(dataset.members(), &criteria);
            let json = serde_json::to_string_pretty(&aggregate::summary(&view))
                .context("Failed to serialize summary")?;
            println!("{}", json);
        }
        Command::Chart {
            kind,
            data,
            filter: filter_args,
            render,
            output,
        } => {
            let dataset = data.load().context("Failed to load datasets")?;
            let criteria = filter_args.criteria()?;
            let view = filter::filter(dataset.members(), &criteria);
            let rendered = chart::render(kind, &view, &render.options())
                .with_context(|| format!("Failed to render {}", kind))?;

            match output {
                Some(path) => {
                    fs::write(&path, &rendered.bytes)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    log::info!("wrote {} to {}", kind, path.display());
                }
                None => {
                    let stdout = io::stdout();
                    let mut handle = stdout.lock();
                    handle
                        .write_all(&rendered.bytes)
                        .context("Failed to write image to stdout")?;
                    handle.flush().context("Failed to flush stdout")?;
                }
            }
        }
    }

    Ok(())
}
