use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use slidescene::{ConvertOptions, GroupMode};
use std::fs;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "slidescene")]
#[command(about = "Convert PowerPoint presentations to and from canvas scene JSON")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert a .pptx file to scene JSON
    ToJson {
        /// Presentation to read
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Keep group objects nested instead of splicing their children
        #[arg(long)]
        nested: bool,

        /// Resolve theme style references for shapes without explicit fill or line
        #[arg(long)]
        style_fallback: bool,

        /// Also prepend the slide background rectangle to the object list
        #[arg(long)]
        background_in_objects: bool,

        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },

    /// Build a .pptx file from scene JSON
    ToPptx {
        /// Scene JSON: a slide array or an object with a "fabric" array
        input: PathBuf,

        /// Presentation to write
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn init_logging() {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(env_filter)
        .init();
}

fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();

    match args.command {
        Command::ToJson {
            input,
            output,
            nested,
            style_fallback,
            background_in_objects,
            pretty,
        } => {
            let mode = if nested { GroupMode::Nested } else { GroupMode::Flatten };
            let options = ConvertOptions::default()
                .with_group_mode(mode)
                .with_style_fallback(style_fallback)
                .with_background_in_objects(background_in_objects);

            let slides = slidescene::pptx_file_to_scene(&input, &options)
                .with_context(|| format!("failed to convert {}", input.display()))?;
            let json = if pretty {
                serde_json::to_string_pretty(&slides)?
            } else {
                serde_json::to_string(&slides)?
            };
            match output {
                Some(path) => {
                    fs::write(&path, json).with_context(|| format!("failed to write {}", path.display()))?;
                    info!(slides = slides.len(), output = %path.display(), "scene written");
                },
                None => println!("{json}"),
            }
        },
        Command::ToPptx { input, output } => {
            let json = fs::read_to_string(&input).with_context(|| format!("failed to read {}", input.display()))?;
            let bytes = slidescene::scene_json_to_pptx(&json, &ConvertOptions::default())
                .with_context(|| format!("failed to build a presentation from {}", input.display()))?;
            fs::write(&output, bytes).with_context(|| format!("failed to write {}", output.display()))?;
            info!(output = %output.display(), "presentation written");
        },
    }

    Ok(())
}
