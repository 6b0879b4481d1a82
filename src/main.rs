use clap::{Parser, Subcommand};
use relm4::prelude::*;
use std::path::PathBuf;
use vista::config;
use vista::gui::app::AppModel;
use vista::sys::runtime;

#[derive(Parser, Debug)]
#[command(name = "vista", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Use this config file instead of the per-user one
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Write the default config file (if missing) and print its path
    Init,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    if let Some(Commands::Init) = cli.command {
        let path = config::write_default_config(cli.config.as_deref())?;
        println!("{}", path.display());
        return Ok(());
    }

    let config_path = config::resolve_path(cli.config.as_deref())?;
    let config = config::load_or_default(Some(&config_path));

    let (tx, rx) = async_channel::bounded(32);

    // Start Background Services
    runtime::start_background_services(config_path.clone(), tx);

    // clap already consumed the arguments, keep GTK from parsing them again
    let app = RelmApp::new("org.vista.menu").with_args(Vec::new());
    app.run::<AppModel>((config, config_path, rx));

    Ok(())
}
