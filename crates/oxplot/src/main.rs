//! Oxplot builds SVG scenes and writes them as documents.

use clap::Parser;
use oxplot::{
    args::{Args, Command, RunCommand},
    config::Config,
};

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    let config = Config::load()?;

    match args.command {
        Command::Demo(args) => args.run(config)?,
        Command::Build(args) => args.run(config)?,
    }
    Ok(())
}
