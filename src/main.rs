use anyhow::Context;
use clap::Parser;

use postercraft::cli::Cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let out = cli.out.clone();
    let written = postercraft::run(cli)
        .with_context(|| format!("failed to export poster to {}", out.display()))?;
    println!("{}", written.display());
    Ok(())
}
