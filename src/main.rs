use std::io::{self, Write};
use std::process;

use anyhow::Result;
use clap::{CommandFactory, Parser};

mod aggregate;
mod analysis;
mod branches;
mod cli;
mod error;
mod estimate;
mod gitio;
mod model;
mod render;
#[cfg(test)]
mod stub;
mod util;
mod window;

use crate::cli::{normalize, Cli, Commands, OutputMode};
use crate::gitio::GitCli;

fn init_tracing(verbose: bool) {
  // stderr keeps stdout clean for the report itself
  let default_level = if verbose { "debug" } else { "warn" };
  tracing_subscriber::fmt()
    .with_writer(io::stderr)
    .with_env_filter(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
    )
    .init();
}

fn run(cli: Cli) -> Result<()> {
  if cli.gen_man {
    let page = util::render_man_page::<Cli>()?;
    print!("{}", page);
    return Ok(());
  }

  let Some(Commands::Analyze(args)) = cli.command else {
    Cli::command().print_help()?;
    return Ok(());
  };

  let cfg = normalize(args)?;
  let now = util::effective_now(window::parse_now_override(cfg.now_override.as_deref()));

  let vcs = GitCli::new(cfg.options.directory.clone());
  let analysis = analysis::run_analysis(&vcs, &cfg.options, now)?;

  let stdout = io::stdout();
  let mut out = stdout.lock();
  match &cfg.output {
    OutputMode::Console => render::render_console(&mut out, &analysis)?,
    OutputMode::Plain => render::render_plain(&mut out, &analysis)?,
    OutputMode::Json => render::render_json(&mut out, &analysis)?,
    OutputMode::Markdown { path } => {
      render::export_markdown(path, &analysis, now)?;
      writeln!(out, "Report written to {} ({} commits)", path.display(), analysis.commits.len())?;
    }
  }
  out.flush()?;
  Ok(())
}

fn main() {
  let cli = Cli::parse();
  init_tracing(cli.verbose);

  if let Err(e) = run(cli) {
    eprintln!("Error: {e}");
    for cause in e.chain().skip(1) {
      eprintln!("  Caused by: {cause}");
    }
    process::exit(1);
  }
}
