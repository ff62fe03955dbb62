mod commands;
mod core;
mod release;
mod walk;

use crate::core::error::{WalkError, print_error};
use crate::walk::filter::VersionPolicy;
use clap::Parser;
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Walk version directories and run the release pipeline of every project they declare
#[derive(Parser)]
#[command(name = "release-walker")]
#[command(version, about, long_about = None)]
#[command(styles = get_styles())]
struct Cli {
  /// Directory to walk and clone projects into (default: current directory)
  #[arg(long)]
  root: Option<PathBuf>,

  /// Remove clones, container cache and volumes after each project [default: true]
  #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
  clean: Option<bool>,

  /// Comma-separated version directories to build [default: v1.18,v1.19,v1.20,v1.21]
  #[arg(long, conflicts_with = "all_versions")]
  versions: Option<String>,

  /// Build every version directory, ignoring the versions list
  #[arg(long)]
  all_versions: bool,

  /// Syntax a directory name must have to be treated as a version [default: major-minor]
  #[arg(long, value_enum)]
  version_policy: Option<VersionPolicy>,

  /// Print the steps that would run without running them
  #[arg(long)]
  dry_run: bool,

  /// Print the dry-run plan as JSON (implies --dry-run)
  #[arg(long)]
  json: bool,

  /// Show debug output (overridden by RUST_LOG)
  #[arg(short, long)]
  verbose: bool,
}

fn get_styles() -> clap::builder::Styles {
  clap::builder::Styles::styled()
    .usage(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .header(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .literal(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))))
    .invalid(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .error(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .valid(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
    )
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}

/// Status lines go to stderr so `--json` output on stdout stays parseable
fn init_tracing(verbose: bool) {
  let default_level = if verbose { "debug" } else { "info" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
  let _ = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_target(false)
    .with_ansi(std::io::stderr().is_terminal())
    .with_writer(std::io::stderr)
    .try_init();
}

fn main() {
  let cli = Cli::parse();
  init_tracing(cli.verbose);

  let result = commands::run_walk(commands::WalkArgs {
    root: cli.root,
    clean: cli.clean,
    versions: cli.versions,
    all_versions: cli.all_versions,
    version_policy: cli.version_policy,
    dry_run: cli.dry_run,
    json: cli.json,
  });

  if let Err(err) = result {
    handle_error(err);
  }
}

fn handle_error(err: WalkError) -> ! {
  print_error(&err);
  std::process::exit(1);
}
