use std::path::PathBuf;
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use kiln_lib::{Action, CompilerProfile, PipelineError};
use tracing_subscriber::EnvFilter;

mod output;
mod run;

/// kiln - bring up a pinned LLVM toolchain and build/run a Go project against it
#[derive(Parser)]
#[command(name = "kiln")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// What to do: build, run, all or clean (default: all)
  #[arg(value_name = "ACTION")]
  action: Option<String>,

  /// Configuration file (default: ./kiln.toml when present)
  #[arg(short, long, env = "KILN_CONFIG")]
  config: Option<PathBuf>,

  /// Compiler profile for the toolchain build: vendor or self-hosting
  #[arg(long)]
  profile: Option<CompilerProfile>,

  /// Worker count for the toolchain build (default: processors - 1)
  #[arg(short, long)]
  jobs: Option<usize>,

  /// Do not fetch the binding package
  #[arg(long)]
  skip_bindings: bool,

  /// Print the commands that would run without running them
  #[arg(long)]
  dry_run: bool,

  /// Enable verbose output (-v info, -vv debug)
  #[arg(short, long, action = clap::ArgAction::Count)]
  verbose: u8,
}

fn main() -> ExitCode {
  let cli = Cli::parse();

  let default_level = match cli.verbose {
    0 => "warn",
    1 => "info",
    _ => "debug",
  };
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  let action = match Action::parse(cli.action.as_deref()) {
    Ok(action) => action,
    Err(err) => {
      output::print_error(&err.to_string());
      println!("{}", Cli::command().render_usage());
      return ExitCode::FAILURE;
    }
  };

  let options = run::Options {
    config: cli.config,
    profile: cli.profile,
    jobs: cli.jobs,
    skip_bindings: cli.skip_bindings,
    dry_run: cli.dry_run,
  };

  match run::cmd_run(action, &options) {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) => {
      output::print_error(&format!("{:#}", err));
      let code = err
        .downcast_ref::<PipelineError>()
        .map(PipelineError::exit_code)
        .unwrap_or(1);
      exit_code(code)
    }
  }
}

/// Map a child's exit status onto ours; anything unrepresentable becomes 1.
fn exit_code(code: i32) -> ExitCode {
  match u8::try_from(code) {
    Ok(0) | Err(_) => ExitCode::FAILURE,
    Ok(code) => ExitCode::from(code),
  }
}
