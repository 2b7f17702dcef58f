//! CLI output formatting utilities.
//!
//! Stage banners, status lines and the end-of-run summary. Command echoes
//! come from the runner itself and are not formatted here.

use std::path::Path;
use std::time::Duration;

use kiln_lib::consts::LOCATOR_ENV;
use kiln_lib::pipeline::Report;
use kiln_lib::{Progress, Stage, StageStatus};
use owo_colors::{OwoColorize, Stream};

pub mod symbols {
  pub const SUCCESS: &str = "✓";
  pub const ERROR: &str = "✗";
  pub const INFO: &str = "•";
  pub const STAGE: &str = "==>";
}

pub fn format_duration(duration: Duration) -> String {
  let secs = duration.as_secs();
  let millis = duration.subsec_millis();

  if secs >= 3600 {
    format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
  } else if secs >= 60 {
    format!("{}m {}s", secs / 60, secs % 60)
  } else if secs > 0 {
    format!("{}.{:02}s", secs, millis / 10)
  } else {
    format!("{}ms", millis)
  }
}

pub fn print_success(message: &str) {
  println!(
    "{} {}",
    symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green()),
    message
  );
}

pub fn print_error(message: &str) {
  eprintln!(
    "{} {}",
    symbols::ERROR.if_supports_color(Stream::Stderr, |s| s.red()),
    message.if_supports_color(Stream::Stderr, |s| s.red())
  );
}

pub fn print_info(message: &str) {
  println!(
    "{} {}",
    symbols::INFO.if_supports_color(Stream::Stdout, |s| s.blue()),
    message
  );
}

pub fn print_stat(label: &str, value: &str) {
  println!(
    "  {}: {}",
    label.if_supports_color(Stream::Stdout, |s| s.dimmed()),
    value
  );
}

pub fn print_banner(stage: Stage) {
  println!(
    "{} {}",
    symbols::STAGE.if_supports_color(Stream::Stdout, |s| s.cyan()),
    stage.banner().if_supports_color(Stream::Stdout, |s| s.bold())
  );
}

pub fn print_locator(locator: &Path) {
  println!("{} set to: {}", LOCATOR_ENV, locator.display());
}

/// Progress callback for [`kiln_lib::Pipeline::execute`].
pub fn print_progress(progress: Progress<'_>) {
  match progress {
    Progress::StageStarted(stage) => print_banner(stage),
    Progress::StageFinished(Stage::Toolchain, StageStatus::Skipped) => {
      print_info("Toolchain already built, skipping rebuild.")
    }
    Progress::StageFinished(..) => {}
    Progress::LocatorResolved(locator) => print_locator(locator),
  }
}

pub fn print_report(report: &Report) {
  print_success("Done!");
  for stage in &report.stages {
    let value = match stage.status {
      StageStatus::Ran => format_duration(stage.elapsed),
      StageStatus::Skipped => "skipped".to_string(),
    };
    print_stat(stage.stage.name(), &value);
  }
  print_stat("total", &format_duration(report.total()));
}
