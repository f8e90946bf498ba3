use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use offline_html_bundler::{BundleReport, Bundler, BundlerConfig, InputPolicy, NavigationLayout};

/// Combine HTML files, images and text into one self-contained HTML page.
#[derive(Debug, Parser)]
#[command(name = "offline-html-bundler", version)]
#[command(args_conflicts_with_subcommands = true, arg_required_else_help = true)]
struct Cli {
  #[command(subcommand)]
  command: Option<Command>,

  #[command(flatten)]
  bundle: BundleArgs,
}

#[derive(Debug, Subcommand)]
enum Command {
  /// Print version information
  Version {
    /// Include repository, target and build profile
    #[arg(short, long)]
    detail: bool,
  },
}

#[derive(Debug, Args)]
struct BundleArgs {
  /// File the bundle is written to
  output: Option<PathBuf>,

  /// Files and directories to include
  inputs: Vec<PathBuf>,

  /// Configuration file (defaults to offline-html.config.json when present)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Page title
  #[arg(long)]
  title: Option<String>,

  /// Navigation layout
  #[arg(long, value_enum)]
  layout: Option<NavigationLayout>,

  /// Fetch and inline http(s) resources
  #[arg(long)]
  fetch_remote: bool,

  /// Timeout in seconds for each remote fetch
  #[arg(long, value_name = "SECS")]
  timeout: Option<u64>,

  /// Warn about missing or unreadable inputs instead of failing
  #[arg(long)]
  skip_unreadable: bool,

  /// Do not embed the original bytes of each file
  #[arg(long)]
  no_originals: bool,

  /// Custom page template
  #[arg(long)]
  template: Option<PathBuf>,
}

impl BundleArgs {
  fn load_config(&self) -> Result<BundlerConfig> {
    let mut config = match &self.config {
      Some(path) => BundlerConfig::from_path(path)?,
      None => BundlerConfig::discover(&std::env::current_dir().context("no working directory")?),
    };

    if let Some(title) = &self.title {
      config.title = title.clone();
    }
    if let Some(layout) = self.layout {
      config.layout = layout;
    }
    if self.fetch_remote {
      config.fetch_remote = true;
    }
    if let Some(timeout) = self.timeout {
      config.fetch_timeout_secs = timeout;
    }
    if self.skip_unreadable {
      config.input_policy = InputPolicy::Skip;
    }
    if self.no_originals {
      config.embed_originals = false;
    }
    if let Some(template) = &self.template {
      config.template = Some(template.clone());
    }
    Ok(config)
  }
}

fn main() -> Result<()> {
  env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

  let cli = Cli::parse();
  match cli.command {
    Some(Command::Version { detail }) => print_version(&mut io::stdout().lock(), detail)?,
    None => {
      let report = run(&cli.bundle)?;
      print_report(&mut io::stdout().lock(), &report)?;
    }
  }
  Ok(())
}

fn run(args: &BundleArgs) -> Result<BundleReport> {
  let output = args
    .output
    .as_deref()
    .context("missing output file argument")?;
  if args.inputs.is_empty() {
    anyhow::bail!("at least one input file or directory is required");
  }

  let config = args.load_config()?;
  let bundler = Bundler::new(config)?;
  let report = bundler
    .bundle_to(&args.inputs, output)
    .with_context(|| format!("failed to bundle into {}", output.display()))?;
  Ok(report)
}

fn print_report(w: &mut impl Write, report: &BundleReport) -> io::Result<()> {
  writeln!(
    w,
    "Successfully combined {} files into {}",
    report.entries,
    report.output.display()
  )?;
  if report.failed > 0 {
    writeln!(
      w,
      "{} could not be inlined",
      counted(report.failed, "resource reference", "resource references")
    )?;
  }
  if !report.warnings.is_empty() {
    writeln!(
      w,
      "{}:",
      counted(report.warnings.len(), "warning", "warnings")
    )?;
    for warning in &report.warnings {
      writeln!(w, "  {warning}")?;
    }
  }
  Ok(())
}

fn counted(count: usize, singular: &str, plural: &str) -> String {
  let noun = if count == 1 { singular } else { plural };
  format!("{count} {noun}")
}

fn print_version(w: &mut impl Write, detail: bool) -> io::Result<()> {
  writeln!(
    w,
    "{} {}",
    env!("CARGO_PKG_NAME"),
    env!("CARGO_PKG_VERSION")
  )?;
  if detail {
    let repository = env!("CARGO_PKG_REPOSITORY");
    if !repository.is_empty() {
      writeln!(w, "repository: {repository}")?;
    }
    writeln!(
      w,
      "target: {}-{}",
      std::env::consts::OS,
      std::env::consts::ARCH
    )?;
    let profile = if cfg!(debug_assertions) {
      "debug"
    } else {
      "release"
    };
    writeln!(w, "profile: {profile}")?;
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_output_and_inputs() {
    let cli = Cli::try_parse_from([
      "offline-html-bundler",
      "out.html",
      "a.html",
      "docs",
      "--layout",
      "tabs",
      "--skip-unreadable",
    ])
    .unwrap();

    assert!(cli.command.is_none());
    assert_eq!(cli.bundle.output, Some(PathBuf::from("out.html")));
    assert_eq!(
      cli.bundle.inputs,
      [PathBuf::from("a.html"), PathBuf::from("docs")]
    );
    assert_eq!(cli.bundle.layout, Some(NavigationLayout::Tabs));
    assert!(cli.bundle.skip_unreadable);
  }

  #[test]
  fn parses_version_subcommand() {
    let cli = Cli::try_parse_from(["offline-html-bundler", "version", "--detail"]).unwrap();
    assert!(matches!(cli.command, Some(Command::Version { detail: true })));
  }

  #[test]
  fn flags_override_config() {
    let cli = Cli::try_parse_from([
      "offline-html-bundler",
      "out.html",
      "a.html",
      "--title",
      "Docs",
      "--fetch-remote",
      "--timeout",
      "3",
      "--no-originals",
    ])
    .unwrap();

    let config = cli.bundle.load_config().unwrap();
    assert_eq!(config.title, "Docs");
    assert!(config.fetch_remote);
    assert_eq!(config.fetch_timeout_secs, 3);
    assert!(!config.embed_originals);
  }

  #[test]
  fn missing_inputs_are_rejected() {
    let cli = Cli::try_parse_from(["offline-html-bundler", "out.html"]).unwrap();
    assert!(run(&cli.bundle).is_err());
  }

  #[test]
  fn version_output_includes_detail() {
    let mut short = Vec::new();
    print_version(&mut short, false).unwrap();
    let short = String::from_utf8(short).unwrap();
    assert!(short.starts_with("offline_html_bundler "));
    assert_eq!(short.lines().count(), 1);

    let mut long = Vec::new();
    print_version(&mut long, true).unwrap();
    let long = String::from_utf8(long).unwrap();
    assert!(long.contains("target: "));
    assert!(long.contains("profile: "));
  }

  #[test]
  fn report_lists_warnings() {
    let report = BundleReport {
      output: PathBuf::from("out.html"),
      entries: 2,
      inlined: 1,
      failed: 1,
      warnings: vec!["skipping input: gone".into()],
    };
    let mut buffer = Vec::new();
    print_report(&mut buffer, &report).unwrap();
    let text = String::from_utf8(buffer).unwrap();

    assert!(text.starts_with("Successfully combined 2 files into out.html"));
    assert!(text.contains("\n1 warning:\n"));
    assert!(text.contains("1 resource reference could not be inlined"));
  }

  #[test]
  fn report_pluralises_counts() {
    let report = BundleReport {
      output: PathBuf::from("out.html"),
      entries: 3,
      inlined: 0,
      failed: 2,
      warnings: vec!["a".into(), "b".into()],
    };
    let mut buffer = Vec::new();
    print_report(&mut buffer, &report).unwrap();
    let text = String::from_utf8(buffer).unwrap();

    assert!(text.contains("2 resource references could not be inlined"));
    assert!(text.contains("2 warnings:"));
  }
}
