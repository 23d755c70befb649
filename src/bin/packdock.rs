//! Operator CLI for the bootstrap layer.
//!
//! `check` validates configuration and prints the aggregated report,
//! `plan` bootstraps and prints which implementation answered each
//! capability, `migrate` brings the resolved database context up to date,
//! and `import-downloads` applies an external downloads report. Serving
//! HTTP is the embedding web host's job, not this binary's.

use anyhow::{Context, Result, bail};
use packdock::{BootstrapOptions, DownloadsImporter, bootstrap, check_configuration};
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse()?;
    let boot = BootstrapOptions {
        config_root: cli.config_root,
        secrets_dir: cli.secrets_dir,
    };

    match cli.command {
        Command::Check => {
            let (_, report) = check_configuration(&boot)?;
            if report.is_empty() {
                println!("configuration ok");
                return Ok(ExitCode::SUCCESS);
            }
            for line in &report {
                eprintln!("{line}");
            }
            Ok(ExitCode::FAILURE)
        }
        Command::Plan => {
            let services = bootstrap(&boot, |_, _| {})?;
            let summary = services.provider_summary();
            println!("{}", serde_json::to_string_pretty(&summary)?);
            Ok(ExitCode::SUCCESS)
        }
        Command::Migrate => {
            let services = bootstrap(&boot, |_, _| {})?;
            services
                .context
                .run_migrations()
                .context("running schema migrations")?;
            println!("migrations applied ({})", services.context.name());
            Ok(ExitCode::SUCCESS)
        }
        Command::ImportDownloads => {
            let services = bootstrap(&boot, |_, _| {})?;
            let Some(report) = services.options.statistics.downloads_source.clone() else {
                bail!("statistics.downloads_source is not configured");
            };
            let importer =
                DownloadsImporter::from_report_path(&PathBuf::from(report), services.context.clone());
            let applied = importer.import()?;
            println!("imported {applied} download counts");
            Ok(ExitCode::SUCCESS)
        }
    }
}

struct Cli {
    command: Command,
    config_root: Option<PathBuf>,
    secrets_dir: Option<PathBuf>,
}

enum Command {
    Check,
    Plan,
    Migrate,
    ImportDownloads,
}

impl Cli {
    fn parse() -> Result<Self> {
        let mut args = env::args();
        let _program = args.next();

        let mut command = None;
        let mut config_root = None;
        let mut secrets_dir = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config-root" => {
                    let value = args
                        .next()
                        .with_context(|| "--config-root requires a directory")?;
                    config_root = Some(PathBuf::from(value));
                }
                "--secrets-dir" => {
                    let value = args
                        .next()
                        .with_context(|| "--secrets-dir requires a directory")?;
                    secrets_dir = Some(PathBuf::from(value));
                }
                "--help" | "-h" => usage(0),
                "check" if command.is_none() => command = Some(Command::Check),
                "plan" if command.is_none() => command = Some(Command::Plan),
                "migrate" if command.is_none() => command = Some(Command::Migrate),
                "import-downloads" if command.is_none() => {
                    command = Some(Command::ImportDownloads)
                }
                other => bail!("unrecognized argument '{other}' (try --help)"),
            }
        }

        let Some(command) = command else {
            usage(1);
        };

        Ok(Self {
            command,
            config_root,
            secrets_dir,
        })
    }
}

fn usage(code: i32) -> ! {
    eprintln!(
        "Usage: packdock [--config-root DIR] [--secrets-dir DIR] <command>\n\
         \n\
         Commands:\n\
         \x20 check             validate configuration and print every violation\n\
         \x20 plan              bootstrap and print the resolved provider set\n\
         \x20 migrate           bootstrap and run database schema migrations\n\
         \x20 import-downloads  apply the configured downloads report"
    );
    std::process::exit(code);
}
