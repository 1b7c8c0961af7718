//! `cmig` - migrate legacy command descriptions into layered service artifacts
//!
//! Results and summaries go to stdout as JSON; logs go to stderr.
//!
//! Exit codes: 0 success, 1 job failure (or an `Invalid` verdict with
//! `--strict`), 2 unusable configuration or rule table.

use anyhow::{bail, Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use cmig_core::{batch, ConfigError, ConversionError, Converter, ConverterConfig, ErrorReason};
use cmig_engine::RawCommand;
use cmig_rules::{loader, RuleFormat, RuleTableDocument, RuleTableError};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const EXIT_JOB: u8 = 1;
const EXIT_SETUP: u8 = 2;

const DEFAULT_LOG_FILTER: &str = "cmig=info";

fn cli() -> Command {
    Command::new("cmig")
        .version(cmig_core::VERSION)
        .about("Rule-driven migration of legacy commands into layered service artifacts")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("rules")
                .long("rules")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Rule table (.yaml, .json or .toml); overrides the config file"),
        )
        .arg(
            Arg::new("strict")
                .long("strict")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Exit non-zero when a result is Invalid"),
        )
        .arg(
            Arg::new("log-format")
                .long("log-format")
                .global(true)
                .default_value("text")
                .value_parser(["text", "json"])
                .help("Log format on stderr"),
        )
        .subcommand(
            Command::new("convert")
                .about("Convert one command file and print the result")
                .arg(
                    Arg::new("file")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Command description (.json, .yaml or .yml)"),
                )
                .arg(
                    Arg::new("render")
                        .long("render")
                        .value_name("DIR")
                        .value_parser(value_parser!(PathBuf))
                        .help("Also write the result and rendered sources under DIR"),
                )
                .arg(
                    Arg::new("pretty")
                        .long("pretty")
                        .action(ArgAction::SetTrue)
                        .help("Pretty-print JSON"),
                ),
        )
        .subcommand(
            Command::new("batch")
                .about("Convert every command file of a directory")
                .arg(
                    Arg::new("input-dir")
                        .required(true)
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("output-dir")
                        .value_parser(value_parser!(PathBuf))
                        .help("Defaults to output_dir from the config"),
                )
                .arg(
                    Arg::new("threads")
                        .long("threads")
                        .value_parser(value_parser!(usize))
                        .help("Worker threads, 0 for one per core"),
                )
                .arg(
                    Arg::new("no-render")
                        .long("no-render")
                        .action(ArgAction::SetTrue)
                        .help("Write result JSON only"),
                ),
        )
        .subcommand(
            Command::new("rules")
                .about("Print the effective rule table")
                .arg(
                    Arg::new("format")
                        .long("format")
                        .default_value("yaml")
                        .value_parser(["yaml", "json", "toml"]),
                ),
        )
        .subcommand(
            Command::new("schema")
                .about("Print a JSON schema")
                .arg(
                    Arg::new("what")
                        .required(true)
                        .value_parser(["rules", "input"]),
                ),
        )
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

/// Config file plus command-line overrides
fn load_config(args: &ArgMatches) -> Result<ConverterConfig> {
    let mut config = match args.get_one::<PathBuf>("config") {
        Some(path) => ConverterConfig::from_path(path)?,
        None => ConverterConfig::default(),
    };
    if let Some(rules) = args.get_one::<PathBuf>("rules") {
        config = config.with_rules(rules.clone());
    }
    if args.get_flag("strict") {
        config = config.with_strict(true);
    }
    Ok(config)
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let text = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .context("encoding output")?;
    println!("{text}");
    Ok(())
}

fn convert(args: &ArgMatches) -> Result<ExitCode> {
    let config = load_config(args)?;
    let converter = Converter::new(config.rule_table()?, config.clone());
    let file = args
        .get_one::<PathBuf>("file")
        .context("no input file given")?;
    let pretty = args.get_flag("pretty");

    let conversion = match batch::read_command(file).and_then(|raw| converter.convert_detailed(&raw)) {
        Ok(conversion) => conversion,
        Err(e) => {
            tracing::warn!(file = %file.display(), error = %e, "conversion failed");
            print_json(&e, pretty)?;
            return Ok(ExitCode::from(EXIT_JOB));
        }
    };

    if let Some(dir) = args.get_one::<PathBuf>("render") {
        let renderer = config.renderer()?;
        let written = batch::write_outputs(dir, &conversion, Some(&renderer))
            .with_context(|| format!("writing {} under {}", conversion.unit(), dir.display()))?;
        tracing::info!(dir = %dir.display(), files = written.len(), "rendered");
    }
    print_json(&conversion.result, pretty)?;

    if config.strict && !conversion.result.is_valid() {
        Ok(ExitCode::from(EXIT_JOB))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn run_batch(args: &ArgMatches) -> Result<ExitCode> {
    let mut config = load_config(args)?;
    if let Some(threads) = args.get_one::<usize>("threads") {
        config = config.with_threads(*threads);
    }
    if args.get_flag("no-render") {
        config = config.with_render(false);
    }
    let input = args
        .get_one::<PathBuf>("input-dir")
        .context("no input directory given")?;
    let output = args
        .get_one::<PathBuf>("output-dir")
        .cloned()
        .unwrap_or_else(|| config.output_dir.clone());

    let renderer = if config.render {
        Some(config.renderer()?)
    } else {
        None
    };
    let converter = Converter::new(config.rule_table()?, config.clone());
    let summary = converter
        .convert_dir(input, &output, renderer.as_ref())
        .with_context(|| format!("converting {}", input.display()))?;
    print_json(&summary, true)?;

    if summary.has_failures() || (config.strict && summary.has_invalid()) {
        Ok(ExitCode::from(EXIT_JOB))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn print_rules(args: &ArgMatches) -> Result<ExitCode> {
    let config = load_config(args)?;
    let table = config.rule_table()?;
    let format: RuleFormat = args
        .get_one::<String>("format")
        .map_or(Ok(RuleFormat::default()), |f| f.parse())?;
    print!("{}", loader::render(&table, format)?);
    Ok(ExitCode::SUCCESS)
}

fn print_schema(args: &ArgMatches) -> Result<ExitCode> {
    let schema = match args.get_one::<String>("what").map(String::as_str) {
        Some("rules") => schemars::schema_for!(RuleTableDocument),
        Some("input") => schemars::schema_for!(RawCommand),
        other => bail!("unknown schema: {other:?}"),
    };
    print_json(&schema, true)?;
    Ok(ExitCode::SUCCESS)
}

fn run(matches: &ArgMatches) -> Result<ExitCode> {
    match matches.subcommand() {
        Some(("convert", args)) => convert(args),
        Some(("batch", args)) => run_batch(args),
        Some(("rules", args)) => print_rules(args),
        Some(("schema", args)) => print_schema(args),
        Some((other, _)) => bail!("unknown command: {other}"),
        None => bail!("no command given"),
    }
}

/// Exit code for an error that ended the run
fn exit_code(err: &anyhow::Error) -> u8 {
    let setup = err.downcast_ref::<ConfigError>().is_some()
        || err.downcast_ref::<RuleTableError>().is_some()
        || err
            .downcast_ref::<ConversionError>()
            .is_some_and(|e| e.error == ErrorReason::RuleTableUnavailable);
    if setup {
        EXIT_SETUP
    } else {
        EXIT_JOB
    }
}

fn main() -> ExitCode {
    let matches = cli().get_matches();
    init_tracing(matches.get_one::<String>("log-format").is_some_and(|f| f == "json"));

    match run(&matches) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "cmig failed");
            eprintln!("error: {e:#}");
            ExitCode::from(exit_code(&e))
        }
    }
}
