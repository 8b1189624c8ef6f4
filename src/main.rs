use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use rbuf::config::Config;
use rbuf::report;
use rbuf::script::{Runner, Script};
use rbuf::SlotPolicy;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "rbuf", about = "Replay operation scripts against a fixed-capacity ring buffer", version)]
struct Cli {
    /// Script to replay, one operation per line ("-" or omitted reads stdin)
    script: Option<PathBuf>,

    /// Buffer capacity (overrides the config file)
    #[arg(short, long)]
    size: Option<usize>,

    /// Fill value for unused slots (overrides the config file)
    #[arg(short = 'd', long = "default", allow_negative_numbers = true)]
    default_value: Option<i64>,

    /// Overwrite popped slots with the default value
    #[arg(long)]
    reset_slots: bool,

    /// Keep replaying after a pop/peek on an empty buffer
    #[arg(short, long)]
    keep_going: bool,

    /// Print a JSON report instead of plain text
    #[arg(long)]
    json: bool,

    /// Read configuration from this file instead of the default location
    #[arg(long, value_name = "PATH")]
    config_file: Option<PathBuf>,

    /// Print config file path and effective values, then exit
    #[arg(long)]
    print_config: bool,

    /// Print shell completions and exit
    #[arg(long, value_enum, value_name = "SHELL")]
    completions: Option<Shell>,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("rbuf: {:#}", e);
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    if let Some(shell) = cli.completions {
        clap_complete::generate(shell, &mut Cli::command(), "rbuf", &mut io::stdout());
        return Ok(ExitCode::SUCCESS);
    }

    let cfg = effective_config(&cli)?;
    if cli.print_config {
        print_config(&cfg, cli.config_file.as_deref());
        return Ok(ExitCode::SUCCESS);
    }

    let text = read_script(cli.script.as_deref())?;
    let script = Script::parse(&text).context("parsing script")?;
    let buffer = cfg.build_buffer().context("building ring buffer")?;
    log::info!(
        "replaying {} op(s) against {} slot(s), slot policy {}",
        script.len(), buffer.capacity(), buffer.policy().label()
    );

    let mut runner = Runner::new(buffer, cfg.run.keep_going);
    let steps = runner.run(&script);
    let snapshot = runner.into_buffer().snapshot();

    if cfg.run.json {
        let out = report::render_json(&steps, &snapshot, &cfg);
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        print!("{}", report::render_text(&steps, &snapshot));
    }

    if report::has_failure(&steps) {
        Ok(ExitCode::from(1))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn effective_config(cli: &Cli) -> Result<Config> {
    let mut cfg = match &cli.config_file {
        Some(path) => Config::load_from(path)?,
        None       => Config::load()?,
    };
    if let Some(size) = cli.size { cfg.buffer.size = size; }
    if let Some(v) = cli.default_value { cfg.buffer.default_value = v; }
    if cli.reset_slots { cfg.buffer.slot_policy = SlotPolicy::Reset; }
    if cli.keep_going { cfg.run.keep_going = true; }
    if cli.json { cfg.run.json = true; }
    Ok(cfg)
}

fn read_script(path: Option<&Path>) -> Result<String> {
    match path {
        Some(p) if p != Path::new("-") => std::fs::read_to_string(p)
            .with_context(|| format!("reading script {}", p.display())),
        _ => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text).context("reading script from stdin")?;
            Ok(text)
        }
    }
}

fn print_config(cfg: &Config, explicit: Option<&Path>) {
    let path = explicit
        .map(Path::to_path_buf)
        .or_else(Config::config_path)
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_else(|| "(unknown)".to_string());
    println!("Config: {}", path);
    println!();
    println!("[buffer]");
    println!("  size          = {}", cfg.buffer.size);
    println!("  default_value = {}", cfg.buffer.default_value);
    println!("  slot_policy   = {}", cfg.buffer.slot_policy.label());
    println!();
    println!("[run]");
    println!("  keep_going    = {}", cfg.run.keep_going);
    println!("  json          = {}", cfg.run.json);
}
