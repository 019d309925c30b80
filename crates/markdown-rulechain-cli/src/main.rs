use anyhow::{Context, Result, bail};
use markdown_rulechain_config::Config;
use std::{
    env,
    io::{self, Read, Write},
    path::PathBuf,
    process,
};

const USAGE: &str = "Usage: markdown-rulechain-cli [--preset NAME] [--config PATH] [--inline] [FILE]";

#[derive(Debug, Default)]
struct Args {
    preset: Option<String>,
    config: Option<PathBuf>,
    inline: bool,
    input: Option<PathBuf>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args> {
    let mut parsed = Args::default();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--preset" => {
                parsed.preset = Some(args.next().context("--preset needs a value")?);
            }
            "--config" => {
                let path = args.next().context("--config needs a value")?;
                parsed.config = Some(PathBuf::from(path));
            }
            "--inline" => parsed.inline = true,
            "-h" | "--help" => {
                println!("{USAGE}");
                process::exit(0);
            }
            flag if flag.starts_with("--") => bail!("unknown option {flag}"),
            file => {
                if parsed.input.is_some() {
                    bail!("only one input file may be given");
                }
                parsed.input = Some(PathBuf::from(file));
            }
        }
    }
    Ok(parsed)
}

fn load_config(args: &Args) -> Result<Config> {
    let config = match &args.config {
        Some(path) => Config::load_from_path(path)?
            .with_context(|| format!("Config file '{}' does not exist", path.display()))?,
        None => {
            let path = Config::config_path();
            log::debug!("Config path: {}", path.display());
            Config::load_from_path(&path)?.unwrap_or_default()
        }
    };
    Ok(config)
}

fn read_input(input: Option<&PathBuf>) -> Result<String> {
    match input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read '{}'", path.display())),
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            Ok(buf)
        }
    }
}

fn run() -> Result<()> {
    let args = parse_args(env::args().skip(1)).context(USAGE)?;

    let mut config = load_config(&args)?;
    if let Some(preset) = &args.preset {
        config.preset = Some(preset.clone());
    }
    let md = config.build().context("Failed to set up renderer")?;

    let src = read_input(args.input.as_ref())?;
    log::info!("rendering {} bytes", src.len());

    let html = if args.inline {
        md.render_inline(&src)?
    } else {
        md.render(&src)?
    };

    let mut stdout = io::stdout().lock();
    stdout.write_all(html.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

fn main() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
