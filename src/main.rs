use anyhow::{Context, Result, bail};
use std::env;
use std::path::PathBuf;

use vista_config::VistaConfig;
use vista_scene::{Page, Session, run_session};

const USAGE: &str = "Usage: vista <page.html> [--script <session.json>] [--config <vista.toml>] [--width <px>] [--height <px>]";

struct Args {
    page: PathBuf,
    script: Option<PathBuf>,
    config: Option<PathBuf>,
    width: Option<f64>,
    height: Option<f64>,
}

fn parse_args() -> Result<Args> {
    let mut args = env::args().skip(1).collect::<Vec<_>>();
    if args.is_empty() {
        eprintln!("{USAGE}");
        bail!("missing <page.html>");
    }
    let page = PathBuf::from(args.remove(0));

    let mut parsed = Args {
        page,
        script: None,
        config: None,
        width: None,
        height: None,
    };
    let mut i = 0usize;
    while i < args.len() {
        let flag = args[i].as_str();
        let Some(value) = args.get(i + 1) else {
            bail!("{flag} expects a value");
        };
        match flag {
            "--script" => parsed.script = Some(PathBuf::from(value)),
            "--config" => parsed.config = Some(PathBuf::from(value)),
            "--width" => {
                parsed.width = Some(value.parse().with_context(|| format!("invalid --width '{value}'"))?)
            }
            "--height" => {
                parsed.height =
                    Some(value.parse().with_context(|| format!("invalid --height '{value}'"))?)
            }
            other => {
                eprintln!("{USAGE}");
                bail!("unknown argument '{other}'");
            }
        }
        i += 2;
    }
    Ok(parsed)
}

fn load_config(args: &Args) -> Result<VistaConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let mut config = VistaConfig::load_from_file(path)?;
            config.merge_with_env();
            config
        }
        None => VistaConfig::load(),
    };
    if let Some(width) = args.width {
        config.viewport.width = width;
    }
    if let Some(height) = args.height {
        config.viewport.height = height;
    }
    Ok(config)
}

fn main() -> Result<()> {
    let _ = env_logger::try_init();

    let args = parse_args()?;
    if !args.page.exists() {
        bail!("page not found: {}", args.page.display());
    }
    let config = load_config(&args)?;
    log::info!(
        "vista: page={} viewport={}x{}",
        args.page.display(),
        config.viewport.width,
        config.viewport.height
    );

    let mut page = Page::open(&args.page, config)?;
    page.load();

    let session = match &args.script {
        Some(path) => Session::load(path)
            .with_context(|| format!("failed to load session {}", path.display()))?,
        None => Session::default(),
    };
    let report = run_session(&mut page, &session)?;
    page.settle();

    let entries = page.document().journal().entries();
    println!("{}", serde_json::to_string_pretty(entries)?);

    eprintln!(
        "{} step(s), {} mutation(s), clock at {}ms, {} timer(s) pending",
        report.steps,
        entries.len(),
        page.now(),
        page.pending_timers()
    );
    for href in page.navigations() {
        eprintln!("navigation requested: {href}");
    }
    Ok(())
}
