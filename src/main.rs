use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use color_eyre::Result;
use color_eyre::eyre::eyre;
use crossterm::event::KeyEventKind;

use ticktop::app::App;
use ticktop::config::{Config, load_config, load_config_from_path};
use ticktop::event::{Event, EventHandler};
use ticktop::system::collector::Collector;
use ticktop::system::platform;
use ticktop::system::sampler::Sampler;
use ticktop::system::source::ProcFs;
use ticktop::{logging, ui};

#[derive(Parser)]
#[command(
    name = "ticktop",
    version,
    about = "Terminal resource monitor driven by /proc counters"
)]
struct Cli {
    /// Path to config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Refresh rate in milliseconds
    #[arg(long)]
    refresh_rate: Option<u64>,

    /// Root of the proc filesystem to sample
    #[arg(long)]
    proc_root: Option<PathBuf>,

    /// Write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Color support: auto, 256, truecolor, mono
    #[arg(long)]
    color: Option<String>,

    /// Take two samples one interval apart, print the report as JSON and exit.
    #[arg(long, default_value_t = false)]
    snapshot: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let config = load_config_for_cli(&cli);

    if config.general.refresh_rate_ms == 0 {
        return Err(eyre!("refresh rate must be greater than 0"));
    }
    if let Some(path) = &config.general.log_file {
        logging::init_file_logging(path, &config.general.log_level)?;
    }
    tracing::info!(
        proc_root = %config.general.proc_root.display(),
        refresh_rate_ms = config.general.refresh_rate_ms,
        "starting"
    );

    if cli.snapshot {
        return run_snapshot(&config).await;
    }

    let mut terminal = ratatui::init();

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        ratatui::restore();
        original_hook(panic_info);
    }));

    let result = run(&mut terminal, config).await;

    ratatui::restore();

    result
}

async fn run(terminal: &mut ratatui::DefaultTerminal, config: Config) -> Result<()> {
    let tick_rate = Duration::from_millis(config.general.refresh_rate_ms);
    let mut app = App::new(config);
    let mut events = EventHandler::new(tick_rate);

    terminal.draw(|frame| ui::draw(frame, &mut app))?;

    while app.running {
        let Some(event) = events.next().await else {
            break;
        };
        let should_draw = match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                let action = app.map_key(key);
                app.dispatch(action);
                true
            }
            Event::Key(_) => false,
            Event::Tick => {
                app.refresh_data();
                true
            }
            Event::Resize => true,
        };
        if should_draw {
            terminal.draw(|frame| ui::draw(frame, &mut app))?;
        }
    }

    tracing::info!("exiting");
    Ok(())
}

/// Headless mode: prime, wait one interval, then print the first report.
async fn run_snapshot(config: &Config) -> Result<()> {
    let collector = Collector::new(ProcFs::new(&config.general.proc_root));
    let page_size_kb = platform::page_size_kb();
    let interval = Duration::from_millis(config.general.refresh_rate_ms);

    let (sampler, _) = Sampler::Priming.advance(collector.collect()?, page_size_kb);
    tokio::time::sleep(interval).await;
    let (_, report) = sampler.advance(collector.collect()?, page_size_kb);

    let mut report = report.ok_or_else(|| eyre!("no report after two samples"))?;
    if config.general.max_rows > 0 {
        report.processes.truncate(config.general.max_rows);
    }

    let output = serde_json::json!({
        "cpu_model": collector.cpu_model(),
        "report": report,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn load_config_for_cli(cli: &Cli) -> Config {
    let mut config = match &cli.config {
        Some(path) => load_config_from_path(path),
        None => load_config(),
    };

    if let Some(rate) = cli.refresh_rate {
        config.general.refresh_rate_ms = rate;
    }
    if let Some(ref root) = cli.proc_root {
        config.general.proc_root = root.clone();
    }
    if let Some(ref path) = cli.log_file {
        config.general.log_file = Some(path.clone());
    }
    if let Some(ref support) = cli.color {
        config.general.color_support = support.clone();
    }

    config
}
