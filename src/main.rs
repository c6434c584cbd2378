use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use color_eyre::Result;
use color_eyre::eyre::{WrapErr, eyre};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{info, warn};

use procwatch::WatchError;
use procwatch::action::Action;
use procwatch::app::App;
use procwatch::config::{self, Config, load_config, load_config_from_path};
use procwatch::event::{Event, EventHandler};
use procwatch::format::format_bytes;
use procwatch::logging::{LogTarget, init_tracing_or_warn};
use procwatch::system::{Collector, MetricsSource};
use procwatch::ui;
use procwatch::watch::{Interval, RefreshEvent, Sample, Watcher};

#[derive(Parser)]
#[command(
    name = "procwatch",
    about = "Chart the memory and CPU use of one process over time"
)]
struct Cli {
    /// Process id to watch right away
    pid: Option<u32>,

    /// Sampling interval in seconds
    #[arg(short = 't', long)]
    interval: Option<u64>,

    /// Sample memory only
    #[arg(long, default_value_t = false)]
    no_cpu: bool,

    /// Directory exported CSV files are written to
    #[arg(long)]
    export_dir: Option<PathBuf>,

    /// Path to config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print samples to stdout instead of drawing a chart
    #[arg(long, default_value_t = false)]
    headless: bool,

    /// Headless: stop after this many samples
    #[arg(long)]
    count: Option<usize>,

    /// Headless: print samples as JSON lines
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Headless: skip the CSV export on exit
    #[arg(long, default_value_t = false)]
    no_export: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let config = load_config_for_cli(&cli);
    let interval = resolve_interval(&cli, &config)?;

    if cli.headless {
        init_tracing_or_warn(&config.general.log_level, LogTarget::Stderr);
        return run_headless(&cli, &config, interval).await;
    }

    if let Some(path) = config
        .general
        .log_file
        .clone()
        .or_else(config::default_log_path)
    {
        init_tracing_or_warn(&config.general.log_level, LogTarget::File(path));
    }

    let mut terminal = ratatui::init();

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        ratatui::restore();
        original_hook(panic_info);
    }));

    let result = run(&mut terminal, &cli, config, interval).await;

    ratatui::restore();

    result
}

async fn run(
    terminal: &mut ratatui::DefaultTerminal,
    cli: &Cli,
    config: Config,
    interval: Interval,
) -> Result<()> {
    let tick_rate = Duration::from_millis(config.general.refresh_rate_ms.max(50));
    let (refresh_tx, refresh_rx) = mpsc::unbounded_channel::<RefreshEvent>();

    let source: Arc<dyn MetricsSource> = Arc::new(Collector::new());
    let watcher = Watcher::new(
        Arc::clone(&source),
        Arc::new(refresh_tx),
        config.sampling.sampler_options(),
        Handle::current(),
    );
    let export_dir = config.export.directory();
    let mut app = App::new(&config, watcher, source, export_dir, interval);
    let mut events = EventHandler::new(tick_rate, refresh_rx);

    match cli.pid {
        Some(pid) => app.dispatch(Action::Watch(pid)),
        None => app.dispatch(Action::OpenPicker),
    }

    terminal.draw(|frame| ui::draw(frame, &app))?;

    while app.running {
        let Some(event) = events.next().await else {
            break;
        };
        let mut should_draw = false;
        match event {
            Event::Key(key) => {
                if key.kind == crossterm::event::KeyEventKind::Press {
                    let action = app.map_key(key);
                    app.dispatch(action);
                    should_draw = true;
                }
            }
            Event::Sampler(refresh) => {
                app.dispatch(Action::Sampler(refresh));
                should_draw = true;
            }
            Event::Tick => {
                app.on_tick();
                should_draw = true;
            }
            Event::Resize => should_draw = true,
        }
        if should_draw {
            terminal.draw(|frame| ui::draw(frame, &app))?;
        }
    }

    app.watcher.stop().await;
    Ok(())
}

/// Prints samples until `--count` is reached, the target exits or Ctrl-C,
/// then exports the series.
async fn run_headless(cli: &Cli, config: &Config, interval: Interval) -> Result<()> {
    let pid = cli
        .pid
        .ok_or_else(|| eyre!("--headless needs a process id to watch"))?;

    let (refresh_tx, mut refresh_rx) = mpsc::unbounded_channel::<RefreshEvent>();
    let source: Arc<dyn MetricsSource> = Arc::new(Collector::new());
    let watcher = Watcher::new(
        source,
        Arc::new(refresh_tx),
        config.sampling.sampler_options(),
        Handle::current(),
    );

    let info = watcher
        .retarget(pid, interval)
        .wrap_err_with(|| format!("cannot watch pid {pid}"))?;
    eprintln!("Watching {} [{}] every {}", info.name, info.pid, info.interval);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                info!("interrupted");
                break;
            }
            refresh = refresh_rx.recv() => match refresh {
                Some(RefreshEvent::Appended { len, .. }) => {
                    if let Some(sample) = watcher.samples().get(len - 1) {
                        print_sample(&mut std::io::stdout(), sample, cli.json)?;
                    }
                    if cli.count.is_some_and(|count| len >= count) {
                        break;
                    }
                }
                Some(RefreshEvent::Finished { state, .. }) => {
                    eprintln!("{} [{}]: {}", info.name, info.pid, state.label());
                    break;
                }
                None => break,
            }
        }
    }

    watcher.stop().await;

    if cli.no_export {
        return Ok(());
    }
    let dir = config.export.directory();
    match watcher.export_to(&dir) {
        Ok(name) => eprintln!("Created file {}", dir.join(name).display()),
        Err(WatchError::NoDataToExport) => warn!("no samples collected, nothing exported"),
        Err(err) => return Err(err).wrap_err("export failed"),
    }
    Ok(())
}

fn print_sample(out: &mut impl Write, sample: &Sample, json: bool) -> Result<()> {
    if json {
        serde_json::to_writer(&mut *out, sample)?;
        writeln!(out)?;
    } else {
        let cpu = sample
            .cpu
            .map(|c| format!("{c:.1}%"))
            .unwrap_or_else(|| "-".to_string());
        writeln!(
            out,
            "{}  mem {:>10}  cpu {:>6}",
            sample.timestamp.format("%H:%M:%S"),
            format_bytes(sample.memory),
            cpu
        )?;
    }
    out.flush()?;
    Ok(())
}

fn resolve_interval(cli: &Cli, config: &Config) -> Result<Interval> {
    match cli.interval {
        Some(secs) => Interval::from_secs(secs).wrap_err("invalid --interval"),
        None => Ok(config.sampling.interval()),
    }
}

fn load_config_for_cli(cli: &Cli) -> Config {
    let mut config = match &cli.config {
        Some(path) => load_config_from_path(path),
        None => load_config(),
    };

    if cli.no_cpu {
        config.sampling.cpu = false;
    }
    if let Some(ref dir) = cli.export_dir {
        config.export.directory = Some(dir.clone());
    }

    config
}
