use chartui::chart_export::{self, ChartExportFormat, ChartImageStyle};
use chartui::{
    document, AppConfig, App, AppEvent, Args, CacheManager, ChartKind, ConfigManager,
    RecordStore, APP_NAME,
};
use clap::Parser;
use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use ratatui::DefaultTerminal;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::mpsc::channel;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn render(terminal: &mut DefaultTerminal, app: &mut App) -> Result<()> {
    terminal.draw(|frame| frame.render_widget(app, frame.area()))?;
    Ok(())
}

fn run(mut terminal: DefaultTerminal, args: &Args, config: AppConfig) -> Result<()> {
    let poll_interval = Duration::from_millis(config.performance.event_poll_interval_ms);
    let (tx, rx) = channel::<AppEvent>();
    let mut app = App::new_with_config(config);
    if args.debug {
        app.enable_debug();
    }
    if let Some(dir) = &args.export_dir {
        app.set_export_dir(dir.clone());
    }
    let startup = app.startup(args.path.clone(), args.chart_type.map(Into::into));
    render(&mut terminal, &mut app)?;
    if let Some(event) = startup {
        tx.send(event)?;
    }

    loop {
        if crossterm::event::poll(poll_interval)? {
            match crossterm::event::read()? {
                crossterm::event::Event::Key(key)
                    if key.kind == crossterm::event::KeyEventKind::Press =>
                {
                    tx.send(AppEvent::Key(key))?
                }
                crossterm::event::Event::Resize(cols, rows) => {
                    tx.send(AppEvent::Resize(cols, rows))?
                }
                _ => {}
            }
        }

        let updated = match rx.recv_timeout(Duration::from_millis(0)) {
            Ok(event) => {
                match event {
                    AppEvent::Exit => break,
                    event => {
                        if let Some(event) = app.event(&event) {
                            tx.send(event)?;
                        }
                    }
                }
                true
            }
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => false,
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => break,
        };

        if updated {
            render(&mut terminal, &mut app)?;
        }
    }
    info!("exiting");
    Ok(())
}

/// Log to a file (the terminal belongs to the UI). `RUST_LOG` wins over the default level.
fn init_logging(args: &Args) -> Result<PathBuf> {
    let path = match &args.log_file {
        Some(path) => path.clone(),
        None => {
            let cache = CacheManager::new(APP_NAME)?;
            cache.ensure_cache_dir()?;
            cache.log_file()
        }
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::options()
        .create(true)
        .append(true)
        .open(&path)
        .wrap_err_with(|| format!("Failed to open log file {}", path.display()))?;

    let default_level = if args.debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| eyre!("Failed to initialize logging: {}", e))?;
    Ok(path)
}

/// Write the chart for `args.path` (or the sample records) without starting the UI.
fn render_image(args: &Args, out: &Path, config: &AppConfig) -> Result<()> {
    let format = ChartExportFormat::from_path(out).ok_or_else(|| {
        eyre!(
            "Cannot tell the image format of {}: use a .png or .eps extension",
            out.display()
        )
    })?;

    let mut kind = ChartKind::default();
    let store = match &args.path {
        Some(path) => {
            let raw = document::read_import_file(path)?;
            let imported = document::import(&raw)
                .map_err(|e| eyre!(chartui::error_display::user_message_from_import(&e)))?;
            if let Some(k) = imported.chart_type {
                kind = k;
            }
            RecordStore::from_records(imported.data)
        }
        None => RecordStore::with_samples(),
    };
    if let Some(k) = args.chart_type {
        kind = k.into();
    }

    let style = ChartImageStyle::from_config(config);
    chart_export::write_chart(out, format, store.records(), kind, &style)?;
    println!("Chart written to {}", out.display());
    Ok(())
}

fn handle_early_exit_flags(args: &Args) -> Result<Option<()>> {
    if args.generate_config {
        let manager = ConfigManager::new(APP_NAME)?;
        let path = manager.write_default_config(args.force)?;
        println!("Configuration written to {}", path.display());
        return Ok(Some(()));
    }
    Ok(None)
}

fn load_config() -> AppConfig {
    match AppConfig::load(APP_NAME) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: ignoring configuration: {:#}", e);
            error!(error = %e, "configuration rejected, using defaults");
            AppConfig::default()
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    color_eyre::install()?;

    if let Some(()) = handle_early_exit_flags(&args)? {
        return Ok(());
    }

    if let Err(e) = init_logging(&args) {
        eprintln!("Warning: logging disabled: {:#}", e);
    }
    let mut config = load_config();
    if args.dark {
        config.display.dark_mode = true;
    }

    if let Some(out) = &args.render_image {
        return render_image(&args, out, &config);
    }

    info!(version = env!("CARGO_PKG_VERSION"), "starting");
    let terminal = ratatui::init();
    let result = run(terminal, &args, config);
    ratatui::restore();
    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
    Ok(())
}
