use std::{fs, net::SocketAddr, path::PathBuf, sync::Arc};

use clap::{Parser, Subcommand};
use egui::Vec2;
use fastlap::{
    AppConfig, FastlapError, SessionProvider, SessionStore, SessionType,
    api::{self, ApiState},
    render_driver_plots,
    telemetry::CachedSessionProvider,
    ui::DashboardApp,
};
use log::{LevelFilter, error, info};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Args {
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve plots over HTTP
    Serve {
        #[arg(short, long)]
        bind: Option<String>,

        #[arg(short, long)]
        data_dir: Option<PathBuf>,
    },
    /// Open the interactive dashboard
    Dashboard {
        #[arg(short, long)]
        data_dir: Option<PathBuf>,
    },
    /// Write the speed chart and track map of a driver's fastest lap as SVG
    Render {
        #[arg(short, long)]
        year: Option<u32>,

        #[arg(short, long)]
        track: Option<String>,

        #[arg(short, long)]
        session: Option<SessionType>,

        #[arg(long)]
        driver: Option<String>,

        #[arg(short, long)]
        output: PathBuf,

        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// List the recorded events and sessions
    Schedule {
        #[arg(short, long)]
        data_dir: Option<PathBuf>,
    },
}

fn open_store(config: &AppConfig, data_dir: Option<&PathBuf>) -> Result<SessionStore, FastlapError> {
    let root = match data_dir {
        Some(dir) => dir.clone(),
        None => config.data_dir()?,
    };
    info!("Using session store at {:?}", root);
    SessionStore::new(root)
}

fn serve(
    config: AppConfig,
    bind: Option<String>,
    data_dir: Option<PathBuf>,
) -> Result<(), FastlapError> {
    let bind = bind.unwrap_or_else(|| config.bind_address.clone());
    let addr: SocketAddr = bind.parse().map_err(|e| FastlapError::InvalidUserInput {
        field: "bind".to_string(),
        reason: format!("{bind}: {e}"),
    })?;
    let store = open_store(&config, data_dir.as_ref())?;
    let state = Arc::new(ApiState {
        provider: Arc::new(CachedSessionProvider::new(store)),
        defaults: config.default_selection,
        render: config.render,
    });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| FastlapError::ServerError { source: e })?;
    runtime.block_on(api::serve(addr, state))
}

fn dashboard(config: AppConfig, data_dir: Option<PathBuf>) -> Result<(), FastlapError> {
    let store = open_store(&config, data_dir.as_ref())?;
    let defaults = config.default_selection;

    let mut native_options = eframe::NativeOptions::default();
    native_options.viewport = native_options
        .viewport
        .with_inner_size(Vec2::new(1280., 800.))
        .with_title("F1 Dashboard");

    eframe::run_native(
        "F1 Dashboard",
        native_options,
        Box::new(|cc| Ok(Box::new(DashboardApp::new(store, defaults, cc)))),
    )
    .map_err(|e| FastlapError::DashboardError {
        reason: e.to_string(),
    })
}

fn render(
    config: AppConfig,
    year: Option<u32>,
    track: Option<String>,
    session: Option<SessionType>,
    driver: Option<String>,
    output: PathBuf,
    data_dir: Option<PathBuf>,
) -> Result<(), FastlapError> {
    let defaults = &config.default_selection;
    let year = year.unwrap_or(defaults.year);
    let track = track.unwrap_or_else(|| defaults.track.clone());
    let session_type = session.unwrap_or(defaults.session);
    let driver = driver.unwrap_or_else(|| defaults.driver.clone());

    let store = open_store(&config, data_dir.as_ref())?;
    let session = store.load_session(year, &track, session_type)?;
    let plots = render_driver_plots(&session, &driver, &config.render)?;

    fs::create_dir_all(&output).map_err(|e| FastlapError::WriterError { source: e })?;
    for (name, svg) in [("speed.svg", &plots.speed_svg), ("track.svg", &plots.track_svg)] {
        let path = output.join(name);
        fs::write(&path, svg).map_err(|e| FastlapError::WriterError { source: e })?;
        info!("Wrote {:?}", path);
    }
    println!(
        "Rendered lap {} of {} at {} {} {} into {}",
        plots.lap_number,
        plots.driver,
        session.info.event_name,
        session.info.year,
        session_type,
        output.display()
    );
    Ok(())
}

fn schedule(config: AppConfig, data_dir: Option<PathBuf>) -> Result<(), FastlapError> {
    let store = open_store(&config, data_dir.as_ref())?;
    let events = store.event_schedule()?;
    if events.is_empty() {
        println!("No recorded sessions in {}", store.root().display());
    }
    for event in events {
        let sessions: Vec<&str> = event.sessions.iter().map(|s| s.code()).collect();
        println!("{} {:<40} {}", event.year, event.event_name, sessions.join(" "));
    }
    Ok(())
}

fn main() {
    let cli = Args::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    colog::default_builder().filter_level(level).init();

    ctrlc::set_handler(move || {
        println!("Exiting...");
        std::process::exit(0);
    })
    .expect("Could not set Ctrl-C handler");

    let config = match AppConfig::from_local_file() {
        Ok(config) => config,
        Err(e) => {
            error!("Could not read config file, using defaults: {}", e);
            AppConfig::default()
        }
    };

    let result = match cli.command {
        Commands::Serve { bind, data_dir } => serve(config, bind, data_dir),
        Commands::Dashboard { data_dir } => dashboard(config, data_dir),
        Commands::Render {
            year,
            track,
            session,
            driver,
            output,
            data_dir,
        } => render(config, year, track, session, driver, output, data_dir),
        Commands::Schedule { data_dir } => schedule(config, data_dir),
    };

    if let Err(e) = result {
        error!("{}", e);
        std::process::exit(1);
    }
}
