mod canvas;
mod control;
mod input;
mod layer_shell;
mod overlay;
mod window;

use anyhow::{Context, Result};
use clap::Parser;
use gtk4::glib;
use gtk4::prelude::*;
use overlay::Overlay;
use std::cell::RefCell;
use std::path::PathBuf;
use std::sync::mpsc::TryRecvError;
use std::time::Duration;
use tracing::{error, info, warn};
use wallace_core::config::{self, Config, InputMode};
use wallace_core::mode::OverlayMode;
use wallace_core::pen::Pen;

#[derive(Parser)]
#[command(name = "wallace", about = "Draw on a transparent overlay above your Wayland desktop")]
struct Cli {
    /// Config file to use instead of ~/.config/wallace/config.toml
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Only cover one monitor
    #[arg(long)]
    single_window: bool,
    /// How strokes are tracked: click or drag
    #[arg(long)]
    input_mode: Option<InputMode>,
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load().unwrap_or_else(|e| {
            warn!(error = %e, "invalid config, using defaults");
            Config::default()
        }),
    };
    if cli.single_window {
        config.window.single_window = true;
    }
    if let Some(mode) = cli.input_mode {
        config.window.input_mode = mode;
    }
    Ok(config)
}

fn main() -> glib::ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("wallace=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            error!(error = %format!("{:#}", e), "wallace failed");
            glib::ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<glib::ExitCode> {
    let config = load_config(cli).context("loading config")?;
    let palette = config.palette.build()?;

    info!(
        input_mode = %config.window.input_mode,
        single_window = config.window.single_window,
        "wallace starting"
    );

    let socket_path = config.control.socket.then(config::socket_path);
    let (requests, socket_path) =
        control::spawn(socket_path.as_deref()).context("starting control thread")?;
    let requests = RefCell::new(Some(requests));

    let app = gtk4::Application::builder()
        .flags(gtk4::gio::ApplicationFlags::NON_UNIQUE)
        .build();

    let pen = RefCell::new(Some(Pen::new(palette, config.brush)));
    let mode = OverlayMode::new(config.window.layer);

    app.connect_activate(move |app| {
        let Some(pen) = pen.borrow_mut().take() else {
            // Already running; a second activation has nothing to add.
            return;
        };
        let overlay = Overlay::new(app, pen, mode);
        window::build_all(app, &overlay, &config);

        let Some(rx) = requests.borrow_mut().take() else {
            return;
        };

        // Poll control requests on the GTK main loop
        glib::timeout_add_local(Duration::from_millis(16), move || loop {
            match rx.try_recv() {
                Ok(request) => {
                    let reply = overlay.handle_request(request.msg);
                    if let Some(tx) = request.reply {
                        let _ = tx.send(reply);
                    }
                }
                Err(TryRecvError::Empty) => return glib::ControlFlow::Continue,
                Err(TryRecvError::Disconnected) => {
                    warn!("control thread exited, signals no longer handled");
                    return glib::ControlFlow::Break;
                }
            }
        });
    });

    let code = app.run_with_args::<&str>(&[]);

    info!("wallace shutting down");
    control::cleanup(socket_path);
    Ok(code)
}
