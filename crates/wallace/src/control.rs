use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::mpsc as std_mpsc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};
use wallace_core::ipc::{self, ClientMsg, DaemonMsg};

/// A control request bound for the GTK main loop.
#[derive(Debug)]
pub struct Request {
    pub msg: ClientMsg,
    /// Present for socket clients waiting on an answer.
    pub reply: Option<oneshot::Sender<DaemonMsg>>,
}

/// Process signals and the requests they stand for.
pub fn signal_commands() -> [(SignalKind, ClientMsg); 4] {
    [
        (SignalKind::user_defined1(), ClientMsg::ToggleLayer),
        (SignalKind::user_defined2(), ClientMsg::TogglePassthrough),
        (SignalKind::terminate(), ClientMsg::Quit),
        (SignalKind::interrupt(), ClientMsg::Quit),
    ]
}

/// Start the control thread: signal handlers plus, when `socket_path` is set,
/// the JSON-lines control socket. Requests arrive on the returned receiver,
/// alongside the socket path if one was actually bound.
pub fn spawn(
    socket_path: Option<&Path>,
) -> Result<(std_mpsc::Receiver<Request>, Option<PathBuf>)> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("building control runtime")?;

    let (tx, rx) = std_mpsc::channel();

    // Register handlers and bind now so nothing is missed once GTK runs.
    let listener = {
        let _guard = runtime.enter();

        for (kind, msg) in signal_commands() {
            let mut stream = signal(kind).context("installing signal handler")?;
            let tx = tx.clone();
            runtime.spawn(async move {
                while stream.recv().await.is_some() {
                    info!(?msg, "signal received");
                    if tx.send(Request { msg, reply: None }).is_err() {
                        break;
                    }
                }
            });
        }

        socket_path.and_then(listen)
    };
    let bound = listener.as_ref().and(socket_path.map(Path::to_path_buf));

    std::thread::Builder::new()
        .name("wallace-control".into())
        .spawn(move || runtime.block_on(serve(listener, tx)))
        .context("spawning control thread")?;

    Ok((rx, bound))
}

/// Bind the control socket, or carry on with signals only if that fails.
fn listen(path: &Path) -> Option<UnixListener> {
    match bind(path) {
        Ok(listener) => Some(listener),
        Err(e) => {
            warn!(error = %format!("{:#}", e), "control socket unavailable, only signals will work");
            None
        }
    }
}

fn bind(path: &Path) -> Result<UnixListener> {
    // Remove stale socket
    let _ = std::fs::remove_file(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    let listener = UnixListener::bind(path)
        .with_context(|| format!("binding socket {}", path.display()))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)).ok();
    }
    info!(path = %path.display(), "control socket listening");
    Ok(listener)
}

async fn serve(listener: Option<UnixListener>, tx: std_mpsc::Sender<Request>) {
    let Some(listener) = listener else {
        // Signals only; keep the runtime alive for their tasks.
        std::future::pending::<()>().await;
        return;
    };

    loop {
        match listener.accept().await {
            Ok((stream, _)) => {
                tokio::spawn(handle_client(stream, tx.clone()));
            }
            Err(e) => {
                warn!(error = %e, "control accept error");
            }
        }
    }
}

/// Answer requests from one client until it disconnects.
pub async fn handle_client(stream: UnixStream, tx: std_mpsc::Sender<Request>) {
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();

    while let Ok(Some(line)) = lines.next_line().await {
        if line.trim().is_empty() {
            continue;
        }

        let reply = match ipc::decode_client(&line) {
            Some(msg) => dispatch(&tx, msg).await,
            None => {
                debug!(line = %line, "invalid control request");
                DaemonMsg::Ack {
                    ok: false,
                    message: "invalid request".into(),
                }
            }
        };

        if writer.write_all(ipc::encode(&reply).as_bytes()).await.is_err() {
            break;
        }
    }
}

async fn dispatch(tx: &std_mpsc::Sender<Request>, msg: ClientMsg) -> DaemonMsg {
    let (reply_tx, reply_rx) = oneshot::channel();
    let request = Request {
        msg,
        reply: Some(reply_tx),
    };
    if tx.send(request).is_err() {
        return shutting_down();
    }
    reply_rx.await.unwrap_or_else(|_| shutting_down())
}

fn shutting_down() -> DaemonMsg {
    DaemonMsg::Ack {
        ok: false,
        message: "overlay is shutting down".into(),
    }
}

/// Remove the socket file on exit.
pub fn cleanup(socket_path: Option<PathBuf>) {
    if let Some(path) = socket_path {
        let _ = std::fs::remove_file(&path);
    }
}
