use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::UnixStream;
use wallace_core::config;
use wallace_core::ipc::{self, ClientMsg, DaemonMsg};

#[derive(Parser)]
#[command(name = "wallacectl", about = "Control a running wallace overlay")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show overlay status
    Status,
    /// Move the overlay between the top-most and bottom layers
    Layer,
    /// Toggle click-through
    Passthrough,
    /// Erase everything on every monitor
    Clear,
    /// Switch to the next palette color
    NextColor,
    /// Switch to the previous palette color
    PrevColor,
    /// Close the overlay
    Quit,
}

impl Command {
    fn to_msg(&self) -> ClientMsg {
        match self {
            Command::Status => ClientMsg::GetStatus,
            Command::Layer => ClientMsg::ToggleLayer,
            Command::Passthrough => ClientMsg::TogglePassthrough,
            Command::Clear => ClientMsg::Clear,
            Command::NextColor => ClientMsg::NextColor,
            Command::PrevColor => ClientMsg::PrevColor,
            Command::Quit => ClientMsg::Quit,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let socket_path = config::socket_path();
    let stream = UnixStream::connect(&socket_path).with_context(|| {
        format!(
            "connecting to wallace at {}\nIs the overlay running?",
            socket_path.display()
        )
    })?;

    let mut writer = stream.try_clone().context("cloning stream")?;
    let reader = BufReader::new(stream);

    let line = ipc::encode(&cli.command.to_msg());
    writer
        .write_all(line.as_bytes())
        .context("sending command")?;

    // Read response
    for line in reader.lines() {
        let line = line.context("reading response")?;
        if let Some(resp) = ipc::decode_daemon(&line) {
            match resp {
                DaemonMsg::Status {
                    stacking,
                    passthrough,
                    color,
                    windows,
                    version,
                } => {
                    println!("wallace v{}", version);
                    println!("  layer:       {}", stacking);
                    println!("  passthrough: {}", passthrough);
                    println!("  color:       {}", color);
                    println!("  windows:     {}", windows);
                }
                DaemonMsg::Ack { ok, message } => {
                    if ok {
                        println!("{}", message);
                    } else {
                        eprintln!("error: {}", message);
                        std::process::exit(1);
                    }
                }
            }
            break;
        }
    }

    Ok(())
}
