// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! oddjob-brokerctl: the supervisory companion to `oddjob-brokerd` (§1
//! ambient stack, "CLI control surface"). Connects to the daemon's local
//! Unix socket and speaks the length-prefixed JSON protocol in
//! `broker_daemon::protocol` for health checks, status, and shutdown —
//! entirely separate from the messaging transport the daemon bridges.

use anyhow::{Context, Result};
use broker_daemon::protocol::{read_response, write_request, Request, Response};
use broker_daemon::Config;
use clap::{Parser, Subcommand};
use tokio::net::UnixStream;

#[derive(Parser)]
#[command(name = "oddjob-brokerctl", version, about = "Control the oddjob broker daemon")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Checks that the daemon is alive.
    Ping,
    /// Reports session counts, emergency mode, and pending approvals.
    Status,
    /// Requests graceful shutdown, or immediate shutdown with `--kill`.
    Shutdown {
        #[arg(long)]
        kill: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load().context("loading broker config")?;

    let request = match cli.command {
        Command::Ping => Request::Ping,
        Command::Status => Request::Status,
        Command::Shutdown { kill } => Request::Shutdown { kill },
    };

    let response = send(&config.socket_path, request).await?;
    print_response(&response);
    Ok(())
}

async fn send(socket_path: &std::path::Path, request: Request) -> Result<Response> {
    let mut stream = UnixStream::connect(socket_path)
        .await
        .with_context(|| format!("connecting to {}", socket_path.display()))?;
    write_request(&mut stream, &request)
        .await
        .context("sending request")?;
    read_response(&mut stream).await.context("reading response")
}

fn print_response(response: &Response) {
    match response {
        Response::Pong => println!("pong"),
        Response::Status {
            active_sessions,
            paused_sessions,
            terminated_sessions,
            emergency,
            pending_approvals,
            uptime_secs,
        } => {
            println!("active sessions:      {active_sessions}");
            println!("paused sessions:      {paused_sessions}");
            println!("terminated sessions:  {terminated_sessions}");
            println!("emergency mode:       {}", if *emergency { "ON" } else { "off" });
            println!("pending approvals:    {pending_approvals}");
            println!("uptime:               {uptime_secs}s");
        }
        Response::ShuttingDown => println!("shutdown requested"),
        Response::Error { message } => {
            eprintln!("error: {message}");
            std::process::exit(1);
        }
    }
}
