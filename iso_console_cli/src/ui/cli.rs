use std::path::PathBuf;

use clap::Parser;
use log::info;
use tokio::io::{self, AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::ui::commands::{parse_line, ReplCommand};
use crate::ui::render::{connections_table, log_line, TerminalView};
use iso_console_core::api::ConnectionRecord;
use iso_console_core::samples::{sample_message, SAMPLE_MESSAGES};
use iso_console_core::{ConfigStore, Confirmation, ConnectionForm, Console, ConsoleConfig};

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "iso-console", version, about = "Operator console for ISO 8583 remote connections")]
pub struct Args {
    /// Backend API root, e.g. http://localhost:8081/api/iso8583
    #[arg(long)]
    pub api_url: Option<String>,
    /// Seconds between background refreshes (0 disables polling)
    #[arg(long)]
    pub poll_interval: Option<u64>,
    /// Per-request timeout in seconds (0 disables the timeout)
    #[arg(long)]
    pub timeout: Option<u64>,
    /// Config file to use instead of the platform default
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Write the effective settings to the config file and exit
    #[arg(long)]
    pub save_config: bool,
}

impl Args {
    fn apply_overrides(&self, config: &mut ConsoleConfig) {
        if let Some(url) = &self.api_url {
            config.api_base_url = url.clone();
        }
        if let Some(secs) = self.poll_interval {
            config.poll_interval_secs = secs;
        }
        if let Some(secs) = self.timeout {
            config.request_timeout_secs = secs;
        }
    }
}

pub async fn run_cli(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let store = match &args.config {
        Some(path) => ConfigStore::with_path(path),
        None => ConfigStore::new()?,
    };
    let mut config = store.load()?;
    args.apply_overrides(&mut config);

    if args.save_config {
        store.save(&config)?;
        println!("Saved settings to {}", store.path().display());
        return Ok(());
    }

    info!(
        "Using backend {} (poll every {}s)",
        config.api_base_url, config.poll_interval_secs
    );
    let console = Console::from_config(&config)?;
    let _renderer = console.attach(TerminalView::default());

    // The poller's first tick does the initial load.
    let poller = console.start_polling();
    if poller.is_none() {
        let _ = console.dispatcher().refresh().await;
    }

    println!("Type `help` for commands, `quit` to leave.");
    let mut lines = BufReader::new(io::stdin()).lines();
    let mut selected: Option<String> = None;

    while let Some(line) = lines.next_line().await? {
        let command = match parse_line(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                // Also covers `help`, whose "error" is the help text.
                println!("{e}");
                continue;
            }
        };
        if command == ReplCommand::Quit {
            break;
        }
        run_command(&console, command, &mut selected, &mut lines).await?;
    }

    if let Some(poller) = poller {
        poller.stop().await;
    }
    info!("Console closed.");
    Ok(())
}

/// Commands that talk to the backend are spawned, so a slow one never holds
/// up the prompt or the next command.
async fn run_command(
    console: &Console,
    command: ReplCommand,
    selected: &mut Option<String>,
    lines: &mut Lines<BufReader<Stdin>>,
) -> io::Result<()> {
    let dispatcher = console.dispatcher().clone();
    match command {
        ReplCommand::List => {
            println!("{}", connections_table(&console.store().snapshot().await));
        }
        ReplCommand::Refresh => {
            tokio::spawn(async move {
                let _ = dispatcher.refresh().await;
            });
        }
        ReplCommand::Add {
            connection_id,
            host,
            port,
        } => {
            tokio::spawn(async move {
                let mut form = ConnectionForm::new(connection_id, host, port);
                let _ = dispatcher.add_connection(&mut form).await;
            });
        }
        ReplCommand::Remove { connection_id, yes } => {
            let confirmation = if yes {
                Confirmation::Granted
            } else {
                confirm(
                    &format!("Are you sure you want to remove connection '{connection_id}'? [y/N]"),
                    lines,
                )
                .await?
            };
            if selected.as_deref() == Some(connection_id.as_str())
                && confirmation == Confirmation::Granted
            {
                *selected = None;
            }
            tokio::spawn(async move {
                let _ = dispatcher
                    .remove_connection(&connection_id, confirmation)
                    .await;
            });
        }
        ReplCommand::Connect { connection_id } => {
            let record = console.store().get(&connection_id).await;
            if let Some(notice) = disabled_notice(Toggle::Connect, record.as_ref()) {
                println!("{notice}");
                return Ok(());
            }
            tokio::spawn(async move {
                let _ = dispatcher.connect(&connection_id).await;
            });
        }
        ReplCommand::Disconnect { connection_id } => {
            let record = console.store().get(&connection_id).await;
            if let Some(notice) = disabled_notice(Toggle::Disconnect, record.as_ref()) {
                println!("{notice}");
                return Ok(());
            }
            tokio::spawn(async move {
                let _ = dispatcher.disconnect(&connection_id).await;
            });
        }
        ReplCommand::Select { connection_id } => match console.store().get(&connection_id).await {
            Some(record) => {
                println!("Selected {}", record.label());
                *selected = Some(connection_id);
            }
            None => println!("Unknown connection '{connection_id}'. Try `list` or `refresh`."),
        },
        ReplCommand::Echo => {
            let target = selected.clone();
            tokio::spawn(async move {
                let _ = dispatcher.send_echo(target.as_deref()).await;
            });
        }
        ReplCommand::Send { text, .. } => {
            let target = selected.clone();
            tokio::spawn(async move {
                let _ = dispatcher.send_message(target.as_deref(), &text).await;
            });
        }
        ReplCommand::Samples => {
            for (key, body) in SAMPLE_MESSAGES {
                println!("{key}  {body}");
            }
        }
        ReplCommand::Sample { key } => match sample_message(&key) {
            Some(body) => {
                let target = selected.clone();
                tokio::spawn(async move {
                    let _ = dispatcher.send_message(target.as_deref(), body).await;
                });
            }
            None => println!("No sample '{key}'. Try `samples`."),
        },
        ReplCommand::Log => {
            for entry in console.log().entries().await {
                println!("{}", log_line(&entry));
            }
        }
        ReplCommand::Clear => dispatcher.clear_log().await,
        ReplCommand::Quit => {}
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Toggle {
    Connect,
    Disconnect,
}

/// Message shown instead of sending `toggle` when the last snapshot says it
/// does not apply. Unknown ids go through so the dispatcher reports them.
fn disabled_notice(toggle: Toggle, record: Option<&ConnectionRecord>) -> Option<String> {
    let record = record?;
    match toggle {
        Toggle::Connect if !record.can_connect() => {
            Some(format!("{} is already connected.", record.label()))
        }
        Toggle::Disconnect if !record.can_disconnect() => {
            Some(format!("{} is not connected.", record.label()))
        }
        _ => None,
    }
}

/// Reads the next line as a yes/no answer; anything but `y`/`yes` declines.
async fn confirm(
    prompt: &str,
    lines: &mut Lines<BufReader<Stdin>>,
) -> io::Result<Confirmation> {
    println!("{prompt}");
    let answer = lines.next_line().await?.unwrap_or_default();
    Ok(match answer.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Confirmation::Granted,
        _ => Confirmation::Denied,
    })
}
