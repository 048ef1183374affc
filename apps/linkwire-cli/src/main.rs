mod commands;
mod config;

use std::io::BufRead;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use linkwire_connection::{ClientConfig, ConnectionState, Envelope, SocketClient, TransferEvent};
use linkwire_protocol::MessageType;
use linkwire_protocol::constants::network_quality_from_bandwidth;

use commands::{HELP, Input, parse_line};
use config::CliConfig;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut cfg = CliConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to load config, using defaults");
        CliConfig::default()
    });
    cfg.apply_args(std::env::args().skip(1))?;

    let client = SocketClient::start(ClientConfig {
        download_dir: cfg.download_dir.clone(),
        ..ClientConfig::default()
    })
    .context("failed to start client")?;
    install_printers(&client);

    println!("{HELP}");
    client.connect(cfg.host.clone(), cfg.port)?;

    for line in std::io::stdin().lock().lines() {
        let line = line.context("failed to read stdin")?;
        match parse_line(&line) {
            Ok(Input::Quit) => break,
            Ok(input) => handle(&client, &cfg, input),
            Err(e) => eprintln!("{e}"),
        }
    }

    client.shutdown();
    Ok(())
}

fn install_printers(client: &SocketClient) {
    client.set_on_connect(|| println!("* connected"));
    client.set_on_disconnect(|| println!("* disconnected"));
    client.set_on_receive(print_envelope);
    client.set_on_transfer(|event| match event {
        TransferEvent::Started {
            file_name,
            expected_size,
        } => println!("* receiving {file_name} ({expected_size} bytes)"),
        TransferEvent::Progress {
            file_name,
            received,
            expected,
            fraction,
        } => {
            tracing::debug!(file = %file_name, received, expected, fraction, "transfer progress")
        }
        TransferEvent::Saved(saved) => println!(
            "* saved {} ({} bytes, sha256 {})",
            saved.path.display(),
            saved.size,
            saved.sha256
        ),
        TransferEvent::Failed { file_name, reason } => {
            println!("* transfer of {file_name} failed: {reason}")
        }
    });
}

fn print_envelope(envelope: &Envelope) {
    match envelope.kind() {
        // Transfers and keepalives are reported elsewhere.
        kind if kind.is_file_transfer() => {}
        MessageType::HeartbeatAck => {}
        MessageType::Chat => match envelope.content_str() {
            Some(text) => println!("[chat] {text}"),
            None => println!("[chat] {}", envelope.content),
        },
        _ => println!("[{}] {}", envelope.msg_type, envelope.content),
    }
}

fn handle(client: &SocketClient, cfg: &CliConfig, input: Input) {
    let result = match input {
        Input::Empty | Input::Quit => Ok(()),
        Input::Help => {
            println!("{HELP}");
            Ok(())
        }
        Input::Chat(text) => client.send_chat(text),
        Input::Files => client.request_files(),
        Input::Quality {
            down_kbps,
            up_kbps,
        } => {
            let quality = network_quality_from_bandwidth(down_kbps, up_kbps);
            println!("* network quality {quality}");
            client.send_network_quality(quality)
        }
        Input::State => {
            println!("* {}", describe(client.state()));
            Ok(())
        }
        Input::Connect => client.connect(cfg.host.clone(), cfg.port),
        Input::Disconnect => {
            client.disconnect();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
    }
}

fn describe(state: ConnectionState) -> String {
    match state {
        ConnectionState::Disconnected => "disconnected".into(),
        ConnectionState::Connecting => "connecting".into(),
        ConnectionState::Connected => "connected".into(),
        ConnectionState::Reconnecting { attempt } => format!("reconnecting (attempt {attempt})"),
    }
}
