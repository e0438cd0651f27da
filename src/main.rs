//! CLI entrypoint for streamprobe
//!
//! Resolves configuration, builds the client and runs one command.

mod cli;

use std::io::IsTerminal;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use itertools::Itertools;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command, CredentialsAction};
use streamprobe::credentials::{resolve_credentials, CredentialsStore, StoredCredentials};
use streamprobe::http::build_http_client;
use streamprobe::options::ProbeOptions;
use streamprobe::probe::Probe;
use streamprobe::providers::AgentEngineClient;
use streamprobe::render::{ConsoleSink, RenderSink, Status};

const CHAT_COMMANDS: &[(&str, &str)] = &[
    ("/session", "create a new session"),
    ("/reset", "forget the current session"),
    ("/help", "show this help"),
    ("/quit", "exit"),
];

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let store = CredentialsStore::new();

    if let Command::Credentials { action } = cli.command {
        let store = store.context("Could not determine the config directory")?;
        return run_credentials(&store, action);
    }

    let given = StoredCredentials::new(cli.endpoint.as_deref(), cli.token.as_deref());
    let resolved = resolve_credentials(given, store.as_ref(), cli.persist);

    let Some(endpoint) = resolved.endpoint else {
        bail!("No endpoint given. Use --endpoint or STREAMPROBE_ENDPOINT.");
    };
    let Some(token) = resolved.access_token else {
        bail!("Please enter an access token (--token or STREAMPROBE_TOKEN).");
    };

    let options = ProbeOptions::new(endpoint.clone())
        .with_framing(cli.framing.into())
        .with_require_session(cli.require_session)
        .with_persist_credentials(cli.persist);

    if options.persist_credentials {
        let store = store.as_ref().context("Could not determine the config directory")?;
        store
            .save(&StoredCredentials {
                endpoint: Some(endpoint),
                access_token: Some(token.clone()),
            })
            .context("Failed to save credentials")?;
        info!(path = %store.path().display(), "credentials saved");
    }

    let mut transport = options.transport(token);
    if let Some(secs) = cli.timeout {
        transport = transport.with_timeout(Duration::from_secs(secs));
    }
    if let Some(proxy) = &cli.proxy {
        transport.provider = transport.provider.with_proxy(proxy.clone());
    }
    for (name, value) in &cli.headers {
        transport.provider = transport.provider.with_header(name.clone(), value.clone());
    }
    // Validate the endpoint and proxy up front rather than on first request.
    transport.provider.endpoints()?;
    build_http_client(&transport)?;

    let mut probe = Probe::new(AgentEngineClient::new(transport), options)
        .with_user_id(cli.user_id.clone())
        .with_session_id(cli.session_id.clone().unwrap_or_default());

    let color = !cli.no_color && std::io::stderr().is_terminal();
    let mut sink = ConsoleSink::stdio().with_color(color);

    let has_session_id = cli.session_id.as_deref().is_some_and(|id| !id.trim().is_empty());
    match &cli.command {
        Command::Session => {
            let session = probe.create_session(&cli.user_id, &mut sink).await?;
            println!("{}", session.session_id);
        }
        Command::Send { message } => {
            if probe.options().require_session && !has_session_id {
                probe.create_session(&cli.user_id, &mut sink).await?;
            }
            probe.send_message(message, &mut sink).await?;
        }
        Command::Chat => {
            let create_first = cli.require_session && !has_session_id;
            run_chat(&mut probe, &cli.user_id, create_first, &mut sink).await?
        }
        Command::Credentials { .. } => unreachable!("handled above"),
    }

    Ok(())
}

async fn run_chat(
    probe: &mut Probe<AgentEngineClient>,
    user_id: &str,
    create_first: bool,
    sink: &mut ConsoleSink<std::io::Stdout, std::io::Stderr>,
) -> Result<()> {
    eprintln!("{}", chat_help());

    if create_first {
        // A failed creation is already reported; the user can retry with /session.
        let _ = probe.create_session(user_id, sink).await;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        eprint!("> ");
        let Some(line) = lines.next_line().await.context("Failed to read input")? else {
            break;
        };

        match line.trim() {
            "" => continue,
            "/quit" | "/exit" => break,
            "/help" => eprintln!("{}", chat_help()),
            "/session" => {
                let _ = probe.create_session(user_id, sink).await;
            }
            "/reset" => match probe.reset_session() {
                Some(session) => sink.status(&Status::success(format!(
                    "Session {} forgotten",
                    session.session_id
                ))),
                None => sink.status(&Status::success("No session to forget")),
            },
            message => {
                // Errors are rendered by the probe; keep the loop alive.
                if let Err(e) = probe.send_message(message, sink).await {
                    debug!(error = %e, "send failed");
                }
            }
        }
    }

    Ok(())
}

fn chat_help() -> String {
    CHAT_COMMANDS
        .iter()
        .map(|(command, description)| format!("  {:<10} {}", command, description))
        .join("\n")
}

fn run_credentials(store: &CredentialsStore, action: CredentialsAction) -> Result<()> {
    match action {
        CredentialsAction::Show => {
            let stored = store.load().context("Failed to read credentials")?;
            println!("file:     {}", store.path().display());
            println!("endpoint: {}", stored.endpoint.as_deref().unwrap_or("-"));
            println!(
                "token:    {}",
                stored.access_token.as_deref().map(mask).unwrap_or_else(|| "-".to_string())
            );
        }
        CredentialsAction::Clear => {
            store.clear().context("Failed to remove credentials")?;
            println!("Removed {}", store.path().display());
        }
    }
    Ok(())
}

fn mask(token: &str) -> String {
    let visible: String = token.chars().take(6).collect();
    format!("{}… ({} chars)", visible, token.chars().count())
}
