//! CLI command definitions

use clap::{Parser, Subcommand, ValueEnum};
use reqwest::header::{HeaderName, HeaderValue};

use streamprobe::decoder::FramingMode;

/// Response body framing
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Framing {
    /// Server-Sent Events (`data: ...` lines, `data: [DONE]` terminator)
    Sse,
    /// One JSON document per line
    JsonLines,
}

impl From<Framing> for FramingMode {
    fn from(framing: Framing) -> Self {
        match framing {
            Framing::Sse => FramingMode::Sse,
            Framing::JsonLines => FramingMode::JsonLines,
        }
    }
}

/// CLI arguments for streamprobe
#[derive(Parser, Debug)]
#[command(name = "streamprobe")]
#[command(author, version, about = "Exercise a streaming agent engine from the terminal")]
#[command(long_about = r#"
streamprobe sends chat messages to a remote agent engine and renders the
streamed response as formatted JSON.

The endpoint is the engine resource URL, e.g.
  https://us-central1-aiplatform.googleapis.com/v1/projects/P/locations/L/reasoningEngines/ID
A pasted `:streamQuery?alt=sse` URL works too.

Token and endpoint are taken from flags, then environment variables, then the
stored credentials file (read and written only with --persist).

Example:
  streamprobe --endpoint $ENGINE --token $(gcloud auth print-access-token) send "Hello"
  streamprobe --require-session --user-id alice chat
  streamprobe --framing json-lines send "Hi"
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Agent engine resource URL
    #[arg(long, global = true, env = "STREAMPROBE_ENDPOINT", value_name = "URL")]
    pub endpoint: Option<String>,

    /// Bearer access token
    #[arg(long, global = true, env = "STREAMPROBE_TOKEN", value_name = "TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Response body framing
    #[arg(long, global = true, value_enum, default_value = "sse")]
    pub framing: Framing,

    /// Require a session to be created before sending
    #[arg(long, global = true)]
    pub require_session: bool,

    /// Remember the token and endpoint for later runs
    #[arg(long, global = true)]
    pub persist: bool,

    /// User id for new sessions and session-less queries
    #[arg(long, global = true, default_value = "", value_name = "ID")]
    pub user_id: String,

    /// Existing session id to send to
    #[arg(long, global = true, value_name = "ID")]
    pub session_id: Option<String>,

    /// Proxy URL for all requests
    #[arg(long, global = true, value_name = "URL")]
    pub proxy: Option<String>,

    /// Extra request header, repeatable
    #[arg(long = "header", global = true, value_name = "NAME:VALUE", value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// Request timeout in seconds
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Disable coloured status lines
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Parse `NAME:VALUE` into a valid HTTP header pair.
fn parse_header(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected NAME:VALUE, got `{}`", raw))?;
    let (name, value) = (name.trim(), value.trim());

    HeaderName::from_bytes(name.as_bytes())
        .map_err(|e| format!("invalid header name `{}`: {}", name, e))?;
    HeaderValue::from_str(value).map_err(|e| format!("invalid header value for `{}`: {}", name, e))?;

    Ok((name.to_string(), value.to_string()))
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a session and print its id
    Session,

    /// Send one message and stream the response
    Send {
        /// The message to send
        message: String,
    },

    /// Interactive mode: one message per line
    Chat,

    /// Inspect or remove stored credentials
    Credentials {
        #[command(subcommand)]
        action: CredentialsAction,
    },
}

#[derive(Subcommand, Debug, Clone, Copy)]
pub enum CredentialsAction {
    /// Show the stored endpoint and a masked token
    Show,
    /// Delete the stored credentials file
    Clear,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_send() {
        let cli = Cli::try_parse_from([
            "streamprobe",
            "--endpoint",
            "https://host/e",
            "--token",
            "t",
            "send",
            "hello",
            "--framing",
            "json-lines",
        ])
        .unwrap();

        assert!(matches!(cli.command, Command::Send { ref message } if message == "hello"));
        assert_eq!(FramingMode::from(cli.framing), FramingMode::JsonLines);
        assert_eq!(cli.endpoint.as_deref(), Some("https://host/e"));
        assert!(!cli.require_session);
    }

    #[test]
    fn test_parse_chat_flags() {
        let cli = Cli::try_parse_from([
            "streamprobe",
            "-vv",
            "--require-session",
            "--user-id",
            "alice",
            "chat",
        ])
        .unwrap();

        assert!(matches!(cli.command, Command::Chat));
        assert_eq!(cli.verbose, 2);
        assert!(cli.require_session);
        assert_eq!(cli.user_id, "alice");
    }

    #[test]
    fn test_parse_credentials() {
        let cli = Cli::try_parse_from(["streamprobe", "credentials", "clear"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Credentials {
                action: CredentialsAction::Clear
            }
        ));
    }

    #[test]
    fn test_parse_proxy_and_headers() {
        let cli = Cli::try_parse_from([
            "streamprobe",
            "--proxy",
            "http://proxy:3128",
            "--header",
            "X-Goog-User-Project: my-project",
            "--header",
            "X-Trace:1",
            "session",
        ])
        .unwrap();

        assert_eq!(cli.proxy.as_deref(), Some("http://proxy:3128"));
        assert_eq!(
            cli.headers,
            vec![
                ("X-Goog-User-Project".to_string(), "my-project".to_string()),
                ("X-Trace".to_string(), "1".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_rejects_malformed_header() {
        for bad in ["no-colon", "bad name:1", ":empty-name"] {
            let result = Cli::try_parse_from(["streamprobe", "--header", bad, "session"]);
            assert!(result.is_err(), "accepted {:?}", bad);
        }
    }
}
