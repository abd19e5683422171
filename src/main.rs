use std::env;
use std::process;

use tracing::{debug, info};

use deform_kv::{Client, ClientConfig};

const USAGE: &str = "usage: deform-kv get <key>\n       deform-kv set <key> <value>";

/// A parsed command line
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Get { key: String },
    Set { key: String, value: String },
}

/// Parse the arguments after the program name; `Err` carries the usage text.
fn parse_args(args: &[String]) -> Result<Command, &'static str> {
    match args {
        [cmd, key] if cmd == "get" => Ok(Command::Get { key: key.clone() }),
        [cmd, key, value] if cmd == "set" => Ok(Command::Set {
            key: key.clone(),
            value: value.clone(),
        }),
        _ => Err(USAGE),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so stdout only carries values
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let command = match parse_args(&args) {
        Ok(command) => command,
        Err(usage) => {
            eprintln!("{}", usage);
            process::exit(2);
        }
    };

    let config = ClientConfig::from_env()
        .map_err(|e| format!("Configuration error: {}", e))?;

    debug!("Project: {}", config.project);
    debug!("Collection: {}", config.collection);
    if let Some(timeout_ms) = config.timeout_ms {
        debug!("Request timeout: {}ms", timeout_ms);
    }

    let client = Client::with_config(config)?;

    match command {
        Command::Get { key } => {
            let value = client.get(&key).await?;
            println!("{}", value);
        }
        Command::Set { key, value } => {
            client.set(&key, &value).await?;
            info!("Stored key '{}'", key);
        }
    }

    Ok(())
}
