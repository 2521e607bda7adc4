use clap::{Parser, Subcommand};
use std::io::Read;

#[derive(Parser)]
#[command(name = "sms-relay")]
#[command(about = "SMS notification relay", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version
    Version,

    /// Create the configuration directory and default files (config and an editable copy of the bundled templates).
    Init {
        /// Config file path (default: SMS_RELAY_CONFIG_PATH or ~/.sms-relay/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,
    },

    /// Run the gateway (SMS webhook, notification endpoint, health probe).
    Gateway {
        /// Config file path (default: SMS_RELAY_CONFIG_PATH or ~/.sms-relay/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,

        /// HTTP port (default from config or 15152)
        #[arg(long, short)]
        port: Option<u16>,
    },

    /// Decode a webhook body and print the message and skipped segments as JSON.
    Decode {
        /// Raw form body (e.g. "From=%2B15551234567&Body=Hi"). Read from stdin when omitted.
        payload: Option<String>,
    },

    /// Strip a +1 country code from a phone number.
    Normalize {
        number: String,
    },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Version) => {
            println!("sms-relay {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Init { config }) => {
            if let Err(e) = run_init(config) {
                log::error!("init failed: {}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Gateway { config, port }) => {
            if let Err(e) = run_gateway(config, port).await {
                log::error!("gateway failed: {:#}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Decode { payload }) => {
            if let Err(e) = run_decode(payload) {
                log::error!("decode failed: {}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Normalize { number }) => {
            println!("{}", relay::phone::strip_country_code(&number));
        }
        None => {
            println!("Run with --help for usage");
        }
    }
}

fn run_init(config_path: Option<std::path::PathBuf>) -> anyhow::Result<()> {
    let path = config_path.unwrap_or_else(relay::config::default_config_path);
    let dir = relay::init::init_config_dir(&path)?;
    println!("initialized configuration at {}", dir.display());
    Ok(())
}

async fn run_gateway(
    config_path: Option<std::path::PathBuf>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    let (mut config, path) = relay::config::load_config(config_path)?;
    if let Some(p) = port {
        config.gateway.port = p;
    }
    log::info!("starting gateway on {}:{}", config.gateway.bind, config.gateway.port);
    relay::gateway::run_gateway(config, path).await
}

fn run_decode(payload: Option<String>) -> anyhow::Result<()> {
    let payload = match payload {
        Some(p) => p,
        None => {
            let mut s = String::new();
            std::io::stdin().read_to_string(&mut s)?;
            s.trim_end_matches(['\r', '\n']).to_string()
        }
    };
    let decoded = relay::channels::InboundMessage::decode(Some(&payload));
    println!("{}", serde_json::to_string_pretty(&decoded)?);
    Ok(())
}
