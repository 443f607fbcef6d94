//! `strips` command-line tool.

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use strips_codec::{decode_uplink, encode_downlink, DownlinkCommand};
use strips_runner::{
    init_logging, parse_hex, run_console, run_server, translate_downlink, LogConfig, LogFormat,
    LogLevel, Result, ServerConfig,
};
use tracing::error;

/// Transcode Strips LoRaWAN payloads.
#[derive(Parser, Debug)]
#[command(name = "strips", version)]
struct Cli {
    /// Log level, overridden by RUST_LOG.
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,

    /// Log output format.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Compact)]
    log_format: LogFormat,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Decode a downlink and check that it encodes back to the same bytes.
    Downlink {
        /// LoRaWAN port.
        #[arg(long)]
        port: u16,
        /// Payload as hex digits.
        #[arg(long)]
        data: String,
    },
    /// Encode a structured downlink command given as JSON.
    Encode {
        /// Command in the form printed by `downlink`.
        #[arg(long)]
        json: String,
    },
    /// Decode an uplink report payload.
    Uplink {
        /// LoRaWAN port.
        #[arg(long)]
        port: u16,
        /// Payload as hex digits.
        #[arg(long)]
        data: String,
    },
    /// Interactive downlink decode/encode loop on stdin.
    Console,
    /// Run the HTTP translate service.
    Serve {
        /// Address to bind.
        #[arg(long, default_value = "0.0.0.0")]
        listen: String,
        /// TCP port.
        #[arg(long, env = "PORT")]
        port: u16,
        /// Directory whose file names are the accepted API keys.
        #[arg(long, default_value = "./apikeys")]
        api_keys: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&LogConfig {
        level: cli.log_level,
        format: cli.log_format,
    });

    match run(cli.cmd) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cmd: Cmd) -> Result<()> {
    match cmd {
        Cmd::Downlink { port, data } => {
            let translation = translate_downlink(port, &parse_hex(&data)?)?;
            println!("{}", serde_json::to_string_pretty(&translation)?);
        }
        Cmd::Encode { json } => {
            let command = DownlinkCommand::from_json(&serde_json::from_str(&json)?)?;
            println!("{}", serde_json::to_string_pretty(&encode_downlink(&command)?)?);
        }
        Cmd::Uplink { port, data } => {
            let set = decode_uplink(port, &parse_hex(&data)?)?;
            println!("{}", serde_json::to_string_pretty(&set)?);
        }
        Cmd::Console => {
            let stdin = io::stdin();
            run_console(stdin.lock(), &mut io::stdout())?;
        }
        Cmd::Serve {
            listen,
            port,
            api_keys,
        } => {
            let config = ServerConfig {
                listen,
                port,
                api_keys_dir: api_keys,
            };
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(run_server(&config))?;
        }
    }
    Ok(())
}
