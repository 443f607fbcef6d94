//! Strips Runner
//!
//! The I/O around the transcoder: hex payload parsing, a round-trip check
//! used by every front end, an interactive console, API-key gating, logging
//! setup and the HTTP translate service. The `strips` binary wires these to
//! the command line.

pub mod api_keys;
pub mod console;
mod error;
pub mod hexdata;
pub mod logging;
pub mod server;
pub mod translate;

pub use api_keys::ApiKeys;
pub use console::run_console;
pub use error::*;
pub use hexdata::parse_hex;
pub use logging::{init_logging, LogConfig, LogFormat, LogLevel};
pub use server::{
    run_server, serve, HttpResponse, ServerConfig, TranslateService, MAX_CONNECTIONS,
    REQUEST_READ_TIMEOUT,
};
pub use translate::{translate_downlink, DownlinkTranslation};
