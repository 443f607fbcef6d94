//! Translate Service
//!
//! A small HTTP/1.1 service exposing the transcoder to other systems. TLS
//! is expected to be terminated in front of it.
//!
//! | Path         | Parameters          | Result                              |
//! |--------------|---------------------|-------------------------------------|
//! | `/translate` | `p`, `d`, `k` (opt) | decoded uplink report set           |
//! | `/downlink`  | `p`, `d`, `k` (opt) | decoded downlink and its encoding   |
//!
//! `p` is the LoRaWAN port, `d` the payload as hex digits and `k` an API
//! key. Every failure is answered with status 400 and a plain-text reason.
//! A client that does not finish its request head within the read timeout
//! gets 408 and is disconnected.

use std::io;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use strips_codec::decode_uplink;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Semaphore;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::api_keys::ApiKeys;
use crate::hexdata::parse_hex;
use crate::translate::translate_downlink;
use crate::{Result, RunnerError};

/// Largest request head accepted, in bytes.
pub const MAX_REQUEST_HEAD: usize = 8 * 1024;

/// Time a client has to send its complete request head.
pub const REQUEST_READ_TIMEOUT: Duration = Duration::from_secs(10);

/// Connections served at once; further clients wait in the accept backlog.
pub const MAX_CONNECTIONS: usize = 256;

// ============================================================================
// Responses
// ============================================================================

/// A complete HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// Status code.
    pub status: u16,
    /// Value of the `Content-Type` header.
    pub content_type: &'static str,
    /// Body text.
    pub body: String,
}

impl HttpResponse {
    /// 200 with a JSON body.
    pub fn json(body: String) -> Self {
        Self {
            status: 200,
            content_type: "application/json",
            body,
        }
    }

    /// 400 with a plain-text reason.
    pub fn bad_request(reason: impl Into<String>) -> Self {
        Self {
            status: 400,
            content_type: "text/plain; charset=utf-8",
            body: reason.into(),
        }
    }

    /// 408 for a client that stopped sending.
    pub fn request_timeout() -> Self {
        Self {
            status: 408,
            content_type: "text/plain; charset=utf-8",
            body: "Request timeout".to_string(),
        }
    }

    /// 500 with a plain-text reason.
    pub fn internal_error(reason: impl Into<String>) -> Self {
        Self {
            status: 500,
            content_type: "text/plain; charset=utf-8",
            body: reason.into(),
        }
    }

    fn reason_phrase(&self) -> &'static str {
        match self.status {
            200 => "OK",
            400 => "Bad Request",
            408 => "Request Timeout",
            _ => "Internal Server Error",
        }
    }

    /// Serialize status line, headers and body.
    pub fn to_bytes(&self) -> Vec<u8> {
        format!(
            "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            self.status,
            self.reason_phrase(),
            self.content_type,
            self.body.len(),
            self.body
        )
        .into_bytes()
    }
}

// ============================================================================
// Request handling
// ============================================================================

/// Service functions selected by request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Function {
    Uplink,
    Downlink,
}

/// Request handler shared by every connection.
#[derive(Debug, Clone)]
pub struct TranslateService {
    api_keys: ApiKeys,
    read_timeout: Duration,
}

impl Default for TranslateService {
    fn default() -> Self {
        Self::new(ApiKeys::default())
    }
}

impl TranslateService {
    /// Create a service gated by `api_keys`.
    pub fn new(api_keys: ApiKeys) -> Self {
        Self {
            api_keys,
            read_timeout: REQUEST_READ_TIMEOUT,
        }
    }

    /// Replace the request head read timeout.
    pub fn with_read_timeout(mut self, read_timeout: Duration) -> Self {
        self.read_timeout = read_timeout;
        self
    }

    /// Time a client has to send its request head.
    pub fn read_timeout(&self) -> Duration {
        self.read_timeout
    }

    /// Answer a request for `target` (path plus query string).
    pub fn handle(&self, target: &str) -> HttpResponse {
        debug!(target, "Handling request");
        let (path, query) = target.split_once('?').unwrap_or((target, ""));
        let params = parse_query(query);

        let function = match path {
            "/translate" => Function::Uplink,
            "/downlink" => Function::Downlink,
            other => {
                warn!(path = other, "Unknown function");
                return HttpResponse::bad_request(format!("Unknown function {}", other));
            }
        };

        let Some(port) = param(&params, "p")
            .and_then(|p| p.parse::<u16>().ok())
            .filter(|p| *p >= 1)
        else {
            return HttpResponse::bad_request("Missing parameter 'p' (port, integer)");
        };

        let Some(data) = param(&params, "d") else {
            return HttpResponse::bad_request(
                "Missing parameter 'd' (data), should be string of hexadecimal digits",
            );
        };
        debug!(port, data, "Request parameters");

        let Ok(bytes) = parse_hex(data) else {
            return HttpResponse::bad_request(
                "Bad parameter 'd' (data), hexadecimal digits could not be converted",
            );
        };

        if !self.api_keys.allows(param(&params, "k")) {
            warn!(port, "Bad or missing API key");
            return HttpResponse::bad_request("API key does not match a registerred key");
        }

        let body = match function {
            Function::Uplink => decode_uplink(port, &bytes).map(|set| serde_json::to_string(&set)),
            Function::Downlink => translate_downlink(port, &bytes).map(|t| serde_json::to_string(&t)),
        };

        match body {
            Ok(Ok(body)) => HttpResponse::json(body),
            Ok(Err(e)) => HttpResponse::internal_error(e.to_string()),
            Err(e) => {
                info!(port, error = %e, "Payload rejected");
                HttpResponse::bad_request(e.to_string())
            }
        }
    }
}

fn param<'a>(params: &'a [(String, String)], name: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

/// Split a query string into decoded `(key, value)` pairs.
fn parse_query(query: &str) -> Vec<(String, String)> {
    query
        .split('&')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let (key, value) = part.split_once('=').unwrap_or((part, ""));
            (percent_decode(key), percent_decode(value))
        })
        .collect()
}

fn percent_decode(text: &str) -> String {
    let raw = text.as_bytes();
    let mut out = Vec::with_capacity(raw.len());
    let mut i = 0;
    while i < raw.len() {
        match raw[i] {
            b'+' => out.push(b' '),
            b'%' if i + 2 < raw.len() => {
                match std::str::from_utf8(&raw[i + 1..i + 3])
                    .ok()
                    .and_then(|h| u8::from_str_radix(h, 16).ok())
                {
                    Some(b) => {
                        out.push(b);
                        i += 3;
                        continue;
                    }
                    None => out.push(b'%'),
                }
            }
            b => out.push(b),
        }
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Extract the request target from the request line.
fn request_target(head: &[u8]) -> Option<String> {
    let head = std::str::from_utf8(head).ok()?;
    let line = head.lines().next()?;
    let mut parts = line.split_whitespace();
    let _method = parts.next()?;
    let target = parts.next()?;
    parts.next()?.starts_with("HTTP/").then(|| target.to_string())
}

fn find_head_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}

// ============================================================================
// Sockets
// ============================================================================

/// Outcome of reading a request head.
enum Head {
    /// Head ends at this offset.
    Complete(usize),
    /// Peer closed without sending anything.
    Closed,
    /// Oversized or cut short.
    Invalid,
}

async fn read_head(stream: &mut TcpStream, buf: &mut Vec<u8>) -> io::Result<Head> {
    let mut chunk = [0u8; 1024];
    loop {
        if let Some(end) = find_head_end(buf) {
            return Ok(Head::Complete(end));
        }
        if buf.len() >= MAX_REQUEST_HEAD {
            return Ok(Head::Invalid);
        }
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Ok(if buf.is_empty() { Head::Closed } else { Head::Invalid });
        }
        buf.extend_from_slice(&chunk[..n]);
    }
}

/// Serve one connection: read a request head, answer it and close.
///
/// The whole head must arrive within the service's read timeout.
pub async fn handle_connection(mut stream: TcpStream, service: &TranslateService) -> io::Result<()> {
    let mut buf = Vec::with_capacity(1024);

    let head = timeout(service.read_timeout(), read_head(&mut stream, &mut buf)).await;
    let response = match head {
        Ok(head) => match head? {
            Head::Complete(end) => match request_target(&buf[..end]) {
                Some(target) => service.handle(&target),
                None => HttpResponse::bad_request("Bad request"),
            },
            Head::Closed => return Ok(()),
            Head::Invalid => HttpResponse::bad_request("Bad request"),
        },
        Err(_) => {
            debug!(received = buf.len(), "Request head timed out");
            HttpResponse::request_timeout()
        }
    };

    stream.write_all(&response.to_bytes()).await?;
    stream.flush().await?;
    stream.shutdown().await
}

/// Accept connections forever, one task per connection, at most
/// [`MAX_CONNECTIONS`] at a time.
pub async fn serve(listener: TcpListener, service: Arc<TranslateService>) -> io::Result<()> {
    let slots = Arc::new(Semaphore::new(MAX_CONNECTIONS));
    loop {
        let Ok(permit) = slots.clone().acquire_owned().await else {
            return Ok(());
        };
        let (stream, peer) = listener.accept().await?;
        let service = service.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, &service).await {
                warn!(%peer, error = %e, "Connection error");
            }
            drop(permit);
        });
    }
}

/// Translate service settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind.
    pub listen: String,
    /// TCP port.
    pub port: u16,
    /// Directory whose file names are the accepted API keys.
    pub api_keys_dir: PathBuf,
}

impl ServerConfig {
    /// Socket address to bind.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self
            .listen
            .parse()
            .map_err(|_| RunnerError::InvalidAddress(self.listen.clone()))?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Load keys, bind and serve until the process ends.
pub async fn run_server(config: &ServerConfig) -> Result<()> {
    let addr = config.socket_addr()?;
    let service = Arc::new(TranslateService::new(ApiKeys::load(&config.api_keys_dir)?));

    let listener = TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "Translate service listening");
    serve(listener, service).await?;
    Ok(())
}
