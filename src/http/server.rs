//! HTTP endpoint republishing the JSON statistics.
//!
//! A small HTTP/1.1 responder on a std `TcpListener`: one
//! request per connection, `GET /stat` returns the current snapshot.

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, error, info, warn};

use crate::stats::TrafficStats;

/// JSON statistics server.
pub struct StatsServer {
    stats: Arc<dyn TrafficStats>,
    /// Bind address for HTTP server.
    bind_addr: SocketAddr,
    /// Running flag.
    running: Arc<AtomicBool>,
}

impl StatsServer {
    /// Create a new statistics server.
    pub fn new(stats: Arc<dyn TrafficStats>, bind_addr: SocketAddr) -> Self {
        Self {
            stats,
            bind_addr,
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Share an existing running flag, so the server stops with the monitor.
    pub fn with_running(mut self, running: Arc<AtomicBool>) -> Self {
        self.running = running;
        self
    }

    /// Get the statistics URL.
    pub fn url(&self) -> String {
        format!("http://{}/stat", self.bind_addr)
    }

    /// Bind the listener. Split from `serve` so bind errors surface early.
    pub fn bind(&self) -> Result<TcpListener> {
        let listener = TcpListener::bind(self.bind_addr)
            .with_context(|| format!("Failed to bind HTTP server to {}", self.bind_addr))?;

        listener
            .set_nonblocking(true)
            .context("Failed to set non-blocking")?;

        Ok(listener)
    }

    /// Accept connections until the running flag is cleared.
    pub fn serve(&self, listener: TcpListener) {
        info!("Statistics HTTP server listening on {}", self.url());

        while self.running.load(Ordering::SeqCst) {
            match listener.accept() {
                Ok((stream, addr)) => {
                    debug!("HTTP connection from {}", addr);
                    if let Err(e) = self.handle_connection(stream) {
                        warn!("Error handling HTTP request from {}: {}", addr, e);
                    }
                }
                Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    thread::sleep(Duration::from_millis(100));
                }
                Err(e) => {
                    error!("Accept error: {}", e);
                }
            }
        }

        info!("Statistics HTTP server stopped");
    }

    /// Handle an incoming HTTP connection.
    fn handle_connection(&self, mut stream: TcpStream) -> Result<()> {
        // Accepted sockets inherit non-blocking mode on some platforms
        stream.set_nonblocking(false)?;
        stream.set_read_timeout(Some(Duration::from_secs(5)))?;
        stream.set_write_timeout(Some(Duration::from_secs(5)))?;

        let mut buffer = [0u8; 4096];
        let bytes_read = stream.read(&mut buffer)?;

        if bytes_read == 0 {
            return Ok(());
        }

        let request = String::from_utf8_lossy(&buffer[..bytes_read]);
        let response = self.respond(&request);

        stream.write_all(response.as_bytes())?;
        stream.flush()?;

        Ok(())
    }

    /// Build the full response for a raw request.
    fn respond(&self, request: &str) -> String {
        let (method, path) = parse_request(request);
        debug!("HTTP {} {}", method, path);

        match (method.as_str(), path.as_str()) {
            ("GET", "/stat") | ("GET", "/stat/") => {
                http_response(200, "application/json", &self.stats.render_json())
            }
            ("GET", "/") => http_response(200, "text/plain", "stat\n"),
            ("GET", _) => http_response(404, "text/plain", &format!("Not Found: {}\n", path)),
            _ => http_response(405, "text/plain", "Method Not Allowed\n"),
        }
    }
}

/// Parse HTTP request line.
fn parse_request(request: &str) -> (String, String) {
    let first_line = request.lines().next().unwrap_or("");
    let parts: Vec<&str> = first_line.split_whitespace().collect();

    if parts.len() >= 2 {
        (parts[0].to_string(), parts[1].to_string())
    } else {
        ("GET".to_string(), "/".to_string())
    }
}

/// Build an HTTP response.
fn http_response(status: u16, content_type: &str, body: &str) -> String {
    let status_text = match status {
        200 => "OK",
        404 => "Not Found",
        405 => "Method Not Allowed",
        _ => "Unknown",
    };

    format!(
        "HTTP/1.1 {} {}\r\n\
         Content-Type: {}\r\n\
         Content-Length: {}\r\n\
         Connection: close\r\n\
         \r\n\
         {}",
        status,
        status_text,
        content_type,
        body.len(),
        body
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ParsedFrame;
    use crate::stats::StatsAggregator;
    use std::net::Ipv4Addr;

    fn server() -> StatsServer {
        let stats = StatsAggregator::new(Ipv4Addr::LOCALHOST);
        stats.add_frame(
            &ParsedFrame::new(60).with_ipv4(Ipv4Addr::LOCALHOST, Ipv4Addr::new(10, 0, 0, 5)),
        );
        let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, 0));
        StatsServer::new(Arc::new(stats), addr)
    }

    #[test]
    fn test_url() {
        let addr = SocketAddr::from((Ipv4Addr::new(127, 0, 0, 1), 8080));
        let server = StatsServer::new(Arc::new(StatsAggregator::new(Ipv4Addr::LOCALHOST)), addr);
        assert_eq!(server.url(), "http://127.0.0.1:8080/stat");
    }

    #[test]
    fn test_running_by_default() {
        assert!(server().running.load(Ordering::SeqCst));
    }

    #[test]
    fn test_parse_request() {
        let (method, path) = parse_request("GET /stat HTTP/1.1\r\nHost: test\r\n");
        assert_eq!(method, "GET");
        assert_eq!(path, "/stat");
    }

    #[test]
    fn test_parse_request_empty() {
        let (method, path) = parse_request("");
        assert_eq!(method, "GET");
        assert_eq!(path, "/");
    }

    #[test]
    fn test_http_response() {
        let response = http_response(200, "text/plain", "hello");
        assert!(response.contains("HTTP/1.1 200 OK"));
        assert!(response.contains("Content-Length: 5"));
        assert!(response.ends_with("\r\n\r\nhello"));
    }

    #[test]
    fn test_stat_returns_json() {
        let response = server().respond("GET /stat HTTP/1.1\r\n\r\n");
        assert!(response.starts_with("HTTP/1.1 200 OK"));
        assert!(response.contains("Content-Type: application/json"));
        assert!(response.ends_with(r#""packets":{"in":0,"out":1,"total":1}}]}"#));
    }

    #[test]
    fn test_index() {
        let response = server().respond("GET / HTTP/1.1\r\n\r\n");
        assert!(response.starts_with("HTTP/1.1 200 OK"));
        assert!(response.contains("Content-Type: text/plain"));
        assert!(response.ends_with("\r\n\r\nstat\n"));
    }

    #[test]
    fn test_unknown_path() {
        let response = server().respond("GET /nope HTTP/1.1\r\n\r\n");
        assert!(response.starts_with("HTTP/1.1 404 Not Found"));
    }

    #[test]
    fn test_wrong_method() {
        let response = server().respond("POST /stat HTTP/1.1\r\n\r\n");
        assert!(response.starts_with("HTTP/1.1 405 Method Not Allowed"));
    }

    #[test]
    fn test_serve_over_tcp() {
        let running = Arc::new(AtomicBool::new(true));
        let server = server().with_running(Arc::clone(&running));
        let listener = server.bind().unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = thread::spawn(move || server.serve(listener));

        let mut stream = TcpStream::connect(addr).unwrap();
        stream.write_all(b"GET /stat HTTP/1.1\r\nHost: localhost\r\n\r\n").unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).unwrap();

        running.store(false, Ordering::SeqCst);
        handle.join().unwrap();

        assert!(response.starts_with("HTTP/1.1 200 OK"));
        assert!(response.contains(r#"{"hosts":[{"ip":"10.0.0.5""#));
    }
}
