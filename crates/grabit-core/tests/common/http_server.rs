//! Minimal HTTP/1.1 server for integration tests.
//!
//! Serves fixed bodies by request path (404 for anything else) and counts
//! every request it receives, so tests can assert on network activity.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, Copy, Default)]
pub struct ServerOptions {
    /// If set, bodies are written one byte at a time with this pause between
    /// bytes (keeps a transfer in flight long enough to interrupt it).
    pub byte_delay: Option<Duration>,
}

pub struct TestServer {
    base: String,
    hits: Arc<AtomicUsize>,
}

impl TestServer {
    /// Full URL for `path` (no leading slash).
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// Number of requests received so far.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

/// Starts a server in a background thread serving `routes` (path without
/// leading slash → body). The server runs until the process exits.
pub fn start(routes: &[(&str, &str)]) -> TestServer {
    start_with_options(routes, ServerOptions::default())
}

/// Like `start` but allows customizing server behavior (slow bodies).
pub fn start_with_options(routes: &[(&str, &str)], opts: ServerOptions) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let routes: Arc<HashMap<String, Vec<u8>>> = Arc::new(
        routes
            .iter()
            .map(|(p, b)| (format!("/{}", p), b.as_bytes().to_vec()))
            .collect(),
    );
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let routes = Arc::clone(&routes);
            let counter = Arc::clone(&counter);
            thread::spawn(move || handle(stream, &routes, &counter, opts));
        }
    });
    TestServer {
        base: format!("http://127.0.0.1:{}/", port),
        hits,
    }
}

/// A URL on a port nothing listens on (connection refused).
pub fn refused_url(path: &str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}/{}", port, path)
}

fn handle(
    mut stream: TcpStream,
    routes: &HashMap<String, Vec<u8>>,
    hits: &AtomicUsize,
    opts: ServerOptions,
) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let mut request = Vec::new();
    let mut buf = [0u8; 4096];
    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => return,
            Ok(n) => request.extend_from_slice(&buf[..n]),
        }
    }
    hits.fetch_add(1, Ordering::SeqCst);

    let request = String::from_utf8_lossy(&request);
    let path = request
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("/");
    let path = path.split('?').next().unwrap_or(path);

    match routes.get(path) {
        Some(body) => {
            let head = format!(
                "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            );
            if stream.write_all(head.as_bytes()).is_err() {
                return;
            }
            match opts.byte_delay {
                None => {
                    let _ = stream.write_all(body);
                }
                Some(delay) => {
                    for byte in body.chunks(1) {
                        // Client hung up (aborted transfer).
                        if stream.write_all(byte).and_then(|_| stream.flush()).is_err() {
                            return;
                        }
                        thread::sleep(delay);
                    }
                }
            }
        }
        None => {
            let _ = stream.write_all(
                b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
            );
        }
    }
}
