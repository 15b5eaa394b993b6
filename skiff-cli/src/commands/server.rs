//! `skiff server [port]` — local development static file server.
//!
//! Serves the configured root with one blocking thread per connection.
//! Supports `Range`/206 partial content, `index.html` resolution for
//! directories, and a 301 trailing-slash redirect. Entirely separate
//! from the sync engine; it never touches bucket state.

use std::fs::File;
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use skiff_core::config;
use skiff_engine::content_type;

/// Arguments for `skiff server`.
#[derive(Args, Debug)]
pub struct ServerArgs {
    /// Port to listen on.
    #[arg(default_value_t = 8080)]
    pub port: u16,
}

impl ServerArgs {
    pub fn run(self) -> Result<()> {
        let project_dir = std::env::current_dir().context("cannot determine working directory")?;
        // No config is fine for a scratch directory; serve the cwd.
        let root = match config::load_at(&project_dir) {
            Ok(cfg) => cfg.root_at(&project_dir),
            Err(_) => project_dir,
        };

        let server = DevServer::bind(root, self.port)?;
        println!("Listening on {}", server.local_addr()?.port());
        server.serve_forever();
    }
}

/// A bound development server, ready to accept connections.
pub struct DevServer {
    listener: TcpListener,
    root: PathBuf,
}

impl DevServer {
    /// Bind on all interfaces. Port 0 picks an ephemeral port.
    pub fn bind(root: PathBuf, port: u16) -> Result<Self> {
        let listener = TcpListener::bind(("0.0.0.0", port))
            .with_context(|| format!("cannot listen on port {port}"))?;
        Ok(Self { listener, root })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections until the process exits.
    pub fn serve_forever(self) -> ! {
        loop {
            match self.listener.accept() {
                Ok((stream, _)) => {
                    let root = self.root.clone();
                    std::thread::spawn(move || {
                        if let Err(err) = handle_connection(stream, &root) {
                            eprintln!("connection error: {err}");
                        }
                    });
                }
                Err(err) => eprintln!("accept error: {err}"),
            }
        }
    }
}

fn handle_connection(mut stream: TcpStream, root: &Path) -> Result<()> {
    let mut reader = BufReader::new(stream.try_clone()?);
    let mut request_line = String::new();
    reader.read_line(&mut request_line)?;
    let mut parts = request_line.split_whitespace();
    let (method, target) = match (parts.next(), parts.next()) {
        (Some(m), Some(t)) => (m.to_string(), t.to_string()),
        _ => return Ok(()),
    };

    let mut range = None;
    loop {
        let mut line = String::new();
        reader.read_line(&mut line)?;
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some(value) = line.strip_prefix("Range:").or_else(|| line.strip_prefix("range:")) {
            range = parse_range(value.trim());
        }
    }

    if method != "GET" && method != "HEAD" {
        return write_error(&mut stream, 405, "Method Not Allowed");
    }

    match resolve(root, &target) {
        Resolved::Redirect(location) => {
            let response = format!(
                "HTTP/1.1 301 Moved Permanently\r\nLocation: {location}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
            );
            stream.write_all(response.as_bytes())?;
            Ok(())
        }
        Resolved::NotFound => write_error(&mut stream, 404, "File not found"),
        Resolved::File(path) => send_file(&mut stream, &path, &target, range, method == "HEAD"),
    }
}

fn send_file(
    stream: &mut TcpStream,
    path: &Path,
    target: &str,
    range: Option<(u64, Option<u64>)>,
    head_only: bool,
) -> Result<()> {
    let mut file = match File::open(path) {
        Ok(f) => f,
        Err(_) => return write_error(stream, 404, "File not found"),
    };
    let size = file.metadata()?.len();

    let key = target.trim_start_matches('/');
    let ctype = content_type::guess(key)
        .or_else(|| content_type::guess(&path.to_string_lossy()))
        .unwrap_or("application/octet-stream");

    let mut headers = String::new();
    let (from, to) = match range {
        None => {
            headers.push_str("HTTP/1.1 200 OK\r\n");
            headers.push_str(&format!("Content-Length: {size}\r\n"));
            (0, size.saturating_sub(1))
        }
        Some((from, to)) => {
            // Ranges are inclusive; clamp the end to the file size.
            let to = match to {
                Some(t) if t < size => t,
                _ => size.saturating_sub(1),
            };
            headers.push_str("HTTP/1.1 206 Partial Content\r\n");
            headers.push_str(&format!("Content-Range: bytes {from}-{to}/{size}\r\n"));
            headers.push_str(&format!("Content-Length: {}\r\n", (to + 1).saturating_sub(from)));
            (from, to)
        }
    };
    headers.push_str(&format!("Content-Type: {ctype}\r\n"));
    headers.push_str("Connection: close\r\n\r\n");
    stream.write_all(headers.as_bytes())?;

    if head_only {
        return Ok(());
    }

    file.seek(SeekFrom::Start(from))?;
    let mut left = (to + 1).saturating_sub(from);
    let mut buf = [0u8; 64 * 1024];
    while left > 0 {
        let want = left.min(buf.len() as u64) as usize;
        let n = file.read(&mut buf[..want])?;
        if n == 0 {
            break;
        }
        stream.write_all(&buf[..n])?;
        left -= n as u64;
    }
    Ok(())
}

fn write_error(stream: &mut TcpStream, status: u16, reason: &str) -> Result<()> {
    let body = format!("{status} {reason}\n");
    let response = format!(
        "HTTP/1.1 {status} {reason}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    stream.write_all(response.as_bytes())?;
    Ok(())
}

/// Outcome of mapping a request target onto the served root.
#[derive(Debug, PartialEq, Eq)]
enum Resolved {
    File(PathBuf),
    Redirect(String),
    NotFound,
}

/// Map a request target to a path under `root`.
///
/// Query and fragment are stripped, `%XX` escapes decoded, and `.`/`..`
/// components dropped so the result can never climb out of the root.
/// Directories resolve to their `index.html`/`index.htm`, or a 301
/// redirect when the trailing slash is missing.
fn resolve(root: &Path, target: &str) -> Resolved {
    let bare = target.split(['?', '#']).next().unwrap_or(target);
    let decoded = percent_decode(bare);

    let mut path = root.to_path_buf();
    for part in decoded.split('/') {
        if part.is_empty() || part == "." || part == ".." {
            continue;
        }
        path.push(part);
    }

    if path.is_dir() {
        if !bare.ends_with('/') {
            return Resolved::Redirect(format!("{bare}/"));
        }
        for index in ["index.html", "index.htm"] {
            let candidate = path.join(index);
            if candidate.is_file() {
                return Resolved::File(candidate);
            }
        }
        return Resolved::NotFound;
    }
    if path.is_file() {
        Resolved::File(path)
    } else {
        Resolved::NotFound
    }
}

/// Decode `%XX` escapes; malformed escapes pass through unchanged.
fn percent_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%'
            && i + 2 < bytes.len()
            && bytes[i + 1].is_ascii_hexdigit()
            && bytes[i + 2].is_ascii_hexdigit()
        {
            let hi = (bytes[i + 1] as char).to_digit(16).unwrap() as u8;
            let lo = (bytes[i + 2] as char).to_digit(16).unwrap() as u8;
            out.push(hi << 4 | lo);
            i += 3;
            continue;
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Parse a `bytes=from-to` header value. Open-ended ranges return
/// `(from, None)`; anything else is ignored.
fn parse_range(value: &str) -> Option<(u64, Option<u64>)> {
    let spec = value.strip_prefix("bytes=")?;
    let (from, to) = spec.split_once('-')?;
    let from: u64 = from.parse().ok()?;
    let to = if to.is_empty() {
        None
    } else {
        Some(to.split(',').next()?.parse().ok()?)
    };
    Some((from, to))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn range_header_parsing() {
        assert_eq!(parse_range("bytes=0-499"), Some((0, Some(499))));
        assert_eq!(parse_range("bytes=500-"), Some((500, None)));
        assert_eq!(parse_range("bytes=abc-def"), None);
        assert_eq!(parse_range("lines=1-2"), None);
    }

    #[test]
    fn percent_escapes_decode() {
        assert_eq!(percent_decode("/a%20b.txt"), "/a b.txt");
        assert_eq!(percent_decode("/plain"), "/plain");
        assert_eq!(percent_decode("/bad%zz"), "/bad%zz");
    }

    #[test]
    fn resolve_flattens_traversal_components() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("safe.txt"), "ok").unwrap();
        let resolved = resolve(dir.path(), "/../../safe.txt");
        assert_eq!(resolved, Resolved::File(dir.path().join("safe.txt")));
    }

    #[test]
    fn directory_without_slash_redirects() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("docs")).unwrap();
        assert_eq!(
            resolve(dir.path(), "/docs"),
            Resolved::Redirect("/docs/".to_string())
        );
    }

    #[test]
    fn directory_with_slash_serves_index() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("docs")).unwrap();
        fs::write(dir.path().join("docs/index.html"), "<html>").unwrap();
        assert_eq!(
            resolve(dir.path(), "/docs/"),
            Resolved::File(dir.path().join("docs").join("index.html"))
        );
    }

    #[test]
    fn query_strings_are_stripped() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), "ok").unwrap();
        assert_eq!(
            resolve(dir.path(), "/a.txt?v=2"),
            Resolved::File(dir.path().join("a.txt"))
        );
    }

    fn start(root: &Path) -> SocketAddr {
        let server = DevServer::bind(root.to_path_buf(), 0).unwrap();
        let addr = server.local_addr().unwrap();
        std::thread::spawn(move || server.serve_forever());
        addr
    }

    fn request(addr: SocketAddr, raw: &str) -> String {
        let mut stream = TcpStream::connect(addr).unwrap();
        stream.write_all(raw.as_bytes()).unwrap();
        let mut response = Vec::new();
        stream.read_to_end(&mut response).unwrap();
        String::from_utf8_lossy(&response).into_owned()
    }

    #[test]
    fn serves_whole_files_with_content_type() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("index.html"), "<html>hello</html>").unwrap();
        let addr = start(dir.path());

        let response = request(addr, "GET /index.html HTTP/1.1\r\nHost: t\r\n\r\n");
        assert!(response.starts_with("HTTP/1.1 200 OK"));
        assert!(response.contains("Content-Type: text/html"));
        assert!(response.ends_with("<html>hello</html>"));
    }

    #[test]
    fn serves_partial_content_for_range_requests() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("data.txt"), "01234").unwrap();
        let addr = start(dir.path());

        let response = request(
            addr,
            "GET /data.txt HTTP/1.1\r\nHost: t\r\nRange: bytes=1-3\r\n\r\n",
        );
        assert!(response.starts_with("HTTP/1.1 206 Partial Content"));
        assert!(response.contains("Content-Range: bytes 1-3/5"));
        assert!(response.ends_with("123"));
    }

    #[test]
    fn open_ended_range_runs_to_end_of_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("data.txt"), "01234").unwrap();
        let addr = start(dir.path());

        let response = request(
            addr,
            "GET /data.txt HTTP/1.1\r\nHost: t\r\nRange: bytes=2-\r\n\r\n",
        );
        assert!(response.contains("Content-Range: bytes 2-4/5"));
        assert!(response.ends_with("234"));
    }

    #[test]
    fn missing_files_are_404() {
        let dir = TempDir::new().unwrap();
        let addr = start(dir.path());
        let response = request(addr, "GET /nope.txt HTTP/1.1\r\nHost: t\r\n\r\n");
        assert!(response.starts_with("HTTP/1.1 404"));
    }
}
