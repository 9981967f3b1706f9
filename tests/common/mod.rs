// Common helpers for integration tests

#![allow(dead_code)]

use std::io::{BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::thread;

use id3::{Tag, TagLike, Version};

/// Minimal HTTP server answering every request with canned responses
///
/// Responses are served in order, the last one repeats. Each request line
/// (method, path and query) is recorded.
pub struct StubServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<String>>>,
}

impl StubServer {
    pub fn start(responses: Vec<(u16, &str)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let responses: Vec<(u16, String)> = responses
            .into_iter()
            .map(|(status, body)| (status, body.to_string()))
            .collect();

        let recorded = requests.clone();
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { continue };
                let Some(request_line) = read_request(&stream) else { continue };
                let index = {
                    let mut requests = recorded.lock().unwrap();
                    requests.push(request_line);
                    requests.len() - 1
                };
                let (status, body) = &responses[index.min(responses.len() - 1)];
                write_response(stream, *status, body);
            }
        });

        Self { addr, requests }
    }

    pub fn endpoint(&self) -> String {
        format!("http://{}/api/get", self.addr)
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

fn read_request(stream: &TcpStream) -> Option<String> {
    let mut reader = BufReader::new(stream);
    let mut request_line = String::new();
    reader.read_line(&mut request_line).ok()?;

    // Drain the headers, GET requests carry no body
    loop {
        let mut line = String::new();
        match reader.read_line(&mut line) {
            Ok(0) => break,
            Ok(_) if line == "\r\n" || line == "\n" => break,
            Ok(_) => continue,
            Err(_) => return None,
        }
    }

    Some(request_line.trim_end().to_string())
}

fn write_response(mut stream: TcpStream, status: u16, body: &str) {
    let reason = match status {
        200 => "OK",
        404 => "Not Found",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    };
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        reason,
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}

/// Port on localhost with nothing listening
pub fn closed_port_endpoint() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}/api/get", port)
}

pub const YESTERDAY_FOUND: &str =
    r#"{"instrumental":false,"syncedLyrics":"[00:01.00]...","plainLyrics":"..."}"#;

pub const TRACK_NOT_FOUND: &str =
    r#"{"code":404,"name":"TrackNotFound","message":"Failed to find specified track"}"#;

/// Write a DSF file with an ID3v2.3 tag holding artist, album and title
pub fn write_dsf(path: &Path, artist: &str, album: &str, title: &str, seconds: u64) {
    let mut id3 = Tag::new();
    id3.set_artist(artist);
    id3.set_album(album);
    id3.set_title(title);
    let mut tag = Vec::new();
    id3.write_to(&mut tag, Version::Id3v23).unwrap();

    let sample_rate: u32 = 2_822_400;
    let audio = vec![0x69u8; 8192];
    let metadata_offset = (80 + audio.len()) as u64;
    let total = metadata_offset + tag.len() as u64;

    let mut file = Vec::new();
    file.extend_from_slice(b"DSD ");
    file.extend_from_slice(&28u64.to_le_bytes());
    file.extend_from_slice(&total.to_le_bytes());
    file.extend_from_slice(&metadata_offset.to_le_bytes());
    file.extend_from_slice(b"fmt ");
    file.extend_from_slice(&52u64.to_le_bytes());
    for value in [1u32, 0, 2, 2, sample_rate, 1] {
        file.extend_from_slice(&value.to_le_bytes());
    }
    file.extend_from_slice(&(sample_rate as u64 * seconds).to_le_bytes());
    file.extend_from_slice(&4096u32.to_le_bytes());
    file.extend_from_slice(&0u32.to_le_bytes());
    file.extend_from_slice(&audio);
    file.extend_from_slice(&tag);

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, file).unwrap();
}
