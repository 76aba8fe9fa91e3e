//! Shared helpers for integration tests: a one-shot HTTP server standing in
//! for the GitHub API, and a `CommandRunner` that records instead of running.

#![allow(dead_code)]

use std::cell::RefCell;
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::sync::mpsc;
use std::thread;

use anyhow::Result;
use gitian_build::docker::{CommandOutcome, CommandRunner, CommandSpec};

/// Request line and headers as the server saw them.
#[derive(Debug)]
pub struct CapturedRequest {
    pub request_line: String,
    pub headers: Vec<(String, String)>,
}

impl CapturedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        let lower = name.to_lowercase();
        self.headers
            .iter()
            .find(|(k, _)| k.to_lowercase() == lower)
            .map(|(_, v)| v.as_str())
    }
}

/// Start a server that answers exactly one request with `status` and `body`.
///
/// Returns the base URL and a receiver for the captured request.
pub fn spawn_json_server(status: u16, body: &str) -> (String, mpsc::Receiver<CapturedRequest>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("failed to bind");
    let addr = listener.local_addr().unwrap();
    let url = format!("http://{addr}");
    let body = body.to_string();
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("failed to accept");
        let mut reader = BufReader::new(stream.try_clone().unwrap());

        let mut request_line = String::new();
        reader.read_line(&mut request_line).unwrap();

        let mut headers = Vec::new();
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).unwrap();
            let trimmed = line.trim().to_string();
            if trimmed.is_empty() {
                break;
            }
            if let Some((k, v)) = trimmed.split_once(':') {
                headers.push((k.trim().to_string(), v.trim().to_string()));
            }
        }

        let response = format!(
            "HTTP/1.1 {status} Status\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        let _ = stream.write_all(response.as_bytes());
        let _ = stream.flush();

        let _ = tx.send(CapturedRequest {
            request_line: request_line.trim().to_string(),
            headers,
        });
    });

    (url, rx)
}

/// Records every command and answers with scripted exit codes, in order.
/// Once the script runs out every further command succeeds.
pub struct RecordingRunner {
    pub calls: RefCell<Vec<CommandSpec>>,
    codes: RefCell<Vec<i32>>,
}

impl RecordingRunner {
    pub fn succeeding() -> Self {
        Self::with_codes(&[])
    }

    pub fn with_codes(codes: &[i32]) -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            codes: RefCell::new(codes.iter().rev().copied().collect()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, command: &CommandSpec) -> Result<CommandOutcome> {
        self.calls.borrow_mut().push(command.clone());
        let code = self.codes.borrow_mut().pop().unwrap_or(0);
        Ok(CommandOutcome {
            code: Some(code),
            output: String::new(),
        })
    }
}
