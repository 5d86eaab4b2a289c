//! Parses the reassembled response byte stream into a structured
//! [`Response`].

use std::collections::HashMap;

use crate::error::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub proto: String,
    pub status_code: i32,
    pub headers: HashMap<String, String>,
    pub body: String,
}

/// Parses `bytes` (the reassembled response) into a [`Response`] plus the
/// raw text it was parsed from, for verbose rendering.
///
/// Treats `\r\n` and bare `\n` identically as line separators. Header
/// values are taken verbatim from immediately after the colon — no
/// leading-whitespace trimming — so `Content-Length: 5` parses to a value
/// of `" 5"`, matching the documented test vectors.
pub fn parse(bytes: &[u8]) -> Result<(Response, String), Error> {
    let text = String::from_utf8_lossy(bytes).into_owned();
    let mut lines = text.split('\n');

    let status_line = lines.next().ok_or(Error::EmptyResponse)?.trim_end_matches('\r');
    if status_line.is_empty() {
        return Err(Error::EmptyResponse);
    }

    let (proto, status_code) = parse_status_line(status_line)?;

    let mut headers = HashMap::new();

    for line in lines.by_ref() {
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            break;
        }

        if let Some((name, value)) = line.split_once(':') {
            headers.insert(name.to_string(), value.to_string());
        }
    }

    let body = lines.collect::<Vec<_>>().join("\n");

    Ok((
        Response {
            proto,
            status_code,
            headers,
            body,
        },
        text,
    ))
}

fn parse_status_line(line: &str) -> Result<(String, i32), Error> {
    let mut parts = line.splitn(3, ' ');
    let proto = parts.next().ok_or(Error::EmptyResponse)?.to_string();
    let status_code = parts
        .next()
        .and_then(|s| s.parse::<i32>().ok())
        .ok_or(Error::EmptyResponse)?;

    Ok((proto, status_code))
}
