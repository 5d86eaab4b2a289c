//! The request-level error hierarchy.
//!
//! Every module (`url`, `http`, `transport`) raises its own narrow error
//! type; this enum is where they all get folded into one set of kinds so
//! `main` only has to match once.

use std::fmt;

#[derive(Debug)]
pub enum Error {
    InvalidUrl(String),
    MissingProtocol,
    UnsupportedProtocol(String),
    AddressResolution(std::io::Error),
    SocketFailure(std::io::Error),
    HandshakeTimeout { attempts: u32 },
    SendAborted,
    EmptyResponse,
    Config(String),
    BodySource(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidUrl(url) => write!(f, "invalid url: {url}"),
            Self::MissingProtocol => write!(f, "missing protocol: no scheme and no explicit port"),
            Self::UnsupportedProtocol(scheme) => write!(f, "unsupported protocol: {scheme}"),
            Self::AddressResolution(e) => write!(f, "could not resolve router address: {e}"),
            Self::SocketFailure(e) => write!(f, "socket operation failed: {e}"),
            Self::HandshakeTimeout { attempts } => {
                write!(f, "handshake timed out after {attempts} attempt(s)")
            }
            Self::SendAborted => write!(f, "retransmission budget exhausted with frames unacked"),
            Self::EmptyResponse => write!(f, "response had no status line"),
            Self::Config(msg) => write!(f, "configuration error: {msg}"),
            Self::BodySource(msg) => write!(f, "request body error: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<toml::de::Error> for Error {
    fn from(value: toml::de::Error) -> Self {
        Self::Config(value.to_string())
    }
}
