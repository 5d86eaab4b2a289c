//! Minimal URL handling for the request orchestrator.
//!
//! The wire format has no room for anything but an IPv4 host, so parsing
//! stops at extracting host, port, path and query — no userinfo, no
//! fragments, no IPv6. Structural parsing is delegated to the `url` crate;
//! this module only decides, ahead of that, whether a scheme or an explicit
//! port was present at all, since that distinction drives `MissingProtocol`
//! vs `UnsupportedProtocol`.

use crate::error::Error;

const DEFAULT_HTTP_PORT: u16 = 80;

/// A request target resolved down to what the transport layer needs.
#[derive(Debug, Clone)]
pub struct RequestUrl {
    pub host: String,
    pub port: u16,
    /// Path plus `?query`, e.g. `/path?q=1`. Always starts with `/`.
    pub path_and_query: String,
}

/// Parses `raw` into host, port, and path-and-query:
/// - no scheme and no explicit port → [`Error::MissingProtocol`]
/// - a scheme is present and it isn't `http` → [`Error::UnsupportedProtocol`]
/// - otherwise the scheme is treated as `http` (default port 80, or the
///   explicit port if one was given)
pub fn parse(raw: &str) -> Result<RequestUrl, Error> {
    let has_scheme = raw.contains("://");

    if !has_scheme {
        let authority_end = raw.find(['/', '?']).unwrap_or(raw.len());
        let authority = &raw[..authority_end];
        let has_explicit_port = authority
            .rsplit_once(':')
            .is_some_and(|(_, port)| !port.is_empty() && port.chars().all(|c| c.is_ascii_digit()));

        if !has_explicit_port {
            return Err(Error::MissingProtocol);
        }

        let with_scheme = format!("http://{raw}");
        return parse_structured(&with_scheme, raw);
    }

    let scheme = raw.split("://").next().unwrap_or_default();
    if !scheme.eq_ignore_ascii_case("http") {
        return Err(Error::UnsupportedProtocol(scheme.to_string()));
    }

    parse_structured(raw, raw)
}

fn parse_structured(absolute: &str, original: &str) -> Result<RequestUrl, Error> {
    let parsed = url::Url::parse(absolute).map_err(|_| Error::InvalidUrl(original.to_string()))?;

    let host = parsed
        .host_str()
        .ok_or_else(|| Error::InvalidUrl(original.to_string()))?
        .to_string();

    let port = parsed.port().unwrap_or(DEFAULT_HTTP_PORT);

    let mut path_and_query = parsed.path().to_string();
    if let Some(query) = parsed.query() {
        path_and_query.push('?');
        path_and_query.push_str(query);
    }

    Ok(RequestUrl {
        host,
        port,
        path_and_query,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheme_and_path_and_query() {
        let url = parse("http://host/path?q=1").unwrap();
        assert_eq!(url.host, "host");
        assert_eq!(url.port, 80);
        assert_eq!(url.path_and_query, "/path?q=1");
    }

    #[test]
    fn explicit_port_without_scheme() {
        let url = parse("host:8080/path").unwrap();
        assert_eq!(url.host, "host");
        assert_eq!(url.port, 8080);
        assert_eq!(url.path_and_query, "/path");
    }

    #[test]
    fn missing_protocol_when_no_scheme_and_no_port() {
        match parse("host/path") {
            Err(Error::MissingProtocol) => {}
            other => panic!("expected MissingProtocol, got {other:?}"),
        }
    }

    #[test]
    fn unsupported_protocol_when_scheme_is_not_http() {
        match parse("https://host/path") {
            Err(Error::UnsupportedProtocol(scheme)) => assert_eq!(scheme, "https"),
            other => panic!("expected UnsupportedProtocol, got {other:?}"),
        }
    }

    #[test]
    fn bare_host_with_no_path_defaults_to_root() {
        let url = parse("http://host").unwrap();
        assert_eq!(url.path_and_query, "/");
    }
}
