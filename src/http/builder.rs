//! Formats the outgoing HTTP/1.0 request text.

use crate::error::Error;
use crate::io::read_body_file;
use crate::options::{Method, RequestOptions};

/// Builds the full request line, headers, and (for POST) body.
/// `path_and_query` is whatever the URL parser resolved (always starting
/// with `/`).
pub fn build(options: &RequestOptions, path_and_query: &str) -> Result<Vec<u8>, Error> {
    let mut request = format!(
        "{} {} HTTP/1.0\r\n",
        options.method.as_str(),
        path_and_query
    );

    let has_content_length = options
        .headers
        .iter()
        .any(|(k, _)| k.eq_ignore_ascii_case("content-length"));

    let body: Option<Vec<u8>> = match options.method {
        Method::Get => None,
        Method::Post => {
            if let Some(data) = &options.data {
                Some(data.clone().into_bytes())
            } else if let Some(path) = &options.file {
                Some(read_body_file(path)?)
            } else {
                None
            }
        }
    };

    for (name, value) in &options.headers {
        request.push_str(name);
        request.push_str(": ");
        request.push_str(value);
        request.push_str("\r\n");
    }

    if let Some(body) = &body {
        if !has_content_length {
            request.push_str("Content-Length: ");
            request.push_str(&body.len().to_string());
            request.push_str("\r\n");
        }
    }

    request.push_str("\r\n");

    let mut bytes = request.into_bytes();
    if let Some(body) = body {
        bytes.extend_from_slice(&body);
    }

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Method;

    fn base_options(method: Method) -> RequestOptions {
        RequestOptions {
            method,
            url: "http://host/path".to_string(),
            headers: Vec::new(),
            data: None,
            file: None,
            router_host: "127.0.0.1".to_string(),
            router_port: 9000,
            verbose: false,
        }
    }

    #[test]
    fn get_terminates_with_bare_crlf() {
        let opts = base_options(Method::Get);
        let bytes = build(&opts, "/path?q=1").unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text, "GET /path?q=1 HTTP/1.0\r\n\r\n");
    }

    #[test]
    fn post_without_data_or_file_terminates_with_bare_crlf() {
        let opts = base_options(Method::Post);
        let bytes = build(&opts, "/path").unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.ends_with("\r\n\r\n"));
        assert!(!text.contains("Content-Length"));
    }

    #[test]
    fn post_with_inline_data_injects_content_length() {
        let mut opts = base_options(Method::Post);
        opts.data = Some("hello".to_string());
        let bytes = build(&opts, "/path").unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("Content-Length: 5\r\n"));
        assert!(text.ends_with("\r\n\r\nhello"));
    }

    #[test]
    fn post_with_explicit_content_length_is_not_overridden() {
        let mut opts = base_options(Method::Post);
        opts.data = Some("hello".to_string());
        opts.headers.push(("Content-Length".to_string(), "999".to_string()));
        let bytes = build(&opts, "/path").unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("Content-Length: 999\r\n"));
        assert!(!text.contains("Content-Length: 5"));
        assert!(text.ends_with("\r\n\r\nhello"));
    }

    #[test]
    fn headers_are_rendered_regardless_of_insertion_order() {
        let mut opts = base_options(Method::Get);
        opts.headers.push(("X-B".to_string(), "2".to_string()));
        opts.headers.push(("X-A".to_string(), "1".to_string()));
        let bytes = build(&opts, "/path").unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("X-B: 2\r\n"));
        assert!(text.contains("X-A: 1\r\n"));
    }
}
