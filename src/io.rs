//! Local I/O collaborators: reading a POST body from disk and rendering
//! the final response to standard output. Neither touches the network.

use std::path::Path;

use crate::error::Error;
use crate::http::Response;

/// Reads the full contents of `path` for use as a POST body.
pub fn read_body_file(path: &Path) -> Result<Vec<u8>, Error> {
    std::fs::read(path)
        .map_err(|e| Error::BodySource(format!("could not read {}: {e}", path.display())))
}

/// Renders the response the way the CLI prints it: just the body normally,
/// or the full raw response text in verbose mode.
pub fn render(response: &Response, raw_text: &str, verbose: bool) -> String {
    if verbose {
        raw_text.to_string()
    } else {
        let mut body = response.body.clone();
        if !body.ends_with('\n') {
            body.push('\n');
        }
        body
    }
}
