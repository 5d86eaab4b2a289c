//! Argument parsing: subcommands, flags, and their translation into a
//! [`RequestOptions`] the orchestrator can run.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::error::Error;
use crate::options::{Method, RequestOptions};

#[derive(Parser, Debug)]
#[command(
    name = "kurl",
    about = "An HTTP/1.0 client over a reliable-datagram relay protocol",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Path to a configuration file providing router/header/log defaults.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the relay's host (defaults come from the config file, then
    /// `127.0.0.1`).
    #[arg(long, global = true)]
    pub router_host: Option<String>,

    /// Override the relay's UDP port.
    #[arg(long, global = true)]
    pub router_port: Option<u16>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Issue a GET request.
    Get(GetArgs),
    /// Issue a POST request.
    Post(PostArgs),
}

#[derive(clap::Args, Debug)]
pub struct GetArgs {
    pub url: String,

    /// Print the full response (protocol, status, headers) instead of just
    /// the body.
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Repeatable `name:value` header.
    #[arg(short = 'h', long = "header", value_name = "k:v")]
    pub headers: Vec<String>,
}

#[derive(clap::Args, Debug)]
pub struct PostArgs {
    pub url: String,

    #[arg(short = 'v', long)]
    pub verbose: bool,

    #[arg(short = 'h', long = "header", value_name = "k:v")]
    pub headers: Vec<String>,

    /// Inline request body. Mutually exclusive with `-f`.
    #[arg(short = 'd', long, conflicts_with = "file")]
    pub data: Option<String>,

    /// Request body read from a file. Mutually exclusive with `-d`.
    #[arg(short = 'f', long, conflicts_with = "data")]
    pub file: Option<PathBuf>,
}

/// Merges the parsed CLI with the loaded config into a [`RequestOptions`].
/// CLI flags always win over config defaults.
pub fn into_options(cli: Cli, config: &Config) -> Result<RequestOptions, Error> {
    let router_host = cli.router_host.unwrap_or_else(|| config.router.host.clone());
    let router_port = cli.router_port.unwrap_or(config.router.port);

    let (method, url, verbose, raw_headers, data, file) = match cli.command {
        Command::Get(args) => (Method::Get, args.url, args.verbose, args.headers, None, None),
        Command::Post(args) => (
            Method::Post,
            args.url,
            args.verbose,
            args.headers,
            args.data,
            args.file,
        ),
    };

    let mut headers: Vec<(String, String)> = config
        .default_headers
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    for raw in raw_headers {
        let (name, value) = parse_header(&raw)?;
        headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(&name));
        headers.push((name, value));
    }

    Ok(RequestOptions {
        method,
        url,
        headers,
        data,
        file,
        router_host,
        router_port,
        verbose,
    })
}

fn parse_header(raw: &str) -> Result<(String, String), Error> {
    raw.split_once(':')
        .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
        .ok_or_else(|| Error::InvalidUrl(format!("malformed header, expected name:value: {raw}")))
}
