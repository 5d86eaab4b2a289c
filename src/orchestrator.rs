//! Sequences handshake → send → receive → parse into a single request.

use std::net::{SocketAddr, ToSocketAddrs};

use log::info;

use crate::error::Error;
use crate::http::{self, Response};
use crate::options::RequestOptions;
use crate::request_url as url;
use crate::transport::{handshake, receiver, sender};

/// Runs a complete request/response cycle and returns the parsed response
/// plus its raw text (for verbose rendering).
pub fn run(options: &RequestOptions) -> Result<(Response, String), Error> {
    let target = url::parse(&options.url)?;

    let target_ip = resolve_ipv4(&target.host)?;

    let router_addr: SocketAddr = format!("{}:{}", options.router_host, options.router_port)
        .to_socket_addrs()
        .map_err(Error::AddressResolution)?
        .next()
        .ok_or_else(|| {
            Error::AddressResolution(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "router address resolved to no addresses",
            ))
        })?;

    info!("starting request: {} {}", options.method.as_str(), options.url);

    let established = handshake::perform(router_addr, target_ip, target.port)?;

    let request_bytes = http::builder::build(options, &target.path_and_query)?;

    let remote_ip = match established.remote.ip() {
        std::net::IpAddr::V4(v4) => v4,
        std::net::IpAddr::V6(_) => target_ip,
    };
    let remote_port = established.remote.port();

    let recovery_target = (target_ip, target.port);

    let outcome = sender::send_request(
        &established.socket,
        &request_bytes,
        remote_ip,
        remote_port,
        recovery_target,
    )?;

    let initial_frame = match outcome {
        sender::SendOutcome::Complete => None,
        sender::SendOutcome::ResponseStarted(frame) => Some(frame),
    };

    let reassembled =
        receiver::receive_response(&established.socket, initial_frame, recovery_target)?;

    let (response, raw_text) = http::response::parse(&reassembled)?;

    info!(
        "request complete: {} {} -> {}",
        options.method.as_str(),
        options.url,
        response.status_code
    );

    Ok((response, raw_text))
}

fn resolve_ipv4(host: &str) -> Result<std::net::Ipv4Addr, Error> {
    (host, 0u16)
        .to_socket_addrs()
        .map_err(Error::AddressResolution)?
        .find_map(|addr| match addr {
            SocketAddr::V4(v4) => Some(*v4.ip()),
            SocketAddr::V6(_) => None,
        })
        .ok_or_else(|| {
            Error::AddressResolution(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{host} did not resolve to an IPv4 address"),
            ))
        })
}
