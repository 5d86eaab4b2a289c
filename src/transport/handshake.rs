//! The three-way handshake: `SYN` → `SYN-ACK` → `ACK`.
//!
//! State machine: `Init -> SynSent -> (SYN-ACK received) -> AckSent ->
//! Established`, with `SynSent -> SynSent` on each timeout up to
//! [`MAX_ATTEMPTS`].

use std::net::{Ipv4Addr, SocketAddr, UdpSocket};
use std::time::Duration;

use codec::{Frame, PacketType};
use log::{debug, info, warn};

use crate::error::Error;

/// Read deadline for a single handshake attempt.
const ATTEMPT_TIMEOUT: Duration = Duration::from_secs(10);

/// The original design left this uncapped; the enclosing orchestrator
/// imposes a hard limit so a dead relay fails the request instead of
/// hanging forever.
const MAX_ATTEMPTS: u32 = 5;

/// The outcome of a completed handshake: the socket to use for the rest of
/// the flow (already connected to the peer's negotiated endpoint) and the
/// port the relay negotiated for this flow.
pub struct Handshake {
    pub socket: UdpSocket,
    pub remote: SocketAddr,
    pub negotiated_port: u16,
}

/// Drives the handshake against `router_addr`. `target_ip`/`http_port` are
/// the address and port of the backend HTTP server this flow is ultimately
/// destined for, as parsed from the request URL; the relay needs them in
/// the `SYN`'s peer fields to route the flow.
pub fn perform(
    router_addr: SocketAddr,
    target_ip: Ipv4Addr,
    http_port: u16,
) -> Result<Handshake, Error> {
    for attempt in 1..=MAX_ATTEMPTS {
        debug!("handshake attempt {attempt}/{MAX_ATTEMPTS} to {router_addr}");

        match attempt_once(router_addr, target_ip, http_port) {
            Ok(handshake) => return Ok(handshake),
            Err(AttemptOutcome::TimedOut) => {
                warn!("handshake attempt {attempt} timed out, reissuing SYN");
                continue;
            }
            Err(AttemptOutcome::Error(e)) => return Err(e),
        }
    }

    Err(Error::HandshakeTimeout {
        attempts: MAX_ATTEMPTS,
    })
}

enum AttemptOutcome {
    TimedOut,
    Error(Error),
}

impl From<Error> for AttemptOutcome {
    fn from(value: Error) -> Self {
        Self::Error(value)
    }
}

fn attempt_once(
    router_addr: SocketAddr,
    target_ip: Ipv4Addr,
    http_port: u16,
) -> Result<Handshake, AttemptOutcome> {
    let syn_socket = UdpSocket::bind("0.0.0.0:0").map_err(Error::SocketFailure)?;
    syn_socket
        .connect(router_addr)
        .map_err(Error::SocketFailure)?;
    let local_addr = syn_socket.local_addr().map_err(Error::SocketFailure)?;

    let syn = Frame::control(PacketType::Syn, codec::SYN_SEQ, target_ip, http_port);
    syn_socket
        .send(&syn.encode())
        .map_err(Error::SocketFailure)?;

    // Port-switching: the relay keys its flow table by our source
    // address+port, so the listener must reuse the SYN socket's local port.
    drop(syn_socket);
    let listener = UdpSocket::bind(local_addr).map_err(Error::SocketFailure)?;
    listener
        .set_read_timeout(Some(ATTEMPT_TIMEOUT))
        .map_err(Error::SocketFailure)?;

    let mut buf = [0u8; codec::MAX_FRAME_LEN];
    loop {
        let (n, from) = match listener.recv_from(&mut buf) {
            Ok(it) => it,
            Err(e) if matches!(e.kind(), std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut) => {
                return Err(AttemptOutcome::TimedOut);
            }
            Err(e) => return Err(Error::SocketFailure(e).into()),
        };

        let frame = match Frame::decode(&buf[..n]) {
            Ok(f) => f,
            Err(_) => continue,
        };

        if frame.packet_type != PacketType::SynAck {
            continue;
        }

        let negotiated_port = frame.peer_port;
        drop(listener);

        let socket = UdpSocket::bind(local_addr).map_err(Error::SocketFailure)?;
        socket.connect(from).map_err(Error::SocketFailure)?;

        let ack = Frame::control(PacketType::Ack, codec::HANDSHAKE_ACK_SEQ, frame.peer_address, frame.peer_port);
        socket.send(&ack.encode()).map_err(Error::SocketFailure)?;

        info!("handshake established with {from}, negotiated port {negotiated_port}");

        return Ok(Handshake {
            socket,
            remote: from,
            negotiated_port,
        });
    }
}
