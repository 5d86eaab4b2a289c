//! Fragments a request, blasts it out, and retransmits unacknowledged
//! frames until everything is acked or the retry budget is exhausted.

use std::net::{Ipv4Addr, UdpSocket};
use std::time::Duration;

use codec::{Frame, PacketType};
use log::{debug, warn};

use crate::error::Error;
use crate::transport::flow::SendState;

/// Read deadline per retransmission cycle.
const RETRANSMIT_TIMEOUT: Duration = Duration::from_secs(8);

/// Retry budget: one initial burst plus this many retransmission cycles.
const MAX_RETRIES: i32 = 10;

/// What ended the send loop.
pub enum SendOutcome {
    /// Every frame was acknowledged.
    Complete,
    /// A `DATA` frame arrived before we finished sending — the peer has
    /// started replying. It must be handed to the receiver so it isn't
    /// lost, since we already consumed it off the socket.
    ResponseStarted(Frame),
}

/// Sends `request_bytes` over `socket` (already connected to the flow's
/// negotiated remote endpoint) and drives retransmission to completion.
///
/// `peer_address`/`peer_port` are stamped into each `DATA` frame's header
/// (the remote endpoint of `socket`). `recovery_target` is the original
/// backend host/port from the URL, used only when re-acknowledging an
/// unexpected mid-flow `SYN-ACK`.
pub fn send_request(
    socket: &UdpSocket,
    request_bytes: &[u8],
    peer_address: Ipv4Addr,
    peer_port: u16,
    recovery_target: (Ipv4Addr, u16),
) -> Result<SendOutcome, Error> {
    let frames = codec::fragment(request_bytes, peer_address, peer_port);
    let mut state = SendState::new(frames);

    for frame in state.frames() {
        socket.send(&frame.encode()).map_err(Error::SocketFailure)?;
    }

    socket
        .set_read_timeout(Some(RETRANSMIT_TIMEOUT))
        .map_err(Error::SocketFailure)?;

    let mut retries_left = MAX_RETRIES;
    let mut buf = [0u8; codec::MAX_FRAME_LEN];

    loop {
        let n = match socket.recv(&mut buf) {
            Ok(n) => n,
            Err(e)
                if matches!(
                    e.kind(),
                    std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
                ) =>
            {
                if state.all_acked() {
                    return Ok(SendOutcome::Complete);
                }

                let unacked: Vec<u32> = state.unacked_frames().map(|f| f.sequence_number).collect();
                warn!("retransmit cycle: resending sequence numbers {unacked:?}");

                for frame in state.unacked_frames() {
                    socket.send(&frame.encode()).map_err(Error::SocketFailure)?;
                }

                retries_left -= 1;
                if retries_left < 0 {
                    return Err(Error::SendAborted);
                }

                continue;
            }
            Err(e) => return Err(Error::SocketFailure(e)),
        };

        let frame = match Frame::decode(&buf[..n]) {
            Ok(f) => f,
            Err(_) => continue,
        };

        match frame.packet_type {
            PacketType::SynAck => {
                debug!("peer re-sent SYN-ACK mid-send, re-acknowledging handshake");
                let (target_ip, http_port) = recovery_target;
                let ack = Frame::control(
                    PacketType::Ack,
                    codec::RECOVERY_ACK_SEQ,
                    target_ip,
                    http_port,
                );
                socket.send(&ack.encode()).map_err(Error::SocketFailure)?;
            }
            PacketType::Data => {
                debug!("peer started replying before send completed");
                return Ok(SendOutcome::ResponseStarted(frame));
            }
            PacketType::Ack => {
                if state.ack(frame.sequence_number) {
                    debug!("acked sequence {}", frame.sequence_number);
                }
            }
            _ => {}
        }
    }
}
