//! Accepts out-of-order `DATA` frames, acknowledges each, and detects
//! completion by gap-free contiguity across a quiet period.

use std::net::{Ipv4Addr, UdpSocket};
use std::time::Duration;

use codec::{Frame, PacketType};
use log::debug;

use crate::error::Error;
use crate::transport::flow::RecvState;

/// Quiet interval: how long without a new `DATA` frame before completion
/// is considered possible.
const QUIET_INTERVAL: Duration = Duration::from_secs(6);

/// Receives and reassembles a response over `socket` (already connected to
/// the flow's negotiated remote endpoint). `initial_frame`, if present, is
/// a `DATA` frame the sender already pulled off the wire while finishing
/// its send loop. `recovery_target` is used the same way as in the sender:
/// to re-ACK an unexpected mid-flow `SYN-ACK`.
pub fn receive_response(
    socket: &UdpSocket,
    initial_frame: Option<Frame>,
    recovery_target: (Ipv4Addr, u16),
) -> Result<Vec<u8>, Error> {
    let local_addr = socket.local_addr().map_err(Error::SocketFailure)?;
    let local_ip = match local_addr.ip() {
        std::net::IpAddr::V4(v4) => v4,
        std::net::IpAddr::V6(_) => Ipv4Addr::UNSPECIFIED,
    };
    let local_port = local_addr.port();

    let mut state = RecvState::new();
    let mut first_received = false;

    if let Some(frame) = initial_frame {
        accept_data(&mut state, &frame, socket, local_ip, local_port)?;
        first_received = true;
    }

    socket
        .set_read_timeout(Some(QUIET_INTERVAL))
        .map_err(Error::SocketFailure)?;

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
                if !first_received {
                    continue;
                }

                if state.is_complete() {
                    break;
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
                debug!("peer re-sent SYN-ACK mid-receive, re-acknowledging handshake");
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
                accept_data(&mut state, &frame, socket, local_ip, local_port)?;
                first_received = true;
            }
            _ => {}
        }
    }

    Ok(state.reassemble())
}

fn accept_data(
    state: &mut RecvState,
    frame: &Frame,
    socket: &UdpSocket,
    local_ip: Ipv4Addr,
    local_port: u16,
) -> Result<(), Error> {
    debug!("received data frame seq={}", frame.sequence_number);
    state.insert(frame.sequence_number, frame.payload.clone());

    let ack = Frame::control(PacketType::Ack, frame.sequence_number, local_ip, local_port);
    socket.send(&ack.encode()).map_err(Error::SocketFailure)?;

    Ok(())
}
