//! Wire codec for the reliable-datagram frame protocol.
//!
//! A frame is a single UDP datagram with a fixed 11-byte header followed by
//! up to 1013 bytes of payload (1024 bytes total). The header carries a
//! packet type, a sequence number, and the address/port of the peer the
//! frame concerns — for `SYN`/`SYN-ACK` this is the negotiated endpoint of
//! the flow, for `DATA`/`ACK` it mirrors the socket's own remote endpoint.
//!
//! ```
//! use kurl_codec::{Frame, PacketType};
//! use std::net::Ipv4Addr;
//!
//! let frame = Frame {
//!     packet_type: PacketType::Syn,
//!     sequence_number: 1,
//!     peer_address: Ipv4Addr::new(127, 0, 0, 1),
//!     peer_port: 8080,
//!     payload: b"0"[..].into(),
//! };
//!
//! let bytes = frame.encode();
//! let decoded = Frame::decode(&bytes).unwrap();
//! assert_eq!(decoded.sequence_number, 1);
//! ```

use std::net::Ipv4Addr;

use bytes::{BufMut, Bytes, BytesMut};

/// Header size in bytes: 1 (type) + 4 (sequence) + 4 (address) + 2 (port).
pub const HEADER_LEN: usize = 11;

/// Largest datagram this protocol will put on the wire.
pub const MAX_FRAME_LEN: usize = 1024;

/// Largest payload a single frame can carry.
pub const MAX_PAYLOAD_LEN: usize = MAX_FRAME_LEN - HEADER_LEN;

/// Sequence number reserved for the handshake `SYN`.
pub const SYN_SEQ: u32 = 1;

/// Sequence number reserved for the handshake `ACK`.
pub const HANDSHAKE_ACK_SEQ: u32 = 2;

/// First sequence number used for request/response `DATA` frames.
pub const DATA_SEQ_START: u32 = 10;

/// Sequence number used when re-acknowledging an unexpected mid-flow
/// `SYN-ACK`. Collides by design with [`DATA_SEQ_START`] — see the design
/// notes on recovery-ACK numbering.
pub const RECOVERY_ACK_SEQ: u32 = 10;

#[derive(Debug)]
pub enum Error {
    /// Fewer than [`HEADER_LEN`] bytes were presented to [`Frame::decode`].
    Truncated { len: usize },
    /// The first byte did not match any known [`PacketType`].
    UnknownPacketType(u8),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Truncated { len } => {
                write!(f, "frame too short to hold a header: {len} < {HEADER_LEN}")
            }
            Self::UnknownPacketType(b) => write!(f, "unknown packet type: {b}"),
        }
    }
}

impl std::error::Error for Error {}

/// The six packet types the relay and its peers exchange.
///
/// `FIN` and `NACK` are reserved: this client never sends them and treats
/// them as opaque "ignore" frames on receipt, same as any other unexpected
/// type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PacketType {
    Ack = 0,
    Syn = 1,
    Fin = 2,
    Nack = 3,
    SynAck = 4,
    Data = 5,
}

impl PacketType {
    pub const fn code(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for PacketType {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => Self::Ack,
            1 => Self::Syn,
            2 => Self::Fin,
            3 => Self::Nack,
            4 => Self::SynAck,
            5 => Self::Data,
            other => return Err(Error::UnknownPacketType(other)),
        })
    }
}

/// A decoded or to-be-encoded frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub packet_type: PacketType,
    pub sequence_number: u32,
    pub peer_address: Ipv4Addr,
    pub peer_port: u16,
    pub payload: Bytes,
}

impl Frame {
    /// Encodes `self` into exactly `HEADER_LEN + payload.len()` bytes.
    ///
    /// Does not validate payload length; callers that fragment a request
    /// into [`MAX_PAYLOAD_LEN`]-sized chunks never exceed it, and control
    /// frames (`SYN`/`ACK`/`SYN-ACK`) carry a single byte.
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(HEADER_LEN + self.payload.len());
        buf.put_u8(self.packet_type.code());
        buf.put_u32(self.sequence_number);
        buf.put_slice(&self.peer_address.octets());
        buf.put_u16(self.peer_port);
        buf.put_slice(&self.payload);
        buf.freeze()
    }

    /// Decodes the first `bytes.len()` bytes of a datagram.
    ///
    /// Infallible for any input of at least [`HEADER_LEN`] bytes; the
    /// payload is whatever remains after the header, verbatim.
    pub fn decode(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() < HEADER_LEN {
            return Err(Error::Truncated { len: bytes.len() });
        }

        let packet_type = PacketType::try_from(bytes[0])?;
        let sequence_number = u32::from_be_bytes(bytes[1..5].try_into().unwrap());
        let peer_address = Ipv4Addr::new(bytes[5], bytes[6], bytes[7], bytes[8]);
        let peer_port = u16::from_be_bytes(bytes[9..11].try_into().unwrap());
        let payload = Bytes::copy_from_slice(&bytes[HEADER_LEN..]);

        Ok(Self {
            packet_type,
            sequence_number,
            peer_address,
            peer_port,
            payload,
        })
    }

    /// Builds a control frame (`SYN`, handshake `ACK`, data `ACK`, recovery
    /// `ACK`) whose payload is the single byte `"0"`.
    pub fn control(
        packet_type: PacketType,
        sequence_number: u32,
        peer_address: Ipv4Addr,
        peer_port: u16,
    ) -> Self {
        Self {
            packet_type,
            sequence_number,
            peer_address,
            peer_port,
            payload: Bytes::from_static(b"0"),
        }
    }
}

/// Splits `bytes` into frames no larger than [`MAX_PAYLOAD_LEN`], assigning
/// sequence numbers starting at [`DATA_SEQ_START`] and incrementing by one
/// per chunk. An empty input still yields a single (empty-payload) frame,
/// since a response must always carry at least one `DATA` frame to be
/// acknowledged.
pub fn fragment(bytes: &[u8], peer_address: Ipv4Addr, peer_port: u16) -> Vec<Frame> {
    if bytes.is_empty() {
        return vec![Frame {
            packet_type: PacketType::Data,
            sequence_number: DATA_SEQ_START,
            peer_address,
            peer_port,
            payload: Bytes::new(),
        }];
    }

    bytes
        .chunks(MAX_PAYLOAD_LEN)
        .enumerate()
        .map(|(i, chunk)| Frame {
            packet_type: PacketType::Data,
            sequence_number: DATA_SEQ_START + i as u32,
            peer_address,
            peer_port,
            payload: Bytes::copy_from_slice(chunk),
        })
        .collect()
}
