//! Per-flow bookkeeping for the sender and receiver.
//!
//! Sequence numbers within a flow are contiguous by construction, so both
//! sides index into dense, zero-based vectors rather than hash maps: the
//! completeness check and the "everything acked" scan are both a single
//! linear scan with no hashing, and memory is laid out for cache locality.

use codec::Frame;

/// Tracks the frames a sender has queued and which of them have been
/// acknowledged. The set of sequence numbers is fixed at construction time
/// (fragmentation happens once, up front), so a flat `Vec<bool>` indexed
/// from `base_seq` suffices.
pub struct SendState {
    base_seq: u32,
    frames: Vec<Frame>,
    acked: Vec<bool>,
}

impl SendState {
    pub fn new(frames: Vec<Frame>) -> Self {
        let base_seq = frames
            .first()
            .map(|f| f.sequence_number)
            .unwrap_or(codec::DATA_SEQ_START);
        let acked = vec![false; frames.len()];

        Self {
            base_seq,
            frames,
            acked,
        }
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    fn index_of(&self, seq: u32) -> Option<usize> {
        seq.checked_sub(self.base_seq)
            .map(|i| i as usize)
            .filter(|&i| i < self.frames.len())
    }

    /// Marks `seq` acknowledged. Returns `true` if this was a new
    /// acknowledgement (idempotence: re-acking never un-acks anything, and
    /// the caller can use the return value to decide whether to log).
    pub fn ack(&mut self, seq: u32) -> bool {
        match self.index_of(seq) {
            Some(i) if !self.acked[i] => {
                self.acked[i] = true;
                true
            }
            _ => false,
        }
    }

    pub fn all_acked(&self) -> bool {
        self.acked.iter().all(|&a| a)
    }

    /// Frames still awaiting acknowledgement, for retransmission.
    pub fn unacked_frames(&self) -> impl Iterator<Item = &Frame> {
        self.frames
            .iter()
            .zip(self.acked.iter())
            .filter(|(_, acked)| !**acked)
            .map(|(frame, _)| frame)
    }
}

/// Tracks inbound `DATA` payloads as they arrive, possibly out of order.
/// Unlike [`SendState`], the eventual count isn't known up front, so this
/// stays a sparse map keyed by sequence number.
#[derive(Default)]
pub struct RecvState {
    inbound: std::collections::HashMap<u32, bytes::Bytes>,
}

impl RecvState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, seq: u32, payload: bytes::Bytes) {
        self.inbound.insert(seq, payload);
    }

    pub fn len(&self) -> usize {
        self.inbound.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inbound.is_empty()
    }

    /// A response is complete iff the received sequence numbers form a
    /// gap-free run: `max - min + 1 == count`.
    pub fn is_complete(&self) -> bool {
        if self.inbound.is_empty() {
            return false;
        }

        let min = *self.inbound.keys().min().unwrap();
        let max = *self.inbound.keys().max().unwrap();
        (max - min + 1) as usize == self.inbound.len()
    }

    /// Concatenates payloads in ascending sequence order.
    pub fn reassemble(&self) -> Vec<u8> {
        let mut seqs: Vec<u32> = self.inbound.keys().copied().collect();
        seqs.sort_unstable();

        let mut out = Vec::new();
        for seq in seqs {
            out.extend_from_slice(&self.inbound[&seq]);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn data_frame(seq: u32, payload: &[u8]) -> Frame {
        Frame {
            packet_type: codec::PacketType::Data,
            sequence_number: seq,
            peer_address: Ipv4Addr::LOCALHOST,
            peer_port: 1234,
            payload: bytes::Bytes::copy_from_slice(payload),
        }
    }

    #[test]
    fn ack_is_idempotent() {
        let mut state = SendState::new(vec![data_frame(10, b"a"), data_frame(11, b"b")]);
        assert!(state.ack(10));
        assert!(!state.all_acked());
        assert!(!state.ack(10), "re-acking must not report a new ack");
        assert!(state.ack(11));
        assert!(state.all_acked());
    }

    #[test]
    fn unacked_frames_excludes_acked_entries() {
        let mut state = SendState::new(vec![data_frame(10, b"a"), data_frame(11, b"b")]);
        state.ack(10);
        let remaining: Vec<u32> = state.unacked_frames().map(|f| f.sequence_number).collect();
        assert_eq!(remaining, vec![11]);
    }

    #[test]
    fn completeness_requires_gap_free_contiguity() {
        let mut state = RecvState::new();
        assert!(!state.is_complete());

        state.insert(11, bytes::Bytes::from_static(b"b"));
        state.insert(10, bytes::Bytes::from_static(b"a"));
        assert!(!state.is_complete(), "seq 12 missing from {{10,11}}+{{13}}");

        state.insert(13, bytes::Bytes::from_static(b"d"));
        assert!(!state.is_complete());

        state.insert(12, bytes::Bytes::from_static(b"c"));
        assert!(state.is_complete());
    }

    #[test]
    fn reassembly_is_order_independent() {
        let mut in_order = RecvState::new();
        in_order.insert(10, bytes::Bytes::from_static(b"foo"));
        in_order.insert(11, bytes::Bytes::from_static(b"bar"));

        let mut reordered = RecvState::new();
        reordered.insert(11, bytes::Bytes::from_static(b"bar"));
        reordered.insert(10, bytes::Bytes::from_static(b"foo"));

        assert_eq!(in_order.reassemble(), reordered.reassemble());
        assert_eq!(in_order.reassemble(), b"foobar");
    }
}
