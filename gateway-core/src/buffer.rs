//! `InputBuffer`: the FIFO byte queue owned exclusively by [`crate::demux::Demultiplexer`]
//! (spec.md §3, §4.2).

use tracing::warn;

/// A growable FIFO of bytes with cheap head-trim and a hard capacity cap.
///
/// Grounded on the teacher's `LinearBuffer`/`ArrayBuffer` split
/// (`ublox::linear_buffer`): here there is exactly one owner and one buffer
/// kind (spec.md's C2 owns "the" `InputBuffer`), so the trait-level
/// polymorphism collapses into a single `Vec<u8>`-backed type.
pub struct InputBuffer {
    data: Vec<u8>,
    hard_cap: usize,
}

impl InputBuffer {
    pub fn new(hard_cap: usize) -> Self {
        Self {
            data: Vec::new(),
            hard_cap,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Append `bytes`, then enforce `hard_cap` by dropping the oldest
    /// excess bytes with a logged warning (spec.md §4.2 "Backpressure / overflow").
    pub fn ingest(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
        if self.data.len() > self.hard_cap {
            let overflow = self.data.len() - self.hard_cap;
            warn!(
                overflow_bytes = overflow,
                hard_cap = self.hard_cap,
                "input buffer overflow, dropping oldest bytes"
            );
            self.data.drain(..overflow);
        }
    }

    /// Drop the first `n` bytes. Used both for pre-frame garbage trimming
    /// and for the single-byte garbage-drop policy (spec.md §4.2).
    pub fn drain_front(&mut self, n: usize) {
        let n = n.min(self.data.len());
        self.data.drain(..n);
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn overflow_drops_oldest_bytes() {
        let mut buf = InputBuffer::new(4);
        buf.ingest(&[1, 2, 3, 4]);
        buf.ingest(&[5, 6]);
        assert_eq!(buf.as_slice(), &[3, 4, 5, 6]);
    }

    #[test]
    fn drain_front_trims_garbage() {
        let mut buf = InputBuffer::new(16);
        buf.ingest(&[0xff, 0xff, 1, 2, 3]);
        buf.drain_front(2);
        assert_eq!(buf.as_slice(), &[1, 2, 3]);
    }
}
