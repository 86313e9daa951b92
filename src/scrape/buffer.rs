//! Receive buffer with a scan cursor

/// Bytes received on one connection plus the position already searched
///
/// `scanned_offset` never exceeds the buffer length and never moves
/// backward until the buffer is cleared.
#[derive(Debug, Clone, Default)]
pub struct ReceiveBuffer {
    data: Vec<u8>,
    scanned_offset: usize,
}

impl ReceiveBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// First position the next parse pass must search from
    pub fn scanned_offset(&self) -> usize {
        self.scanned_offset
    }

    /// Records that everything before `pos` has been searched
    ///
    /// Clamped to the buffer length; a position behind the current cursor
    /// is ignored.
    pub fn settle(&mut self, pos: usize) {
        self.scanned_offset = self.scanned_offset.max(pos.min(self.data.len()));
    }

    /// Settles the cursor at the end minus `marker_len - 1` bytes
    ///
    /// A marker whose first bytes ended the previous receive is still
    /// found by the next pass.
    pub fn settle_with_margin(&mut self, marker_len: usize) {
        let margin = marker_len.saturating_sub(1);
        self.settle(self.data.len().saturating_sub(margin));
    }

    /// Empties the buffer and rewinds the cursor
    pub fn clear(&mut self) {
        self.data.clear();
        self.scanned_offset = 0;
    }
}
