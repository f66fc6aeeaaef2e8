//! Push-based line splitting

/// LF byte; lines end here and nowhere else
const LF: u8 = b'\n';

/// Splits byte chunks into lines
///
/// Chunks may break anywhere, including inside a multi-byte character;
/// bytes are buffered until their line is complete. A trailing line
/// without LF is returned by [`LineSplitter::finish`].
#[derive(Debug, Default)]
pub struct LineSplitter {
    pending: Vec<u8>,
}

impl LineSplitter {
    /// Create an empty splitter
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a chunk, returning every line it completes
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);
        let mut lines = Vec::new();
        let mut start = 0;
        while let Some(offset) = self.pending[start..].iter().position(|&b| b == LF) {
            let end = start + offset;
            lines.push(String::from_utf8_lossy(&self.pending[start..end]).into_owned());
            start = end + 1;
        }
        self.pending.drain(..start);
        lines
    }

    /// Flush the unterminated trailing line, if any
    pub fn finish(self) -> Option<String> {
        (!self.pending.is_empty()).then(|| String::from_utf8_lossy(&self.pending).into_owned())
    }
}
