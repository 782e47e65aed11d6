//! Output Stream Digest
//!
//! SHA-256 over the exact bytes written to the primary sink. Two engines fed
//! the same decoder stream must end with the same digest.

use sha2::{Sha256, Digest};

/// Digest output type (256 bits / 32 bytes)
pub type StreamDigest = [u8; 32];

/// Domain separator for the JSON-lines output stream.
pub const OUTPUT_DOMAIN: &[u8] = b"REPLAY_EVENTS_JSONL_V1";

/// Running digest of emitted lines.
///
/// Order of updates is significant.
#[derive(Clone)]
pub struct OutputDigest {
    hasher: Sha256,
    lines: u64,
}

impl OutputDigest {
    /// Create a digest with a domain separator.
    pub fn new(domain: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(domain);
        Self { hasher, lines: 0 }
    }

    /// Digest for the JSON-lines output stream.
    pub fn for_output() -> Self {
        Self::new(OUTPUT_DOMAIN)
    }

    /// Feed one serialized line (without its terminator).
    #[inline]
    pub fn update_line(&mut self, line: &[u8]) {
        self.hasher.update(line);
        self.hasher.update(b"\n");
        self.lines += 1;
    }

    /// Number of lines fed so far.
    pub fn lines(&self) -> u64 {
        self.lines
    }

    /// Finalize and return the digest.
    pub fn finalize(self) -> StreamDigest {
        self.hasher.finalize().into()
    }
}

impl Default for OutputDigest {
    fn default() -> Self {
        Self::for_output()
    }
}

impl std::fmt::Debug for OutputDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputDigest").field("lines", &self.lines).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_determinism() {
        let make = || {
            let mut d = OutputDigest::for_output();
            d.update_line(br#"{"time":0,"type":"draft_start"}"#);
            d.update_line(br#"{"time":1,"type":"interval"}"#);
            d.finalize()
        };
        assert_eq!(make(), make());
    }

    #[test]
    fn test_line_order_matters() {
        let mut a = OutputDigest::for_output();
        a.update_line(b"a");
        a.update_line(b"b");
        let mut b = OutputDigest::for_output();
        b.update_line(b"b");
        b.update_line(b"a");
        assert_ne!(a.finalize(), b.finalize());
    }

    #[test]
    fn test_line_boundaries_matter() {
        let mut a = OutputDigest::for_output();
        a.update_line(b"ab");
        let mut b = OutputDigest::for_output();
        b.update_line(b"a");
        b.update_line(b"b");
        assert_eq!(a.lines(), 1);
        assert_eq!(b.lines(), 2);
        assert_ne!(a.finalize(), b.finalize());
    }

    #[test]
    fn test_domain_separation() {
        let mut a = OutputDigest::new(b"A");
        a.update_line(b"x");
        let mut b = OutputDigest::new(b"B");
        b.update_line(b"x");
        assert_ne!(a.finalize(), b.finalize());
    }
}
