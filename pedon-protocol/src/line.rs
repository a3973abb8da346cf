//! Fixed-capacity line buffering shared by both serial drivers.
//!
//! A [`LineStack`] decouples byte-at-a-time serial ingestion from
//! line-oriented parsing: complete separator-terminated records queue up in
//! arrival order while at most one unterminated fragment accumulates at the
//! tail. Whole records can also be spliced in via [`LineStack::push`]
//! without disturbing that fragment.

/// Default record separator.
pub const DEFAULT_SEPARATOR: u8 = b'\n';

/// Fixed-capacity queue of separator-delimited records.
///
/// `C` is the raw backing size; two bytes are reserved so a full buffer can
/// still terminate its tail record, leaving `C - 2` usable. Overflow never
/// corrupts stored records: `ingest` drops the byte and `push` refuses the
/// record.
#[derive(Debug)]
pub struct LineStack<const C: usize> {
    buf: [u8; C],
    len: usize,
    separator: u8,
}

impl<const C: usize> LineStack<C> {
    /// Usable capacity in bytes.
    pub const CAPACITY: usize = C - 2;

    /// Create an empty stack with the default `\n` separator.
    pub const fn new() -> Self {
        Self::with_separator(DEFAULT_SEPARATOR)
    }

    /// Create an empty stack with a custom record separator.
    pub const fn with_separator(separator: u8) -> Self {
        Self {
            buf: [0; C],
            len: 0,
            separator,
        }
    }

    /// The record separator this stack splits on.
    pub fn separator(&self) -> u8 {
        self.separator
    }

    /// Number of bytes currently stored, records and tail fragment alike.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Drop everything, including any in-progress fragment.
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Append one streamed byte to the tail fragment.
    ///
    /// Silently dropped when the stack is full; capacity is the only
    /// backpressure on the serial side.
    pub fn ingest(&mut self, byte: u8) {
        if self.len < Self::CAPACITY {
            self.buf[self.len] = byte;
            self.len += 1;
        }
    }

    /// Splice a complete record in behind the last stored record.
    ///
    /// Trailing separator bytes in `content` are stripped and a single
    /// separator is appended in their place. Any unterminated tail fragment
    /// shifts right so it stays the newest data. Returns `false` without
    /// mutating anything when the result would not fit.
    pub fn push(&mut self, content: &[u8]) -> bool {
        let mut end = content.len();
        while end > 0 && content[end - 1] == self.separator {
            end -= 1;
        }
        let record = &content[..end];

        if self.len + record.len() + 1 > Self::CAPACITY {
            return false;
        }

        // Insert point: right after the last complete record.
        let at = match self.buf[..self.len].iter().rposition(|&b| b == self.separator) {
            Some(sep) => sep + 1,
            None => 0,
        };

        self.buf.copy_within(at..self.len, at + record.len() + 1);
        self.buf[at..at + record.len()].copy_from_slice(record);
        self.buf[at + record.len()] = self.separator;
        self.len += record.len() + 1;
        true
    }

    /// Remove the oldest complete record, copying it into `out`.
    ///
    /// Returns the number of bytes copied: the record length, capped at
    /// `out.len()` (the record is consumed in full either way, separator
    /// included). Returns 0 and leaves the stack untouched when no complete
    /// record is stored; an unterminated fragment alone never pops.
    pub fn pop(&mut self, out: &mut [u8]) -> usize {
        let end = match self.buf[..self.len].iter().position(|&b| b == self.separator) {
            Some(end) => end,
            None => return 0,
        };

        let copied = end.min(out.len());
        out[..copied].copy_from_slice(&self.buf[..copied]);

        self.buf.copy_within(end + 1..self.len, 0);
        self.len -= end + 1;
        copied
    }
}

impl<const C: usize> Default for LineStack<C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_push_pop_fifo_order() {
        let mut stack: LineStack<64> = LineStack::new();
        assert!(stack.push(b"first"));
        assert!(stack.push(b"second"));

        let mut out = [0u8; 16];
        let n = stack.pop(&mut out);
        assert_eq!(&out[..n], b"first");
        let n = stack.pop(&mut out);
        assert_eq!(&out[..n], b"second");
        assert_eq!(stack.pop(&mut out), 0);
        assert!(stack.is_empty());
    }

    #[test]
    fn test_ingest_builds_records() {
        let mut stack: LineStack<32> = LineStack::new();
        for &b in b"ab\ncd\n" {
            stack.ingest(b);
        }

        let mut out = [0u8; 8];
        let n = stack.pop(&mut out);
        assert_eq!(&out[..n], b"ab");
        let n = stack.pop(&mut out);
        assert_eq!(&out[..n], b"cd");
    }

    #[test]
    fn test_pop_leaves_unterminated_fragment() {
        let mut stack: LineStack<32> = LineStack::new();
        stack.ingest(b'x');
        stack.ingest(b'y');

        let mut out = [0u8; 8];
        assert_eq!(stack.pop(&mut out), 0);
        assert_eq!(stack.len(), 2);

        stack.ingest(b'\n');
        let n = stack.pop(&mut out);
        assert_eq!(&out[..n], b"xy");
    }

    #[test]
    fn test_push_splices_before_tail_fragment() {
        let mut stack: LineStack<64> = LineStack::new();
        stack.ingest(b'p');
        stack.ingest(b'a');
        assert!(stack.push(b"whole"));

        // Only the spliced record is complete so far.
        let mut out = [0u8; 16];
        let n = stack.pop(&mut out);
        assert_eq!(&out[..n], b"whole");
        assert_eq!(stack.pop(&mut out), 0);

        // Terminate the fragment; it pops after the spliced record did.
        stack.ingest(b'r');
        stack.ingest(b'\n');
        let n = stack.pop(&mut out);
        assert_eq!(&out[..n], b"par");
    }

    #[test]
    fn test_push_strips_trailing_separators() {
        let mut stack: LineStack<32> = LineStack::new();
        assert!(stack.push(b"cmd\n\n"));
        assert_eq!(stack.len(), 4); // "cmd" + one separator

        let mut out = [0u8; 8];
        let n = stack.pop(&mut out);
        assert_eq!(&out[..n], b"cmd");
    }

    #[test]
    fn test_push_rejects_overflow_without_mutation() {
        let mut stack: LineStack<16> = LineStack::new();
        assert!(stack.push(b"0123456789")); // 11 of 14 usable
        assert!(!stack.push(b"abc")); // would need 15
        assert_eq!(stack.len(), 11);

        let mut out = [0u8; 16];
        let n = stack.pop(&mut out);
        assert_eq!(&out[..n], b"0123456789");
    }

    #[test]
    fn test_push_exact_fit_boundary() {
        // Capacity 6: a 5-byte record plus separator exactly fills it.
        let mut stack: LineStack<8> = LineStack::new();
        assert!(stack.push(b"abcde"));

        let mut stack: LineStack<8> = LineStack::new();
        assert!(!stack.push(b"abcdef"));
        assert!(stack.is_empty());
    }

    #[test]
    fn test_ingest_drops_when_full() {
        let mut stack: LineStack<6> = LineStack::new();
        for &b in b"abcdef" {
            stack.ingest(b);
        }
        assert_eq!(stack.len(), LineStack::<6>::CAPACITY);
    }

    #[test]
    fn test_pop_truncates_to_out_capacity() {
        let mut stack: LineStack<32> = LineStack::new();
        assert!(stack.push(b"0123456789"));

        let mut out = [0u8; 4];
        let n = stack.pop(&mut out);
        assert_eq!(&out[..n], b"0123");
        // The record was consumed in full despite the short destination.
        assert_eq!(stack.pop(&mut out), 0);
    }

    #[test]
    fn test_custom_separator() {
        let mut stack: LineStack<32> = LineStack::with_separator(b'\r');
        assert_eq!(stack.separator(), b'\r');
        assert!(stack.push(b"one\r"));
        stack.ingest(b't');
        stack.ingest(b'w');
        stack.ingest(b'o');
        stack.ingest(b'\r');

        let mut out = [0u8; 8];
        let n = stack.pop(&mut out);
        assert_eq!(&out[..n], b"one");
        let n = stack.pop(&mut out);
        assert_eq!(&out[..n], b"two");
    }

    #[test]
    fn test_clear_drops_fragment_too() {
        let mut stack: LineStack<32> = LineStack::new();
        assert!(stack.push(b"line"));
        stack.ingest(b'f');
        stack.clear();
        assert!(stack.is_empty());

        let mut out = [0u8; 8];
        assert_eq!(stack.pop(&mut out), 0);
    }

    proptest! {
        /// Records come back out in the order they went in, no matter how
        /// an unterminated fragment rode along at the tail.
        #[test]
        fn prop_fifo_order(
            records in prop::collection::vec(
                prop::collection::vec(0x20u8..0x7f, 0..24),
                0..12,
            ),
            fragment in prop::collection::vec(0x20u8..0x7f, 0..8),
        ) {
            let mut stack: LineStack<512> = LineStack::new();
            for &b in &fragment {
                stack.ingest(b);
            }

            let mut accepted = std::vec::Vec::new();
            for record in &records {
                if stack.push(record) {
                    accepted.push(record.clone());
                }
            }

            let mut out = [0u8; 64];
            for expected in &accepted {
                let n = stack.pop(&mut out);
                prop_assert_eq!(&out[..n], expected.as_slice());
            }
            prop_assert_eq!(stack.pop(&mut out), 0);
            // The fragment is still there, still unterminated.
            prop_assert_eq!(stack.len(), fragment.len());
        }
    }
}
