//! Fixed-capacity sliding window used to bootstrap the tracker.
//!
//! Storage is allocated once in [`RingBuffer::new`]; pushing never grows it.

// ── Ring Buffer ─────────────────────────────────────────────────────────

/// A bounded circular buffer.
///
/// When full, pushing overwrites the oldest item. Length can never exceed the
/// capacity chosen at construction.
#[derive(Clone, Debug)]
pub struct RingBuffer<T> {
    buffer: Vec<Option<T>>,
    head: usize,
    len: usize,
}

impl<T: Clone> RingBuffer<T> {
    /// Create a ring buffer with the given capacity (at least 1).
    pub fn new(capacity: usize) -> Self {
        let cap = capacity.max(1);
        Self {
            buffer: vec![None; cap],
            head: 0,
            len: 0,
        }
    }

    /// Push an item, overwriting the oldest if full.
    pub fn push(&mut self, item: T) {
        self.buffer[self.head] = Some(item);
        self.head = (self.head + 1) % self.buffer.len();
        if self.len < self.buffer.len() {
            self.len += 1;
        }
    }

    /// Iterate over items in insertion order (oldest first).
    pub fn iter(&self) -> RingBufferIter<'_, T> {
        let start = if self.len < self.buffer.len() {
            0
        } else {
            self.head
        };
        RingBufferIter {
            buffer: &self.buffer,
            pos: start,
            remaining: self.len,
        }
    }

    /// Number of items currently in the buffer.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether the buffer holds `capacity()` items.
    pub fn is_full(&self) -> bool {
        self.len == self.buffer.len()
    }

    /// Maximum capacity.
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }
}

impl RingBuffer<f64> {
    /// Arithmetic mean and mean squared deviation (population variance) of
    /// the buffered samples. `(0.0, 0.0)` when empty.
    pub fn mean_and_variance(&self) -> (f64, f64) {
        if self.is_empty() {
            return (0.0, 0.0);
        }
        let n = self.len as f64;
        let mean = self.iter().sum::<f64>() / n;
        let variance = self.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        (mean, variance)
    }
}

/// Iterator over a RingBuffer.
pub struct RingBufferIter<'a, T> {
    buffer: &'a [Option<T>],
    pos: usize,
    remaining: usize,
}

impl<'a, T> Iterator for RingBufferIter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let item = self.buffer[self.pos].as_ref();
        self.pos = (self.pos + 1) % self.buffer.len();
        self.remaining -= 1;
        item
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T> ExactSizeIterator for RingBufferIter<'a, T> {}
