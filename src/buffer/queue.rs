//! Single-producer / single-consumer queue for crossing between the control
//! thread and the audio thread.
//!
//! The in-thread [`CircularBuffer`](super::circular::CircularBuffer) needs
//! `&mut` access for both ends. When the two ends live on different threads the
//! producer may only advance the write index and the consumer only the read
//! index, which rules out eviction: an overwriting producer would have to move
//! the consumer's read index. The queue therefore always discards on overflow
//! and counts what it dropped so the control side can report it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use rtrb::{Consumer, Producer, RingBuffer};

/// Create a queue holding up to `capacity` elements.
///
/// Allocates once, here. Both halves are `Send` and can be moved to their
/// threads.
pub fn block_queue<T>(capacity: usize) -> (QueueProducer<T>, QueueConsumer<T>) {
    let (producer, consumer) = RingBuffer::new(capacity);
    let dropped = Arc::new(AtomicU64::new(0));
    (
        QueueProducer {
            inner: producer,
            dropped: Arc::clone(&dropped),
        },
        QueueConsumer {
            inner: consumer,
            dropped,
        },
    )
}

/// Writing half of a [`block_queue`].
pub struct QueueProducer<T> {
    inner: Producer<T>,
    dropped: Arc<AtomicU64>,
}

impl<T> QueueProducer<T> {
    /// Enqueue `value`. Returns false (and counts a drop) when full.
    #[inline]
    pub fn push(&mut self, value: T) -> bool {
        match self.inner.push(value) {
            Ok(()) => true,
            Err(_) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                false
            }
        }
    }

    /// Free slots as seen by the producer. May under-report while the consumer
    /// is mid-pop.
    #[inline]
    pub fn free(&self) -> usize {
        self.inner.slots()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.inner.is_full()
    }

    /// True once the consumer has been dropped.
    pub fn is_abandoned(&self) -> bool {
        self.inner.is_abandoned()
    }
}

/// Reading half of a [`block_queue`].
pub struct QueueConsumer<T> {
    inner: Consumer<T>,
    dropped: Arc<AtomicU64>,
}

impl<T> QueueConsumer<T> {
    /// Dequeue the oldest element.
    #[inline]
    pub fn pop(&mut self) -> Option<T> {
        self.inner.pop().ok()
    }

    /// Readable elements. Rounds down: an element still being written is not
    /// counted.
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.slots()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.inner.buffer().capacity()
    }

    /// Pushes rejected because the queue was full, since creation.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Drain into `out` until the queue is empty or `out` is full. Returns the
    /// number of elements written.
    pub fn pop_into(&mut self, out: &mut [T]) -> usize {
        let mut written = 0;
        for slot in out.iter_mut() {
            match self.inner.pop() {
                Ok(value) => {
                    *slot = value;
                    written += 1;
                }
                Err(_) => break,
            }
        }
        written
    }
}
