use std::iter::FusedIterator;
use std::marker::PhantomData;

/*
Circular Buffer
===============

A fixed-capacity FIFO over a plain array. Nothing is allocated after
construction; every operation is O(1) except `make_contiguous`, which is O(N)
and still allocation-free.

Vocabulary
----------

  head      Index of the oldest readable element (the read index).

  tail      Index of the slot the next push writes to (the write index).

  len       Number of readable elements, 0..=N.

  policy    What happens when a push arrives while len == N.


Layout
------

        head               tail
         ↓                  ↓
    [ .  3  4  5  6  .  .  .  ]      len = 4, N = 8

After wrapping, readable data straddles the end of the array:

             tail      head
              ↓         ↓
    [ 9  10  .  .  .  .  7  8 ]      len = 4

Indices advance by one and reset to zero when they reach N. No masking is
used, so any N works; there is no power-of-two requirement.


Overflow Policies
-----------------

  Discard     The incoming element is rejected. `push` returns false and the
              buffer is untouched. Use for queues where old data matters more
              than new (command streams).

  Overwrite   The oldest element is evicted (head advances) and the new one is
              stored. `push` always returns true. Use for history windows where
              only the latest N values matter (metering, delay taps).

The policy is a type parameter with an associated constant, so the branch in
`push` is resolved at compile time and the hot path carries no runtime policy
check.
*/

mod sealed {
    pub trait Sealed {}
}

/// Behaviour of [`CircularBuffer::push`] when the buffer is full.
pub trait OverflowPolicy: sealed::Sealed + Send + Sync + 'static {
    /// True when a full push evicts the oldest element.
    const EVICTS: bool;
}

/// Reject pushes while full.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Discard;

/// Evict the oldest element to make room.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Overwrite;

impl sealed::Sealed for Discard {}
impl sealed::Sealed for Overwrite {}

impl OverflowPolicy for Discard {
    const EVICTS: bool = false;
}

impl OverflowPolicy for Overwrite {
    const EVICTS: bool = true;
}

/// Fixed-capacity ring buffer with a compile-time overflow policy.
///
/// `N` must be non-zero; a zero capacity fails to compile at the first
/// constructor call.
#[derive(Clone)]
pub struct CircularBuffer<T, const N: usize, P: OverflowPolicy = Overwrite> {
    storage: [T; N],
    head: usize,
    tail: usize,
    len: usize,
    _policy: PhantomData<P>,
}

impl<T: Copy + Default, const N: usize, P: OverflowPolicy> CircularBuffer<T, N, P> {
    const NON_ZERO: () = assert!(N > 0, "CircularBuffer capacity must be non-zero");

    /// Empty buffer with storage pre-filled with `T::default()`.
    pub fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::NON_ZERO;
        Self {
            storage: [T::default(); N],
            head: 0,
            tail: 0,
            len: 0,
            _policy: PhantomData,
        }
    }

    /// Full buffer holding `N` copies of `value`.
    pub fn filled(value: T) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::NON_ZERO;
        Self {
            storage: [value; N],
            head: 0,
            tail: 0,
            len: N,
            _policy: PhantomData,
        }
    }

    /// Buffer built by pushing every element of `values` in order, applying
    /// the overflow policy as it goes.
    pub fn from_slice(values: &[T]) -> Self {
        let mut buffer = Self::new();
        buffer.extend(values.iter().copied());
        buffer
    }

    /// Append `value` at the tail.
    ///
    /// Returns false only under [`Discard`] when the buffer is full.
    #[inline]
    pub fn push(&mut self, value: T) -> bool {
        if self.len == N {
            if !P::EVICTS {
                return false;
            }
            self.advance_head();
        }
        self.storage[self.tail] = value;
        self.tail += 1;
        if self.tail == N {
            self.tail = 0;
        }
        self.len += 1;
        true
    }

    /// Remove and return the oldest element.
    #[inline]
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        let value = self.storage[self.head];
        self.advance_head();
        Some(value)
    }

    /// Read the element `offset` positions after the oldest without removing it.
    #[inline]
    pub fn peek(&self, offset: usize) -> Option<T> {
        if offset >= self.len {
            return None;
        }
        Some(self.storage[self.physical(offset)])
    }

    /// Oldest element.
    #[inline]
    pub fn front(&self) -> Option<&T> {
        if self.len == 0 {
            None
        } else {
            Some(&self.storage[self.head])
        }
    }

    /// Newest element.
    #[inline]
    pub fn back(&self) -> Option<&T> {
        if self.len == 0 {
            None
        } else {
            Some(&self.storage[self.physical(self.len - 1)])
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        N
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.len == N
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Forget all elements. Storage is left as is.
    #[inline]
    pub fn clear(&mut self) {
        self.head = 0;
        self.tail = 0;
        self.len = 0;
    }

    /// Iterate oldest → newest.
    pub fn iter(&self) -> Iter<'_, T, N, P> {
        Iter {
            buffer: self,
            front: 0,
            back: self.len,
        }
    }

    /// Readable contents as two slices, oldest first.
    ///
    /// The second slice is empty unless the contents wrap around the end of
    /// the storage.
    pub fn as_slices(&self) -> (&[T], &[T]) {
        if self.len == 0 {
            return (&[], &[]);
        }
        let first_end = self.head + self.len;
        if first_end <= N {
            (&self.storage[self.head..first_end], &[])
        } else {
            (&self.storage[self.head..], &self.storage[..first_end - N])
        }
    }

    /// Rotate storage so the contents start at index 0 and return them as one
    /// mutable slice.
    pub fn make_contiguous(&mut self) -> &mut [T] {
        if self.head != 0 {
            self.storage.rotate_left(self.head);
            self.head = 0;
            self.tail = if self.len == N { 0 } else { self.len };
        }
        &mut self.storage[..self.len]
    }

    /// Raw storage in physical order.
    ///
    /// Matches logical order only when `head` is zero, which holds for a
    /// buffer that was cleared and then refilled with exactly `N` pushes.
    #[inline]
    pub(crate) fn storage(&self) -> &[T; N] {
        &self.storage
    }

    #[inline]
    pub(crate) fn storage_mut(&mut self) -> &mut [T; N] {
        &mut self.storage
    }

    #[inline]
    pub(crate) fn is_aligned(&self) -> bool {
        self.head == 0
    }

    #[inline]
    fn advance_head(&mut self) {
        self.head += 1;
        if self.head == N {
            self.head = 0;
        }
        self.len -= 1;
    }

    #[inline]
    fn physical(&self, offset: usize) -> usize {
        // head < N and offset < N, so one subtraction is enough
        let index = self.head + offset;
        if index >= N {
            index - N
        } else {
            index
        }
    }
}

impl<T: Copy + Default, const N: usize, P: OverflowPolicy> Default for CircularBuffer<T, N, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy + Default, const N: usize, P: OverflowPolicy> Extend<T> for CircularBuffer<T, N, P> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.push(value);
        }
    }
}

impl<T, const N: usize, P> std::fmt::Debug for CircularBuffer<T, N, P>
where
    T: Copy + Default + std::fmt::Debug,
    P: OverflowPolicy,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'a, T: Copy + Default, const N: usize, P: OverflowPolicy> IntoIterator
    for &'a CircularBuffer<T, N, P>
{
    type Item = T;
    type IntoIter = Iter<'a, T, N, P>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over a [`CircularBuffer`], oldest → newest.
pub struct Iter<'a, T, const N: usize, P: OverflowPolicy> {
    buffer: &'a CircularBuffer<T, N, P>,
    front: usize,
    back: usize,
}

impl<T: Copy + Default, const N: usize, P: OverflowPolicy> Iterator for Iter<'_, T, N, P> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.front == self.back {
            return None;
        }
        let value = self.buffer.storage[self.buffer.physical(self.front)];
        self.front += 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }
}

impl<T: Copy + Default, const N: usize, P: OverflowPolicy> DoubleEndedIterator
    for Iter<'_, T, N, P>
{
    fn next_back(&mut self) -> Option<T> {
        if self.front == self.back {
            return None;
        }
        self.back -= 1;
        Some(self.buffer.storage[self.buffer.physical(self.back)])
    }
}

impl<T: Copy + Default, const N: usize, P: OverflowPolicy> ExactSizeIterator
    for Iter<'_, T, N, P>
{
}

impl<T: Copy + Default, const N: usize, P: OverflowPolicy> FusedIterator for Iter<'_, T, N, P> {}
