//! Byte ring buffer between the decoder and the device callback.
//!
//! Single producer (the main thread, transferring decoded samples) and
//! single consumer (the device callback thread). The ordinary hand-off
//! is coordinated by one atomic byte count; each side additionally holds
//! its own mutex around the actual copy, so producer and consumer never
//! contend with each other except during [`RingBuffer::flush`].
//!
//! Capacity accounting is deliberately pessimistic on both sides: while
//! the producer holds its lock the write capacity can only grow (the
//! consumer can only free space), and symmetrically for the reader. The
//! count is increased only *after* a write completes and decreased only
//! *after* a read completes, with acquire/release ordering, so the
//! counterparty always sees the bytes before it sees the capacity
//! change.

use std::cell::UnsafeCell;
use std::ptr;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use crate::error::{AudioError, Result};

/// A bounded single-producer/single-consumer byte queue.
///
/// All operations are byte-granular; callers are responsible for keeping
/// reads and writes aligned to whole samples.
pub struct RingBuffer {
    /// Backing storage. Byte-level `UnsafeCell`s let the two sides copy
    /// into disjoint regions concurrently without fabricating aliasing
    /// `&mut` references to the whole buffer.
    storage: Box<[UnsafeCell<u8>]>,
    /// Bytes currently readable. The only cross-thread coordination on
    /// the ordinary path.
    count: AtomicUsize,
    /// Read cursor, owned by the consumer side.
    read_head: Mutex<usize>,
    /// Write cursor, owned by the producer side.
    write_head: Mutex<usize>,
}

// SAFETY: access to `storage` follows the SPSC protocol: the producer
// only touches the region beyond the readable count (under `write_head`'s
// lock), the consumer only touches the readable region (under
// `read_head`'s lock), and the regions are kept disjoint by `count`.
unsafe impl Send for RingBuffer {}
unsafe impl Sync for RingBuffer {}

impl RingBuffer {
    /// Creates a ring buffer able to hold `capacity` bytes.
    ///
    /// `capacity` must be non-zero; the buffer never grows.
    pub fn new(capacity: usize) -> Self {
        debug_assert!(capacity > 0);

        let mut storage = Vec::with_capacity(capacity);
        storage.resize_with(capacity, || UnsafeCell::new(0));

        RingBuffer {
            storage: storage.into_boxed_slice(),
            count: AtomicUsize::new(0),
            read_head: Mutex::new(0),
            write_head: Mutex::new(0),
        }
    }

    /// Total capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// Bytes currently available to read. Pessimistic for the consumer:
    /// the producer can only increase it.
    pub fn read_capacity(&self) -> usize {
        self.count.load(Ordering::Acquire)
    }

    /// Bytes currently available to write. Pessimistic for the
    /// producer: the consumer can only increase it.
    pub fn write_capacity(&self) -> usize {
        self.capacity() - self.read_capacity()
    }

    /// Copies all of `src` into the buffer, returning the byte count
    /// written.
    ///
    /// # Errors
    ///
    /// Returns an internal error if `src` exceeds the current write
    /// capacity. Callers must size their writes with
    /// [`RingBuffer::write_capacity`] first; a partial write is never
    /// performed silently.
    pub fn write(&self, src: &[u8]) -> Result<usize> {
        if src.is_empty() {
            return Ok(0);
        }

        // Holding the write lock pins the write cursor and keeps flush
        // out; the write capacity can only go up from here.
        let mut head = self.write_head.lock();

        if self.write_capacity() < src.len() {
            return Err(AudioError::Internal("ring buffer overflow".to_string()));
        }

        let capacity = self.capacity();
        let start = *head;
        let first = src.len().min(capacity - start);

        // SAFETY: the region [start, start + src.len()) (mod capacity)
        // lies entirely within the writable area while the write lock is
        // held, and the consumer cannot touch it until `count` is
        // increased below.
        unsafe {
            ptr::copy_nonoverlapping(src.as_ptr(), self.storage[start].get(), first);
            if first < src.len() {
                ptr::copy_nonoverlapping(
                    src.as_ptr().add(first),
                    self.storage[0].get(),
                    src.len() - first,
                );
            }
        }

        *head = (start + src.len()) % capacity;

        // Publish the bytes to the consumer. This has to happen after
        // the copy, and with release ordering, so the reader can never
        // observe capacity it cannot actually read.
        self.count.fetch_add(src.len(), Ordering::AcqRel);

        Ok(src.len())
    }

    /// Fills all of `dst` from the buffer, returning the byte count
    /// read.
    ///
    /// # Errors
    ///
    /// Returns an internal error if `dst` exceeds the current read
    /// capacity. Callers must size their reads with
    /// [`RingBuffer::read_capacity`] first.
    pub fn read(&self, dst: &mut [u8]) -> Result<usize> {
        if dst.is_empty() {
            return Ok(0);
        }

        let mut head = self.read_head.lock();

        if self.read_capacity() < dst.len() {
            return Err(AudioError::Internal("ring buffer underflow".to_string()));
        }

        let capacity = self.capacity();
        let start = *head;
        let first = dst.len().min(capacity - start);

        // SAFETY: mirror of `write`. The region being read is inside the
        // readable area while the read lock is held; the producer cannot
        // overwrite it until `count` is decreased below.
        unsafe {
            ptr::copy_nonoverlapping(self.storage[start].get(), dst.as_mut_ptr(), first);
            if first < dst.len() {
                ptr::copy_nonoverlapping(
                    self.storage[0].get(),
                    dst.as_mut_ptr().add(first),
                    dst.len() - first,
                );
            }
        }

        *head = (start + dst.len()) % capacity;

        self.count.fetch_sub(dst.len(), Ordering::AcqRel);

        Ok(dst.len())
    }

    /// Discards everything in the buffer.
    ///
    /// Takes both side locks, so it cannot interleave with an in-flight
    /// read or write. The backing bytes are left in place; only the
    /// cursors and count change. Equivalent to reading all available
    /// bytes and throwing them away.
    pub fn flush(&self) {
        let mut read_head = self.read_head.lock();
        let write_head = self.write_head.lock();

        *read_head = *write_head;
        self.count.store(0, Ordering::Release);
    }
}

impl std::fmt::Debug for RingBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RingBuffer")
            .field("capacity", &self.capacity())
            .field("count", &self.read_capacity())
            .finish()
    }
}
