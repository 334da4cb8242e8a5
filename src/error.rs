//! Error types for the arena heap
//!
//! Only [`HeapError::OutOfMemory`] is an ordinary runtime outcome of
//! allocation. Corruption of the block structure found while allocating or
//! freeing is fatal and panics; [`HeapError::Corrupted`] is produced only by
//! [`Heap::verify`](crate::Heap::verify).

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeapError {
  /// No free block is large enough for the request
  OutOfMemory { requested: u64 },

  /// Arena capacity is zero or not a multiple of the header size
  InvalidCapacity { capacity: usize },

  /// The operating system refused to map the arena
  MapFailed { capacity: usize, errno: i32 },

  /// A heap invariant does not hold at the given block offset
  Corrupted { offset: usize, reason: &'static str },
}

impl fmt::Display for HeapError {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    match self {
      HeapError::OutOfMemory { requested } => {
        write!(f, "out of memory: no free block for {} bytes", requested)
      }
      HeapError::InvalidCapacity { capacity } => {
        write!(
          f,
          "invalid arena capacity {}: must be a non-zero multiple of {}",
          capacity,
          crate::HEADER_SIZE
        )
      }
      HeapError::MapFailed { capacity, errno } => {
        write!(f, "failed to map a {} byte arena (errno {})", capacity, errno)
      }
      HeapError::Corrupted { offset, reason } => {
        write!(f, "heap corrupted at offset {}: {}", offset, reason)
      }
    }
  }
}

impl std::error::Error for HeapError {}
