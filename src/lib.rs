//! # arenalloc - A Fixed-Arena Free-List Allocator
//!
//! This crate provides a **first-fit free-list allocator** over a single
//! fixed-size byte arena. The arena is mapped once and never grows; every
//! allocation is carved out of it and every free returns memory to it.
//!
//! ## Overview
//!
//! The arena is always partitioned into blocks. Each block starts with a
//! 16-byte header, and free blocks are additionally chained into a list
//! ordered by address:
//!
//! ```text
//!   Arena:
//!
//!   ┌────────┬────────┬──────────────┬────────┬──────────────────────────┐
//!   │ used   │ free   │ used         │ used   │ free                     │
//!   │ 32     │ 48     │ 96           │ 32     │ 304                      │
//!   └────────┴────────┴──────────────┴────────┴──────────────────────────┘
//!   0        32  │    80             176      208  ▲
//!                │                                 │
//!                └────────── next free ────────────┘
//!
//!   first_free = 32, next by address = offset + size
//! ```
//!
//! Two views of the same memory are kept consistent:
//!
//! - **Address order**: derived from block sizes alone, no pointer stored.
//! - **Free list**: singly linked by offsets, strictly increasing in address,
//!   and never containing two physically adjacent blocks.
//!
//! ## Crate Structure
//!
//! ```text
//!   arenalloc
//!   ├── align      - round_up16 and the align! macro
//!   ├── block      - 16-byte block header (internal)
//!   ├── arena      - mmap'd arena, bounds-checked header access (internal)
//!   ├── heap       - Heap: first-fit allocate, split, free, coalesce
//!   ├── dump       - Block and free-list snapshots, stats
//!   ├── verify     - Invariant checker (internal)
//!   ├── error      - HeapError
//!   └── global     - Process-wide heap with malloc/free style calls
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use arenalloc::Heap;
//!
//! let heap = Heap::with_capacity(4096).unwrap();
//!
//! let ptr = heap.allocate(8).unwrap().as_ptr() as *mut u64;
//!
//! unsafe {
//!     ptr.write(42);
//!     assert_eq!(ptr.read(), 42);
//!
//!     heap.deallocate(ptr as *mut u8);
//! }
//!
//! assert_eq!(heap.free_blocks().len(), 1);
//! ```
//!
//! ## How It Works
//!
//! Allocation rounds the request up to 16 bytes, adds the header and takes
//! the first free block that fits. A larger block is split in place:
//!
//! ```text
//!   Before:   ┌──────────────────── free 256 ────────────────────┐
//!
//!   alloc(40) ┌── used 64 ──┬─────────── free 192 ──────────────┐
//!             │ hdr │ 48 B  │ hdr │                             │
//!                   ▲
//!                   └── Pointer returned to user
//! ```
//!
//! Freeing re-inserts the block into the free list by address, then merges it
//! with its successor and finally its predecessor when they touch:
//!
//! ```text
//!   ┌ free 32 ┬ [freed 32] ┬ free 64 ┐   ──►   ┌────── free 128 ──────┐
//! ```
//!
//! ## Concurrency
//!
//! A [`Heap`] is `Sync`. Every public call holds one `parking_lot` mutex for
//! its whole search-and-update sequence.
//!
//! ## Limitations
//!
//! - **Fixed capacity**: the arena never grows and is never compacted
//! - **16-byte alignment only**: no over-aligned allocations
//! - **Unchecked frees**: double frees and foreign pointers inside the arena
//!   are undefined behavior
//! - **Unix-only**: the arena is obtained through `libc::mmap`

pub mod align;
mod arena;
mod block;
pub mod dump;
pub mod error;
pub mod global;
mod heap;
mod verify;

pub use align::{checked_round_up16, round_up16};
pub use block::{ALLOCATED_BLOCK_MAGIC, BlockState, HEADER_SIZE};
pub use dump::{BlockInfo, FreeBlockInfo, HeapDump, HeapStats};
pub use error::HeapError;
pub use heap::{HEAP_SIZE, Heap};
