use std::ptr::NonNull;

use parking_lot::Mutex;

use crate::{
  align::checked_round_up16,
  arena::Arena,
  block::{Block, HEADER_SIZE},
  dump::{BlockInfo, FreeBlockInfo, HeapDump, HeapStats},
  error::HeapError,
};

/// Default arena capacity in bytes.
pub const HEAP_SIZE: usize = 64 * 1024;

/// Arena plus the head of its address-ordered free list.
///
/// Never locked itself; [`Heap`] hands out `&mut FreeList` only while holding
/// its mutex.
pub(crate) struct FreeList {
  pub(crate) arena: Arena,
  pub(crate) first_free: Option<usize>,
}

/// First-fit free-list allocator over one fixed arena.
///
/// Every public method takes the lock once and holds it for its whole
/// search-then-mutate sequence, so calls from different threads are
/// linearized.
pub struct Heap {
  state: Mutex<FreeList>,
}

impl Heap {
  /// Maps a [`HEAP_SIZE`] arena holding a single free block.
  pub fn new() -> Result<Self, HeapError> {
    Self::with_capacity(HEAP_SIZE)
  }

  /// Maps an arena of `capacity` bytes holding a single free block.
  ///
  /// `capacity` must be a non-zero multiple of [`HEADER_SIZE`].
  pub fn with_capacity(capacity: usize) -> Result<Self, HeapError> {
    let mut free_list = FreeList {
      arena: Arena::map(capacity)?,
      first_free: None,
    };
    free_list.init();

    Ok(Self {
      state: Mutex::new(free_list),
    })
  }

  pub fn capacity(&self) -> usize {
    self.state.lock().arena.capacity()
  }

  /// Returns the arena to its initial state: one free block spanning it all.
  ///
  /// Pointers handed out before the reset dangle afterwards.
  pub fn reset(&self) {
    let mut state = self.state.lock();
    state.init();

    log::info!("reset {} byte arena", state.arena.capacity());
  }

  /// Allocates `requested` bytes, rounded up to a multiple of 16.
  ///
  /// The returned pointer is 16-byte aligned and stays valid until it is
  /// passed to [`Heap::deallocate`] or the heap is reset or dropped.
  pub fn allocate(
    &self,
    requested: u64,
  ) -> Result<NonNull<u8>, HeapError> {
    self.state.lock().allocate(requested)
  }

  /// Returns a block to the free list, merging it with adjacent free blocks.
  ///
  /// A null pointer is ignored.
  ///
  /// # Safety
  ///
  /// `address` must be null or a pointer returned by [`Heap::allocate`] on
  /// this heap that has not been freed since. Pointers outside the arena
  /// panic; any other violation is undefined behavior.
  pub unsafe fn deallocate(
    &self,
    address: *mut u8,
  ) {
    let Some(address) = NonNull::new(address) else {
      return;
    };

    self.state.lock().deallocate(address);
  }

  /// Every block in address order.
  pub fn blocks(&self) -> Vec<BlockInfo> {
    self.state.lock().blocks()
  }

  /// Every free block in free-list order.
  pub fn free_blocks(&self) -> Vec<FreeBlockInfo> {
    self.state.lock().free_blocks()
  }

  /// Both views of the arena, taken under a single lock acquisition.
  pub fn dump(&self) -> HeapDump {
    let state = self.state.lock();

    HeapDump {
      blocks: state.blocks(),
      free_list: state.free_blocks(),
    }
  }

  /// Prints [`Heap::dump`] to stdout.
  pub fn dump_allocator(&self) {
    print!("{}", self.dump());
  }

  pub fn stats(&self) -> HeapStats {
    self.state.lock().stats()
  }

  /// Checks the partition, free-list order and coalescing invariants.
  pub fn verify(&self) -> Result<(), HeapError> {
    self.state.lock().verify()
  }
}

impl FreeList {
  fn init(&mut self) {
    let capacity = self.arena.capacity();

    self.arena.set_header(0, Block::free(capacity as u64, None));
    self.first_free = Some(0);
  }

  /// Points the slot that referenced a free block at `target`: the list head
  /// when `previous` is `None`, otherwise the link of the free block at
  /// `previous`.
  fn relink(
    &mut self,
    previous: Option<usize>,
    target: Option<usize>,
  ) {
    match previous {
      None => self.first_free = target,
      Some(offset) => {
        let block = self.arena.header(offset);
        self.arena.set_header(offset, Block::free(block.size, target));
      }
    }
  }

  fn allocate(
    &mut self,
    requested: u64,
  ) -> Result<NonNull<u8>, HeapError> {
    let needed = checked_round_up16(requested)
      .and_then(|size| size.checked_add(HEADER_SIZE as u64))
      .ok_or(HeapError::OutOfMemory { requested })?;

    let mut previous = None;
    let mut current = self.first_free;

    let (offset, candidate) = loop {
      let Some(offset) = current else {
        log::debug!("no free block for {} bytes ({} with header)", requested, needed);
        return Err(HeapError::OutOfMemory { requested });
      };

      let block = self.arena.header(offset);
      if block.size >= needed {
        break (offset, block);
      }

      previous = Some(offset);
      current = block.next_free();
    };

    if candidate.size == needed {
      self.relink(previous, candidate.next_free());
    } else {
      let remainder = offset + needed as usize;

      self.arena.set_header(remainder, Block::free(candidate.size - needed, candidate.next_free()));
      self.relink(previous, Some(remainder));
    }

    self.arena.set_header(offset, Block::allocated(needed));

    log::trace!("allocate({}) -> block {} size {}", requested, offset, needed);

    Ok(self.arena.payload(offset))
  }

  fn deallocate(
    &mut self,
    address: NonNull<u8>,
  ) {
    let offset = self.arena.block_offset(address);
    let block = self.arena.header(offset);

    debug_assert!(block.is_allocated(), "freeing block {} that is not allocated", offset);

    log::trace!("deallocate(block {} size {})", offset, block.size);

    let head = self.first_free;

    match head {
      Some(head) if head < offset => {
        let mut previous = head;
        while let Some(next) = self.arena.header(previous).next_free() {
          if next > offset {
            break;
          }
          previous = next;
        }

        let next = self.arena.header(previous).next_free();
        self.arena.set_header(offset, Block::free(block.size, next));
        self.relink(Some(previous), Some(offset));

        self.merge(offset);
        self.merge(previous);
      }
      _ => {
        self.arena.set_header(offset, Block::free(block.size, head));
        self.first_free = Some(offset);

        self.merge(offset);
      }
    }
  }

  /// Merges the free block at `offset` with its free-list successor if the
  /// two are physically adjacent.
  ///
  /// A free block physically following `offset` that is not its list
  /// successor means the free list is corrupt, and panics.
  fn merge(
    &mut self,
    offset: usize,
  ) {
    let block = self.arena.header(offset);
    let end = offset + block.span();
    let next = block.next_free();

    if next != Some(end) {
      assert!(
        end == self.arena.capacity() || self.arena.header(end).is_allocated(),
        "free block {} is adjacent to free block {} that is not its list neighbour",
        offset,
        end
      );
      if let Some(next) = next {
        assert!(end < next, "free block {} overlaps its successor {}", offset, next);
      }
      return;
    }

    let next = end;
    let successor = self.arena.header(next);
    assert!(
      !successor.is_allocated(),
      "free list links block {} to allocated block {}",
      offset,
      next
    );

    self
      .arena
      .set_header(offset, Block::free(block.size + successor.size, successor.next_free()));

    log::debug!("merged block {} into {} (size {})", next, offset, block.size + successor.size);
  }
}
