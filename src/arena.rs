use std::{io, ptr::NonNull};

use libc::{MAP_ANONYMOUS, MAP_FAILED, MAP_PRIVATE, PROT_READ, PROT_WRITE, c_void, mmap, munmap};

use crate::{
  block::{Block, HEADER_SIZE},
  error::HeapError,
};

/// Fixed-capacity byte region backing all blocks of one heap.
///
/// The memory comes from an anonymous private mapping, so it is page aligned
/// (and therefore header aligned) and never touches the global allocator.
/// Blocks are addressed by byte offset from the base; every header access is
/// bounds and alignment checked, and an out-of-range offset is treated as
/// corruption.
pub struct Arena {
  base: NonNull<u8>,
  capacity: usize,
}

// The arena owns its mapping exclusively; `Heap` serializes all access.
unsafe impl Send for Arena {}

impl Arena {
  pub fn map(capacity: usize) -> Result<Self, HeapError> {
    if capacity == 0 || capacity % HEADER_SIZE != 0 {
      return Err(HeapError::InvalidCapacity { capacity });
    }

    let address = unsafe {
      mmap(
        std::ptr::null_mut(),
        capacity,
        PROT_READ | PROT_WRITE,
        MAP_PRIVATE | MAP_ANONYMOUS,
        -1,
        0,
      )
    };

    if address == MAP_FAILED {
      let errno = io::Error::last_os_error().raw_os_error().unwrap_or(0);
      log::warn!("mmap of {} byte arena failed (errno {})", capacity, errno);
      return Err(HeapError::MapFailed { capacity, errno });
    }

    let base = NonNull::new(address as *mut u8).ok_or(HeapError::MapFailed { capacity, errno: 0 })?;

    log::info!("mapped {} byte arena at {:p}", capacity, base);

    Ok(Self { base, capacity })
  }

  pub fn capacity(&self) -> usize {
    self.capacity
  }

  fn check_offset(
    &self,
    offset: usize,
  ) {
    assert!(
      offset % HEADER_SIZE == 0 && offset + HEADER_SIZE <= self.capacity,
      "block offset {} outside arena of {} bytes",
      offset,
      self.capacity
    );
  }

  pub fn header(
    &self,
    offset: usize,
  ) -> Block {
    self.check_offset(offset);

    unsafe { self.base.as_ptr().add(offset).cast::<Block>().read() }
  }

  pub fn set_header(
    &mut self,
    offset: usize,
    block: Block,
  ) {
    self.check_offset(offset);

    unsafe { self.base.as_ptr().add(offset).cast::<Block>().write(block) }
  }

  /// Pointer to the first payload byte of the block at `offset`.
  pub fn payload(
    &self,
    offset: usize,
  ) -> NonNull<u8> {
    self.check_offset(offset);

    unsafe { self.base.add(offset + HEADER_SIZE) }
  }

  /// Recovers the block offset from a payload pointer handed out by
  /// [`Arena::payload`].
  pub fn block_offset(
    &self,
    payload: NonNull<u8>,
  ) -> usize {
    let base = self.base.as_ptr() as usize;
    let address = payload.as_ptr() as usize;

    assert!(
      address >= base + HEADER_SIZE && address <= base + self.capacity,
      "pointer {:p} does not belong to this arena",
      payload
    );

    let offset = address - base - HEADER_SIZE;
    self.check_offset(offset);
    offset
  }

  /// Offset of the block that physically follows the one at `offset`, or
  /// `None` if it is the last block in the arena.
  pub fn next_block_by_address(
    &self,
    offset: usize,
  ) -> Option<usize> {
    let block = self.header(offset);

    assert!(
      block.span() >= HEADER_SIZE,
      "block at {} has size {} below the header size",
      offset,
      block.size
    );

    let next = offset + block.span();

    assert!(
      next <= self.capacity,
      "block at {} with size {} runs past the arena end",
      offset,
      block.size
    );

    (next != self.capacity).then_some(next)
  }
}

impl Drop for Arena {
  fn drop(&mut self) {
    let result = unsafe { munmap(self.base.as_ptr() as *mut c_void, self.capacity) };

    if result != 0 {
      let errno = io::Error::last_os_error().raw_os_error().unwrap_or(0);
      log::warn!("munmap of {} byte arena at {:p} failed (errno {})", self.capacity, self.base, errno);
    }
  }
}
