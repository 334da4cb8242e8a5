//! Process-wide heap with a C-style `malloc`/`free` interface.
//!
//! [`init_allocator`] must run before anything else. Until then
//! [`allocate`] returns null and [`deallocate`] ignores its argument.

use std::sync::OnceLock;

use crate::{
  error::HeapError,
  heap::{HEAP_SIZE, Heap},
};

static HEAP: OnceLock<Heap> = OnceLock::new();

/// Sets up the process-wide [`HEAP_SIZE`] arena as a single free block.
///
/// Calling it again resets the arena; pointers allocated before the reset
/// must not be used or freed afterwards.
pub fn init_allocator() -> Result<(), HeapError> {
  if let Some(heap) = HEAP.get() {
    heap.reset();
    return Ok(());
  }

  if let Err(heap) = HEAP.set(Heap::with_capacity(HEAP_SIZE)?) {
    // Lost the race against another initializer; ours is unmapped on drop.
    drop(heap);
    if let Some(heap) = HEAP.get() {
      heap.reset();
    }
  }

  Ok(())
}

/// Allocates `size` bytes from the process-wide heap, or returns null when no
/// free block is large enough.
pub fn allocate(size: u64) -> *mut u8 {
  let Some(heap) = HEAP.get() else {
    log::warn!("allocate({}) before init_allocator", size);
    return std::ptr::null_mut();
  };

  match heap.allocate(size) {
    Ok(address) => address.as_ptr(),
    Err(_) => std::ptr::null_mut(),
  }
}

/// Frees a pointer returned by [`allocate`]. Null is ignored.
///
/// # Safety
///
/// Same contract as [`Heap::deallocate`].
pub unsafe fn deallocate(address: *mut u8) {
  if let Some(heap) = HEAP.get() {
    unsafe { heap.deallocate(address) };
  }
}

/// Prints every block in address order, then the free list.
pub fn dump_allocator() {
  if let Some(heap) = HEAP.get() {
    heap.dump_allocator();
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  // The only test touching the process-wide heap, so no other test can
  // reset it underneath.
  #[test]
  fn test_global_lifecycle() {
    init_allocator().unwrap();

    let first = allocate(24);
    let second = allocate(100);
    assert!(!first.is_null());
    assert!(!second.is_null());
    assert_eq!(second as usize - first as usize, 32 + 16);

    assert!(allocate(HEAP_SIZE as u64).is_null());

    unsafe {
      deallocate(std::ptr::null_mut());
      deallocate(first);
      deallocate(second);
    }

    let heap = HEAP.get().unwrap();
    assert_eq!(heap.free_blocks().len(), 1);
    assert_eq!(heap.free_blocks()[0].size, HEAP_SIZE as u64);

    allocate(1);
    init_allocator().unwrap();
    assert_eq!(heap.blocks().len(), 1);
    heap.verify().unwrap();
  }
}
