use std::mem;

/// Size of every block header. Block sizes and the arena base are aligned to it.
pub const HEADER_SIZE: usize = mem::size_of::<Block>();

/// Stored in the link field of allocated blocks. Odd, so it never equals a
/// free-block offset.
pub const ALLOCATED_BLOCK_MAGIC: u64 = 0xA110_CA7E_DB10_C4ED;

/// Link value of the last block in the free list.
const END_OF_LIST: u64 = u64::MAX;

const _: () = assert!(HEADER_SIZE == 16);

/// Header at the front of every block in the arena.
///
/// ```text
///   ┌───────────────┬──────────────────────────┬──────────────────┐
///   │ size: u64     │ link: u64                │ payload ...      │
///   │ incl. header  │ next free offset | MAGIC │                  │
///   └───────────────┴──────────────────────────┴──────────────────┘
/// ```
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Block {
  pub size: u64,
  link: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockState {
  Free,
  Allocated,
}

impl Block {
  pub fn free(
    size: u64,
    next: Option<usize>,
  ) -> Self {
    let link = match next {
      Some(offset) => offset as u64,
      None => END_OF_LIST,
    };

    Self { size, link }
  }

  pub fn allocated(size: u64) -> Self {
    Self {
      size,
      link: ALLOCATED_BLOCK_MAGIC,
    }
  }

  pub fn state(&self) -> BlockState {
    if self.link == ALLOCATED_BLOCK_MAGIC {
      BlockState::Allocated
    } else {
      BlockState::Free
    }
  }

  pub fn is_allocated(&self) -> bool {
    self.state() == BlockState::Allocated
  }

  /// Offset of the next free block, `None` at the end of the list or when the
  /// block is allocated.
  pub fn next_free(&self) -> Option<usize> {
    match self.link {
      END_OF_LIST | ALLOCATED_BLOCK_MAGIC => None,
      offset => Some(offset as usize),
    }
  }

  /// Size as a byte count usable for offset arithmetic.
  pub fn span(&self) -> usize {
    self.size as usize
  }
}
