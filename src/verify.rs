//! Consistency check of the two views of the arena.
//!
//! Walks the blocks by address and the free list by link, and reports the
//! first block where they disagree.

use crate::{
  block::{BlockState, HEADER_SIZE},
  error::HeapError,
  heap::FreeList,
};

impl FreeList {
  pub(crate) fn verify(&self) -> Result<(), HeapError> {
    let capacity = self.arena.capacity();
    let mut free_by_address = Vec::new();
    let mut offset = 0;

    while offset < capacity {
      let block = self.arena.header(offset);

      if block.span() < HEADER_SIZE || block.span() % HEADER_SIZE != 0 {
        return Err(HeapError::Corrupted {
          offset,
          reason: "block size is not a positive multiple of the header size",
        });
      }
      if block.span() > capacity - offset {
        return Err(HeapError::Corrupted {
          offset,
          reason: "block runs past the end of the arena",
        });
      }

      if block.state() == BlockState::Free {
        free_by_address.push(offset);
      }

      offset += block.span();
    }

    let mut previous: Option<(usize, usize)> = None;
    let mut current = self.first_free;
    let mut visited = 0;

    while let Some(offset) = current {
      if free_by_address.get(visited) != Some(&offset) {
        return Err(HeapError::Corrupted {
          offset,
          reason: "free list does not match the free blocks in address order",
        });
      }

      let block = self.arena.header(offset);
      if let Some((previous_offset, previous_end)) = previous {
        if previous_end == offset {
          return Err(HeapError::Corrupted {
            offset: previous_offset,
            reason: "adjacent free blocks were not merged",
          });
        }
      }

      previous = Some((offset, offset + block.span()));
      current = block.next_free();
      visited += 1;
    }

    if visited != free_by_address.len() {
      return Err(HeapError::Corrupted {
        offset: free_by_address[visited],
        reason: "free block is missing from the free list",
      });
    }

    Ok(())
  }
}
