//! Read-only views of the arena for diagnostics.
//!
//! Offsets are relative to the arena base, never absolute addresses.

use std::fmt;

pub use crate::block::BlockState;
use crate::heap::FreeList;

/// One block found walking the arena by address.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockInfo {
  pub offset: usize,
  pub size: u64,
  pub state: BlockState,
}

/// One block found walking the free list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FreeBlockInfo {
  pub offset: usize,
  pub size: u64,
}

/// Both views of the arena at a single point in time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeapDump {
  pub blocks: Vec<BlockInfo>,
  pub free_list: Vec<FreeBlockInfo>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HeapStats {
  pub capacity: usize,
  pub free_bytes: u64,
  pub allocated_bytes: u64,
  pub free_blocks: usize,
  pub allocated_blocks: usize,
  /// Size of the largest free block, header included.
  pub largest_free: u64,
}

impl fmt::Display for HeapDump {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    writeln!(f, "All blocks:")?;
    for block in &self.blocks {
      let state = match block.state {
        BlockState::Allocated => "in use",
        BlockState::Free => "free",
      };
      writeln!(f, "  Block starting at {}, size {} ({})", block.offset, block.size, state)?;
    }

    writeln!(f, "Free block list:")?;
    for block in &self.free_list {
      writeln!(f, "  Free block starting at {}, size {}", block.offset, block.size)?;
    }

    Ok(())
  }
}

impl FreeList {
  pub(crate) fn blocks(&self) -> Vec<BlockInfo> {
    let mut blocks = Vec::new();
    let mut current = Some(0);

    while let Some(offset) = current {
      let block = self.arena.header(offset);
      blocks.push(BlockInfo {
        offset,
        size: block.size,
        state: block.state(),
      });

      current = self.arena.next_block_by_address(offset);
    }

    blocks
  }

  pub(crate) fn free_blocks(&self) -> Vec<FreeBlockInfo> {
    let mut free_list = Vec::new();
    let mut current = self.first_free;

    while let Some(offset) = current {
      let block = self.arena.header(offset);
      free_list.push(FreeBlockInfo {
        offset,
        size: block.size,
      });

      current = block.next_free();
    }

    free_list
  }

  pub(crate) fn stats(&self) -> HeapStats {
    let mut stats = HeapStats {
      capacity: self.arena.capacity(),
      ..HeapStats::default()
    };

    for block in self.blocks() {
      match block.state {
        BlockState::Free => {
          stats.free_bytes += block.size;
          stats.free_blocks += 1;
          stats.largest_free = stats.largest_free.max(block.size);
        }
        BlockState::Allocated => {
          stats.allocated_bytes += block.size;
          stats.allocated_blocks += 1;
        }
      }
    }

    stats
  }
}

#[cfg(test)]
mod tests {
  use crate::Heap;

  use super::*;

  #[test]
  fn test_dump_lists_both_views() {
    let heap = Heap::with_capacity(256).unwrap();

    let first = heap.allocate(16).unwrap();
    heap.allocate(32).unwrap();
    unsafe { heap.deallocate(first.as_ptr()) };

    let dump = heap.dump();

    assert_eq!(
      dump.blocks,
      vec![
        BlockInfo { offset: 0, size: 32, state: BlockState::Free },
        BlockInfo { offset: 32, size: 48, state: BlockState::Allocated },
        BlockInfo { offset: 80, size: 176, state: BlockState::Free },
      ]
    );
    assert_eq!(
      dump.free_list,
      vec![
        FreeBlockInfo { offset: 0, size: 32 },
        FreeBlockInfo { offset: 80, size: 176 },
      ]
    );

    let text = dump.to_string();
    assert_eq!(
      text,
      "All blocks:\n\
       \x20 Block starting at 0, size 32 (free)\n\
       \x20 Block starting at 32, size 48 (in use)\n\
       \x20 Block starting at 80, size 176 (free)\n\
       Free block list:\n\
       \x20 Free block starting at 0, size 32\n\
       \x20 Free block starting at 80, size 176\n"
    );
  }

  #[test]
  fn test_stats_account_for_every_byte() {
    let heap = Heap::with_capacity(1024).unwrap();

    heap.allocate(100).unwrap();
    let middle = heap.allocate(200).unwrap();
    heap.allocate(50).unwrap();
    unsafe { heap.deallocate(middle.as_ptr()) };

    let stats = heap.stats();

    assert_eq!(stats.capacity, 1024);
    assert_eq!(stats.allocated_blocks, 2);
    assert_eq!(stats.free_blocks, 2);
    assert_eq!(stats.allocated_bytes, 128 + 80);
    assert_eq!(stats.free_bytes + stats.allocated_bytes, 1024);
    assert_eq!(stats.largest_free, 1024 - 128 - 224 - 80);
  }
}
