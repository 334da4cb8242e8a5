use std::io::Read;

use arenalloc::global::{allocate, deallocate, dump_allocator, init_allocator};

/// Waits until the user presses ENTER.
/// Pass `--no-wait` to run straight through.
fn block_until_enter_pressed(wait: bool) {
  if !wait {
    return;
  }
  println!("\n>>> Press ENTER to continue...");
  let _ = std::io::stdin().bytes().next();
}

fn main() {
  let wait = !std::env::args().any(|arg| arg == "--no-wait");

  if let Err(error) = init_allocator() {
    eprintln!("cannot set up the heap: {}", error);
    std::process::exit(1);
  }

  unsafe {
    println!("[start] One free block spans the whole arena");
    dump_allocator();
    block_until_enter_pressed(wait);

    // --------------------------------------------------------------------
    // 1) Allocate a u32. The request is rounded up to 16 bytes and a 16 byte
    //    header goes in front, so the first block is 32 bytes.
    // --------------------------------------------------------------------
    let first_block = allocate(4);
    let first_ptr = first_block as *mut u32;
    first_ptr.write(0xDEADBEEF);
    println!("\n[1] Allocate u32, value = 0x{:X}", first_ptr.read());
    dump_allocator();
    block_until_enter_pressed(wait);

    // --------------------------------------------------------------------
    // 2) Allocate 100 bytes (rounded to 112, block of 128).
    // --------------------------------------------------------------------
    let second_block = allocate(100);
    std::ptr::write_bytes(second_block, 0xAB, 100);
    println!("\n[2] Allocate [u8; 100], filled with 0xAB");
    dump_allocator();
    block_until_enter_pressed(wait);

    // --------------------------------------------------------------------
    // 3) Allocate a u64 behind it. Every payload is 16 byte aligned.
    // --------------------------------------------------------------------
    let third_block = allocate(8);
    let third_ptr = third_block as *mut u64;
    third_ptr.write(0x1122334455667788);
    println!(
      "\n[3] Allocate u64 at {:p}, addr % 16 = {}",
      third_block,
      third_block as usize % 16
    );
    dump_allocator();
    block_until_enter_pressed(wait);

    // --------------------------------------------------------------------
    // 4) Free the first block. It becomes the head of the free list but
    //    cannot merge: its neighbour is still in use.
    // --------------------------------------------------------------------
    deallocate(first_block);
    println!("\n[4] Deallocated first_block");
    dump_allocator();
    block_until_enter_pressed(wait);

    // --------------------------------------------------------------------
    // 5) A small request reuses the freed hole (first fit, exact size).
    // --------------------------------------------------------------------
    let fifth_block = allocate(2);
    println!(
      "\n[5] Allocate [u8; 2]: {}",
      if fifth_block == first_block {
        "reused the freed block"
      } else {
        "allocated somewhere else"
      }
    );
    dump_allocator();
    block_until_enter_pressed(wait);

    // --------------------------------------------------------------------
    // 6) Free everything. The blocks merge back into one free block.
    // --------------------------------------------------------------------
    deallocate(second_block);
    deallocate(fifth_block);
    deallocate(third_block);
    println!("\n[6] Deallocated all blocks");
    dump_allocator();

    // --------------------------------------------------------------------
    // 7) A request larger than the arena fails instead of growing it.
    // --------------------------------------------------------------------
    let too_big = allocate(1 << 20);
    println!("\n[7] Allocate 1 MiB -> null = {}", too_big.is_null());
  }
}
