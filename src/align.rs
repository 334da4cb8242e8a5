/// Rounds the given size up to the block header size (16 bytes).
///
/// Every block size in the arena is a multiple of this unit.
///
/// # Examples
///
/// ```rust
/// use arenalloc::align;
///
/// assert_eq!(align!(0u64), 0);
/// assert_eq!(align!(1u64), 16);
/// assert_eq!(align!(16u64), 16);
/// assert_eq!(align!(17u64), 32);
/// ```
#[macro_export]
macro_rules! align {
  ($value:expr) => {
    ($value + ($crate::HEADER_SIZE as u64) - 1) & !(($crate::HEADER_SIZE as u64) - 1)
  };
}

/// Rounds `n` up to the nearest multiple of 16, or `None` if that overflows.
pub const fn checked_round_up16(n: u64) -> Option<u64> {
  match n.checked_add(0xF) {
    Some(value) => Some(value & !0xF),
    None => None,
  }
}

/// Rounds `n` up to the nearest multiple of 16.
///
/// # Panics
///
/// Panics if the rounded value does not fit in a `u64`.
pub const fn round_up16(n: u64) -> u64 {
  match checked_round_up16(n) {
    Some(value) => value,
    None => panic!("round_up16 overflowed u64"),
  }
}
