//! Sorting-key generation.
//!
//! Keys are fixed-width strings over `0-9a-z` whose lexicographic order
//! matches the numeric order of the index they were generated from.
//!
//! ## Encoding
//!
//! The index is shifted past every numeral shorter than [`KEY_WIDTH`] and
//! written in bijective (zero-less) base 36: each step decrements before
//! dividing, so digit values run 1..=36 and map to alphabet positions
//! 0..=35. Because every key has the same width, byte order equals numeric
//! order and no two indexes collide on a leading-zero form.

use crate::errors::{NotebridgeError, Result};

const ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const BASE: u64 = ALPHABET.len() as u64;

/// Width of every generated key
pub const KEY_WIDTH: u32 = 6;

/// Largest index that fits in [`KEY_WIDTH`] characters
pub const MAX_SORTING_INDEX: u64 = BASE.pow(KEY_WIDTH) - 1;

/// Count of bijective numerals shorter than `KEY_WIDTH` digits
const SHORTER_NUMERALS: u64 = {
    let mut total = 0;
    let mut power = 1;
    let mut len = 1;
    while len < KEY_WIDTH {
        power *= BASE;
        total += power;
        len += 1;
    }
    total
};

/// Sorting key for the block at `index` within a freshly imported notebook
///
/// # Errors
///
/// Returns `NotebridgeError::IndexOutOfRange` if `index` exceeds
/// [`MAX_SORTING_INDEX`].
///
/// # Example
///
/// ```
/// use notebridge_core::sorting::sorting_key_for;
///
/// assert_eq!(sorting_key_for(0).unwrap(), "000000");
/// assert!(sorting_key_for(9).unwrap() < sorting_key_for(10).unwrap());
/// ```
pub fn sorting_key_for(index: u64) -> Result<String> {
    if index > MAX_SORTING_INDEX {
        return Err(NotebridgeError::IndexOutOfRange {
            index,
            max: MAX_SORTING_INDEX,
        });
    }

    let mut n = index + SHORTER_NUMERALS + 1;
    let mut digits = Vec::with_capacity(KEY_WIDTH as usize);
    while n > 0 {
        n -= 1;
        digits.push(ALPHABET[(n % BASE) as usize]);
        n /= BASE;
    }
    digits.reverse();

    Ok(String::from_utf8_lossy(&digits).into_owned())
}
