//! Split key codec.
//!
//! A key for split `offset` of a shard is the original key with a two-letter
//! suffix spliced onto the shard id:
//!
//! ```text
//! prefix:shard123:suffix   (primary)
//! prefix:shard123aa:suffix (offset 0)
//! prefix:shard123ab:suffix (offset 1)
//! ```
//!
//! Suffixes are lowercase letters only, so they never collide with the
//! trailing digits of a shard id.

use bytes::{BufMut, Bytes, BytesMut};
use std::ops::Range;

/// Letters in the suffix alphabet.
const ALPHABET_LEN: usize = 26;

/// Length of every split suffix.
pub const SPLIT_SUFFIX_LEN: usize = 2;

/// Number of distinct split offsets the suffix can encode.
pub const MAX_SPLIT_OFFSETS: usize = ALPHABET_LEN * ALPHABET_LEN;

/// Encode a split offset as a two-letter suffix: 0 → "aa", 1 → "ab", 26 → "ba".
pub fn shard_split_suffix(offset: usize) -> String {
    debug_assert!(
        offset < MAX_SPLIT_OFFSETS,
        "split offset {offset} exceeds {MAX_SPLIT_OFFSETS}"
    );
    let offset = offset % MAX_SPLIT_OFFSETS;
    let mut suffix = String::with_capacity(SPLIT_SUFFIX_LEN);
    suffix.push(char::from(b'a' + (offset / ALPHABET_LEN) as u8));
    suffix.push(char::from(b'a' + (offset % ALPHABET_LEN) as u8));
    suffix
}

/// Build the key routing to split `offset` of `shard`.
///
/// Replaces the first occurrence of `shard` in `full_key` with `shard`
/// followed by [`shard_split_suffix(offset)`](shard_split_suffix). Everything
/// before and after that occurrence is preserved byte for byte.
///
/// Only correct for keys where nothing before the shard position contains the
/// shard text; use [`create_split_key_at`] when the position is known.
/// Returns `None` if `shard` is empty or not found.
pub fn create_split_key(full_key: &[u8], offset: usize, shard: &[u8]) -> Option<Bytes> {
    let start = find(full_key, shard)?;
    create_split_key_at(full_key, start..start + shard.len(), offset)
}

/// Build the key routing to split `offset`, splicing the suffix at the end of
/// an explicit shard byte range.
///
/// Returns `None` if the range is empty or out of bounds.
pub fn create_split_key_at(full_key: &[u8], shard: Range<usize>, offset: usize) -> Option<Bytes> {
    if shard.is_empty() || shard.end > full_key.len() {
        return None;
    }

    let mut key = BytesMut::with_capacity(full_key.len() + SPLIT_SUFFIX_LEN);
    key.put_slice(&full_key[..shard.end]);
    key.put_slice(shard_split_suffix(offset).as_bytes());
    key.put_slice(&full_key[shard.end..]);
    Some(key.freeze())
}

/// Position of the first occurrence of `needle` in `haystack`.
fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
