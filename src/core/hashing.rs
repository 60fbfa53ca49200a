/// Starting value of the DJB2 hash.
pub const DJB2_SEED: u32 = 5381;

/// Hash function signature accepted by [`super::index::KeyedIndex`].
pub type HashFn = fn(&[u8]) -> u32;

/// DJB2 string hash: `hash * 33 + byte` over wrapping `u32` arithmetic.
///
/// Stable within a process, which is all the probe sequence needs.
pub fn djb2(bytes: &[u8]) -> u32 {
    bytes.iter().fold(DJB2_SEED, |hash, &b| {
        (hash << 5).wrapping_add(hash).wrapping_add(u32::from(b))
    })
}

/// Maps a hash code onto `0..capacity`.
///
/// `capacity` must be non-zero.
pub fn bucket(hashcode: u64, capacity: usize) -> usize {
    (hashcode % capacity as u64) as usize
}

/// Slot index probed at `step` for a key hashing to `hashcode`.
///
/// The addition is widened so `hashcode + step` never wraps.
pub fn probe(hashcode: u32, step: usize, capacity: usize) -> usize {
    bucket(u64::from(hashcode) + step as u64, capacity)
}
