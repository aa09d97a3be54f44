//! Jump consistent hash (Lamping & Veach).

const MULTIPLIER: u64 = 2_862_933_555_777_941_757;

/// Map `key` to a bucket in `0..num_buckets`.
///
/// Returns `None` when `num_buckets` is zero. Growing `num_buckets` by one
/// moves a key either nowhere or into the new last bucket.
pub fn jump_hash(mut key: u64, num_buckets: usize) -> Option<usize> {
    if num_buckets == 0 {
        return None;
    }

    let num_buckets = num_buckets as i64;
    let mut bucket: i64 = -1;
    let mut candidate: i64 = 0;

    while candidate < num_buckets {
        bucket = candidate;
        key = key.wrapping_mul(MULTIPLIER).wrapping_add(1);
        candidate =
            ((bucket + 1) as f64 * ((1i64 << 31) as f64 / ((key >> 33) + 1) as f64)) as i64;
    }

    Some(bucket as usize)
}
