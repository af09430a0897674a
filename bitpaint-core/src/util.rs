//! Utility functions, used throughout the crate.

/// Euclidean remainder, where the result always has the sign of the divisor.
///
/// Unlike `%`, `floor_mod(-1, 4) == 3`. Returns `None` for a zero divisor.
#[must_use]
pub fn floor_mod(n: i32, m: i32) -> Option<i32> {
    if m == 0 {
        None
    } else {
        Some(((n % m) + m) % m)
    }
}

/// [`floor_mod`] for lengths, as used to index repeating sequences.
#[must_use]
pub fn floor_mod_len(n: i64, len: usize) -> Option<usize> {
    let len = i64::try_from(len).ok().filter(|len| *len != 0)?;
    // Result is in `0..len`, so it fits.
    usize::try_from(n.rem_euclid(len)).ok()
}

/// Milliseconds since the unix epoch, used to stamp changes.
#[must_use]
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod test {
    use super::*;
    #[test]
    fn negative_modulo() {
        assert_eq!(floor_mod(-1, 4), Some(3));
        assert_eq!(floor_mod(-4, 4), Some(0));
        assert_eq!(floor_mod(-5, 4), Some(3));
        assert_eq!(floor_mod(5, 4), Some(1));
        assert_eq!(floor_mod(5, 0), None);
    }
    #[test]
    fn length_modulo() {
        assert_eq!(floor_mod_len(-1, 3), Some(2));
        assert_eq!(floor_mod_len(7, 3), Some(1));
        assert_eq!(floor_mod_len(7, 0), None);
    }
}
