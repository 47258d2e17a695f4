//! Common utilities and helpers

pub mod logging;
pub mod path;
pub mod time;

/// Integer percentage of `done` out of `total`, scaled to `weight`.
///
/// Computes `floor(done / total * weight)`; an empty total reports zero.
pub fn weighted_percent(done: usize, total: usize, weight: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    let done = done.min(total) as u64;
    ((done * u64::from(weight)) / total as u64) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weighted_percent() {
        assert_eq!(weighted_percent(0, 5, 80), 0);
        assert_eq!(weighted_percent(1, 3, 80), 26);
        assert_eq!(weighted_percent(2, 3, 80), 53);
        assert_eq!(weighted_percent(3, 3, 80), 80);
        assert_eq!(weighted_percent(4, 3, 80), 80);
        assert_eq!(weighted_percent(1, 0, 80), 0);
    }
}
