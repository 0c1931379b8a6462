/// Supported start-up/shut-down ramp times in milliseconds, indexed by register code.
pub const RAMP_TABLE_MS: [u32; 8] = [2, 250, 500, 1000, 2000, 4000, 8000, 16000];

/// Resolves a requested ramp time to a register code.
///
/// Returns the greatest index whose table entry does not exceed `requested_ms`. Requests
/// below the smallest entry resolve to 0, which is also what the chip uses for "no ramp".
pub fn ramp_index(requested_ms: u32) -> u8 {
    // number of entries <= requested_ms; the table is sorted ascending
    let count = RAMP_TABLE_MS.partition_point(|&entry| entry <= requested_ms);
    count.saturating_sub(1) as u8
}

/// Like [`ramp_index`], but `None` when no ramp register write is needed.
pub(crate) fn ramp_code(requested_ms: u32) -> Option<u8> {
    match ramp_index(requested_ms) {
        0 => None,
        index => Some(index),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_entries_map_to_own_index() {
        for (i, &entry) in RAMP_TABLE_MS.iter().enumerate() {
            assert_eq!(ramp_index(entry), i as u8, "entry {entry} ms");
        }
    }

    #[test]
    fn test_rounds_down_between_entries() {
        assert_eq!(ramp_index(249), 0);
        assert_eq!(ramp_index(251), 1);
        assert_eq!(ramp_index(999), 2);
        assert_eq!(ramp_index(15999), 6);
    }

    #[test]
    fn test_out_of_range_requests() {
        assert_eq!(ramp_index(0), 0);
        assert_eq!(ramp_index(1), 0);
        assert_eq!(ramp_index(16000), 7);
        assert_eq!(ramp_index(u32::MAX), 7);
    }

    #[test]
    fn test_lookup_is_monotonic() {
        let mut previous = 0;
        for ms in (0..20_000).step_by(7) {
            let index = ramp_index(ms);
            assert!(index >= previous, "lookup({ms}) went down to {index}");
            previous = index;
        }
    }

    #[test]
    fn test_ramp_code_skips_no_ramp() {
        assert_eq!(ramp_code(0), None);
        assert_eq!(ramp_code(2), None);
        assert_eq!(ramp_code(300), Some(1));
    }
}
