// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Truncated mean.
//!
//! 1. Calculate mean and σ² of the run in one pass.
//! 2. Drop every sample that deviates from the mean by `window` σ or more
//!    and average the rest.
//!
//! σ itself is never calculated. The comparison is done on squares.
//! All divisions are multiplications with [q16::RECIPROCALS].

use q16::{Q16, div_round, reciprocal};

/// Truncated mean of `run` with the σ multiplier `window`.
///
/// The result has the scale of the raw samples.
/// If all samples are dropped, the plain mean is returned.
///
/// `run.len()` must be in the range 2..=16.
/// `window` must be positive and below 181.
///
/// Samples must be below 8192. The ADC delivers 12 bits, which leaves one
/// bit of headroom. In that range a run of equal samples yields exactly
/// that sample for every count. Above it, the rounded reciprocals can
/// offset the result by a few counts, unless the count is a power of two.
/// Larger samples don't overflow, though.
#[inline(never)]
pub fn truncated_mean(run: &[u16], window: Q16) -> u32 {
    let count = run.len();

    // Sum and sum of squares in one pass.
    // 16 squares of 16 bit samples overflow 32 bits.
    let mut s: u32 = 0;
    let mut s2: u64 = 0;
    for &val in run {
        s += val as u32;
        s2 += val as u64 * val as u64;
    }
    let s = s as u64;

    let mean = div_round(s, count);

    // sigma_square = (s2 - (s * s / count)) / (count - 1)
    // Rounding of the reciprocal may push the subtrahend above s2
    // for runs without any variance.
    let sq_dev = s2.saturating_sub(reciprocal(count).scale_u64(s * s));
    let sigma_square = div_round(sq_dev, count - 1);

    let sigma_win_square = (window * window).scale_u64(sigma_square);

    // Drop big deviations and calculate the mean of the rest.
    let mut filtered_sum: u32 = 0;
    let mut filtered_cnt: usize = 0;
    for &val in run {
        let dev = mean.abs_diff(val as u64);
        if dev * dev < sigma_win_square {
            filtered_sum += val as u32;
            filtered_cnt += 1;
        }
    }

    if filtered_cnt == 0 {
        mean as u32
    } else {
        div_round(filtered_sum as u64, filtered_cnt) as u32
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use q16::q16;

    #[test]
    fn test_constant_run() {
        for count in 2..=16 {
            for val in [0, 1, 2, 100, 1000, 2047, 2048, 4000, 4095, 8191] {
                let run = [val; 16];
                for window in [q16!(1 / 4), q16!(1), q16!(11 / 10), q16!(2), q16!(3)] {
                    assert_eq!(truncated_mean(&run[..count], window), val as u32);
                }
            }
        }
    }

    #[test]
    fn test_zero_variance() {
        assert_eq!(truncated_mean(&[1000, 1000], q16!(1)), 1000);
    }

    #[test]
    fn test_outlier_dropped() {
        assert_eq!(truncated_mean(&[100, 102, 98, 400], q16!(1)), 100);
        assert_eq!(truncated_mean(&[100, 102, 98, 400], q16!(11 / 10)), 100);
    }

    #[test]
    fn test_small_run_cannot_drop() {
        // With 4 samples, no sample can deviate by more than 1.5 σ.
        // A window of 2 keeps everything and yields the plain mean.
        assert_eq!(truncated_mean(&[100, 102, 98, 400], q16!(2)), 175);
    }

    #[test]
    fn test_plain_mean() {
        // All samples within the window -> rounded plain mean.
        assert_eq!(truncated_mean(&[2000, 2001, 2002, 2003], q16!(2)), 2002);
        assert_eq!(truncated_mean(&[10, 20, 30], q16!(2)), 20);
        assert_eq!(truncated_mean(&[0, 4095], q16!(1)), 2048);
    }

    #[test]
    fn test_all_dropped() {
        // σ² = 50, threshold = 13, both deviations are 25.
        // Falls back to the first pass mean.
        assert_eq!(truncated_mean(&[0, 10], q16!(1 / 2)), 5);
    }

    #[test]
    fn test_tie_is_dropped() {
        // mean = 99, threshold = 9, (99 - 96)² = 9 -> 96 is dropped.
        assert_eq!(truncated_mean(&[100, 103, 96, 98], q16!(1)), 99);
        // mean = 96, threshold = 9, (96 - 93)² = 9 -> 93 is dropped.
        assert_eq!(truncated_mean(&[98, 93, 98], q16!(1)), 98);
    }

    #[test]
    fn test_sample_limit() {
        for count in 2..=16 {
            for val in [4095, 8191] {
                let run = [val; 16];
                assert_eq!(truncated_mean(&run[..count], q16!(2)), val as u32);
            }
        }
    }

    #[test]
    fn test_wide_samples() {
        // The sum of squares exceeds 32 bits here.
        // Power-of-two counts have exact reciprocals, so the result is exact.
        for count in [2, 4, 8, 16] {
            let mut run = [0xFFFF; 16];
            assert_eq!(truncated_mean(&run[..count], q16!(2)), 0xFFFF);

            for val in &mut run[count / 2..count] {
                *val = 0xFFFE;
            }
            assert_eq!(truncated_mean(&run[..count], q16!(2)), 0xFFFF);
        }
    }

    #[test]
    fn test_bounds() {
        let run = [7, 9, 4000, 11, 8, 10, 9, 8, 7, 12, 10, 9, 8, 11, 9, 10];
        assert_eq!(truncated_mean(&run[..2], q16!(1)), 8);
        assert_eq!(truncated_mean(&run, q16!(2)), 9);
    }

    #[test]
    fn test_deterministic() {
        let run = [1500, 1490, 1510, 2900, 1505, 1495, 1502, 1498];
        let a = truncated_mean(&run, q16!(11 / 10));
        let b = truncated_mean(&run, q16!(11 / 10));
        assert_eq!(a, b);
        assert_eq!(a, 1500);
    }
}

// vim: ts=4 sw=4 expandtab
