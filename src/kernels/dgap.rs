//! This module contains the d-gap transform that turns a sorted postings list
//! into the small non-negative gaps the integer codecs are tuned for.
//!
//! Both directions run **in place** with wrapping arithmetic, so an unsorted
//! input still round-trips exactly (its "gaps" just wrap to large values).

use num_traits::{PrimInt, Unsigned, WrappingAdd, WrappingSub};

/// Replaces `data[i]` with `data[i] - data[i - 1]`. The first element is kept
/// as-is, i.e. it is the gap from an implicit zero.
pub fn to_gaps<T>(data: &mut [T])
where
    T: PrimInt + Unsigned + WrappingSub,
{
    // Backwards so every subtraction sees the original predecessor.
    for i in (1..data.len()).rev() {
        data[i] = data[i].wrapping_sub(&data[i - 1]);
    }
}

/// Inverse of [`to_gaps`]: a running sum.
pub fn from_gaps<T>(data: &mut [T])
where
    T: PrimInt + Unsigned + WrappingAdd,
{
    for i in 1..data.len() {
        data[i] = data[i].wrapping_add(&data[i - 1]);
    }
}

/// `true` if `data` is non-decreasing, the case where every gap is its true distance.
pub fn is_sorted_postings<T: PrimInt>(data: &[T]) -> bool {
    data.windows(2).all(|w| w[0] <= w[1])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_postings_roundtrip() {
        let original: Vec<u32> = vec![3, 7, 7, 20, 1_000_000, 1_000_001];
        let mut data = original.clone();
        to_gaps(&mut data);
        assert_eq!(data, vec![3, 4, 0, 13, 999_980, 1]);
        from_gaps(&mut data);
        assert_eq!(data, original);
    }

    #[test]
    fn test_unsorted_input_wraps_and_roundtrips() {
        let original: Vec<u64> = vec![10, 2, u64::MAX, 0];
        assert!(!is_sorted_postings(&original));
        let mut data = original.clone();
        to_gaps(&mut data);
        assert_eq!(data[1], 2u64.wrapping_sub(10));
        from_gaps(&mut data);
        assert_eq!(data, original);
    }

    #[test]
    fn test_short_slices_unchanged() {
        let mut empty: Vec<u32> = vec![];
        to_gaps(&mut empty);
        assert!(empty.is_empty());
        let mut one = vec![42u16];
        to_gaps(&mut one);
        from_gaps(&mut one);
        assert_eq!(one, vec![42]);
    }
}
