//! Error type for indexed access to persistent collections.

/// An index fell outside `[0, length)`.
///
/// This is the only way an indexed read or write can fail. It is always a
/// caller error: the receiver is left untouched and nothing was allocated.
///
/// # Examples
///
/// ```rust
/// use strata::persistent::{IndexOutOfRange, PersistentVector};
///
/// let vector: PersistentVector<i32> = (1..=3).collect();
/// let error = vector.try_get(3).unwrap_err();
/// assert_eq!(error, IndexOutOfRange { index: 3, length: 3 });
/// assert_eq!(error.to_string(), "index 3 out of range for length 3");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
#[error("index {index} out of range for length {length}")]
pub struct IndexOutOfRange {
    /// The rejected index.
    pub index: usize,
    /// The length of the collection at the time of the call.
    pub length: usize,
}

impl IndexOutOfRange {
    /// Returns `Ok(index)` when `index < length`, logging and rejecting it
    /// otherwise.
    pub(crate) fn check(index: usize, length: usize) -> Result<usize, Self> {
        if index < length {
            Ok(index)
        } else {
            tracing::debug!(index, length, "rejected out-of-range index");
            Err(Self { index, length })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 1)]
    #[case(31, 32)]
    #[case(1023, 1050)]
    fn test_check_accepts_in_range(#[case] index: usize, #[case] length: usize) {
        assert_eq!(IndexOutOfRange::check(index, length), Ok(index));
    }

    #[rstest]
    #[case(0, 0)]
    #[case(5, 5)]
    #[case(usize::MAX, 10)]
    fn test_check_rejects_out_of_range(#[case] index: usize, #[case] length: usize) {
        assert_eq!(
            IndexOutOfRange::check(index, length),
            Err(IndexOutOfRange { index, length })
        );
    }

    #[rstest]
    fn test_display() {
        let error = IndexOutOfRange {
            index: 7,
            length: 2,
        };
        assert_eq!(format!("{error}"), "index 7 out of range for length 2");
    }

    #[rstest]
    fn test_is_std_error() {
        fn assert_error<E: std::error::Error + Send + Sync + 'static>() {}
        assert_error::<IndexOutOfRange>();
    }
}
