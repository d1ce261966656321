//! Internal helper macros.

/// Returns `Err($error)` early when `$predicate` does not hold.
///
/// ```ignore
/// ensure!(!delimiter.is_empty(), ConfigError::EmptyDelimiter);
/// ```
macro_rules! ensure {
    ($predicate:expr, $error:expr) => {
        if !$predicate {
            return Err($error);
        }
    };
}

pub(crate) use ensure;
