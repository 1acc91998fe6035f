//! Utility macros shared by the message crate.

/// A macro for early returns with an error if a condition is not met.
///
/// This is similar to the `assert!` macro, but returns an error instead of panicking.
/// The error expression is only evaluated when the predicate fails.
///
/// # Example
///
/// ```ignore
/// ensure!(port != 0, UriError::invalid_port(0));
/// ```
macro_rules! ensure {
    ($predicate:expr, $error:expr) => {
        if !$predicate {
            return Err($error);
        }
    };
}

pub(crate) use ensure;
