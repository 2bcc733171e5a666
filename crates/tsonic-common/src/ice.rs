//! Internal compiler errors.
//!
//! An ICE marks a case the exhaustive match over an IR/AST kind should
//! never reach once earlier phases have done their job (`spec.md` §7):
//! "any invariant violation ... is labeled ICE and abort the
//! compilation", with "a pointer to the phase responsible".

/// Panics with a message naming the phase that failed to uphold its
/// contract. Used only for conditions validation/soundness should have
/// already ruled out — never for user-facing errors, which go through
/// `Diagnostic` instead.
#[macro_export]
macro_rules! ice {
    ($phase:expr, $($arg:tt)*) => {
        panic!("internal compiler error in phase `{}`: {}", $phase, format!($($arg)*))
    };
}
