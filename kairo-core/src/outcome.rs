//! Handler return value conversion.

use crate::error::BoxError;

/// Converts a handler's return value into success or failure.
///
/// # Default Implementations
///
/// - `()` → success
/// - `Result<T, E>` → delegates to `T` on `Ok`, fails with `E` on `Err`
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot be returned from an event handler",
    label = "handlers must return `()` or `Result<_, E>`",
    note = "Implement `IntoOutcome` for `{Self}` or return a `Result` whose error converts into `BoxError`."
)]
pub trait IntoOutcome {
    /// Convert the return value into the handler's outcome.
    fn into_outcome(self) -> Result<(), BoxError>;
}

impl IntoOutcome for () {
    fn into_outcome(self) -> Result<(), BoxError> {
        Ok(())
    }
}

impl<T, E> IntoOutcome for Result<T, E>
where
    T: IntoOutcome,
    E: Into<BoxError>,
{
    fn into_outcome(self) -> Result<(), BoxError> {
        match self {
            Ok(t) => t.into_outcome(),
            Err(e) => Err(e.into()),
        }
    }
}
