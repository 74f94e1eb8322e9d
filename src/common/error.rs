/// The error type for constructing the building blocks of a cache.
///
/// Cache operations such as [`get_or_add`][get-or-add] never return this error.
/// Errors raised by a user provided factory are handed back to the caller as
/// they are, through [`try_get_or_add`][try-get-or-add].
///
/// [get-or-add]: ./trait.GetOrAdd.html#tymethod.get_or_add
/// [try-get-or-add]: ./trait.GetOrAdd.html#tymethod.try_get_or_add
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// A required collaborator was not supplied.
    #[error("Invalid argument: `{name}` must be provided")]
    InvalidArgument {
        /// The name of the missing argument.
        name: &'static str,
    },
}
