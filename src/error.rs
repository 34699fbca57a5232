use std::num::ParseIntError;

use thiserror::Error;

/// Errors raised while resolving `Set-Cookie` headers.
///
/// Malformed header text is never an error: the grammar yields fewer cookies
/// or fewer attributes instead. Only misuse of the API and, when explicitly
/// requested via [`MaxAgePolicy::Strict`](crate::MaxAgePolicy::Strict), an
/// unparsable `Max-Age` are reported.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// The default host name used to scope cookies was empty or blank.
    #[error("a host name is required to scope cookies")]
    MissingHostName,

    /// A `Max-Age` attribute whose value is not an integer.
    #[error("cookie `{cookie}` has an invalid Max-Age value `{value}`")]
    InvalidMaxAge {
        /// Name of the cookie carrying the attribute.
        cookie: String,
        /// The raw attribute value.
        value: String,
        /// Why the value failed to parse.
        #[source]
        source: ParseIntError,
    },
}
