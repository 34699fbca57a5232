use time::OffsetDateTime;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A cookie's expiration: either a date-time or the end of the session.
///
/// Cookies resolved from a header without a usable `Max-Age` or `Expires`
/// attribute are session cookies. Date-times are always in UTC.
///
/// ```rust
/// use scrape_cookies::Expiration;
/// use time::macros::datetime;
///
/// let expires = Expiration::from(datetime!(2017-07-02 22:07:33 UTC));
/// assert!(expires.is_datetime());
///
/// let session = Expiration::from(None);
/// assert!(session.is_session());
/// assert_eq!(session.datetime(), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Expiration {
    /// Expires at the given date-time.
    DateTime(OffsetDateTime),
    /// Expires at the end of the user agent's session.
    #[default]
    Session,
}

impl Expiration {
    /// Returns `true` if `self` is an `Expiration::DateTime`.
    pub fn is_datetime(&self) -> bool {
        matches!(self, Expiration::DateTime(_))
    }

    /// Returns `true` if `self` is an `Expiration::Session`.
    pub fn is_session(&self) -> bool {
        matches!(self, Expiration::Session)
    }

    /// The expiry date-time, or `None` for session cookies.
    pub fn datetime(self) -> Option<OffsetDateTime> {
        match self {
            Expiration::DateTime(v) => Some(v),
            Expiration::Session => None,
        }
    }

    /// Applies `f` to the date-time, if there is one.
    pub fn map<F>(self, f: F) -> Self
        where F: FnOnce(OffsetDateTime) -> OffsetDateTime
    {
        match self {
            Expiration::DateTime(v) => Expiration::DateTime(f(v)),
            Expiration::Session => Expiration::Session,
        }
    }
}

impl<T: Into<Option<OffsetDateTime>>> From<T> for Expiration {
    fn from(option: T) -> Self {
        match option.into() {
            Some(value) => Expiration::DateTime(value),
            None => Expiration::Session,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Expiration;
    use time::macros::datetime;
    use time::Duration;

    #[test]
    fn conversions() {
        let at = datetime!(2016-05-03 13:30:57 UTC);
        assert_eq!(Expiration::from(at), Expiration::DateTime(at));
        assert_eq!(Expiration::from(Some(at)).datetime(), Some(at));
        assert_eq!(Expiration::from(None), Expiration::Session);
        assert_eq!(Expiration::default(), Expiration::Session);
    }

    #[test]
    fn map() {
        let at = datetime!(2016-05-03 13:30:57 UTC);
        let later = Expiration::from(at).map(|t| t + Duration::hours(1));
        assert_eq!(later.datetime(), Some(datetime!(2016-05-03 14:30:57 UTC)));
        assert!(Expiration::Session.map(|t| t + Duration::hours(1)).is_session());
    }
}
