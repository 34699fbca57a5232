use std::fmt;

use crate::Cookie;

#[cfg(feature = "percent-encode")]
use crate::USERINFO;
#[cfg(feature = "percent-encode")]
use percent_encoding::percent_encode;

/// Wrapper around `Cookie` whose `Display` implementation only prints the
/// name and value. Useful for `Cookie` request headers.
///
/// A value of this type can be obtained via [`Cookie::stripped()`]. This type
/// should only be used for its `Display` implementation.
///
/// # Example
///
/// ```rust
/// use scrape_cookies::Cookie;
///
/// let mut c = Cookie::new("name", "value");
/// c.set_domain("example.com");
/// assert_eq!(&c.stripped().to_string(), "name=value");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct PlainCookie<'a>(pub(crate) &'a Cookie);

impl fmt::Display for PlainCookie<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.0.name(), self.0.value())
    }
}

/// Like [`PlainCookie`], but percent-encodes the cookie's name and value.
///
/// A value of this type can be obtained via [`Cookie::stripped_encoded()`].
///
/// # Example
///
/// ```rust
/// use scrape_cookies::Cookie;
///
/// let mut c = Cookie::new("my name", "this; value%?");
/// c.set_domain("example.com");
/// assert_eq!(&c.stripped_encoded().to_string(), "my%20name=this%3B%20value%25%3F");
/// ```
#[cfg(feature = "percent-encode")]
#[derive(Debug, Clone, Copy)]
pub struct PlainEncodedCookie<'a>(pub(crate) &'a Cookie);

#[cfg(feature = "percent-encode")]
impl fmt::Display for PlainEncodedCookie<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = percent_encode(self.0.name().as_bytes(), USERINFO);
        let value = percent_encode(self.0.value().as_bytes(), USERINFO);
        write!(f, "{}={}", name, value)
    }
}

/// Wrapper around `Cookie` whose `Display` implementation renders the full
/// `Set-Cookie` form with a percent-encoded name and value.
///
/// A value of this type can be obtained via [`Cookie::encoded()`].
///
/// # Example
///
/// ```rust
/// use scrape_cookies::Cookie;
///
/// let c = Cookie::build("my name", "this; value?").secure(true).build();
/// assert_eq!(&c.encoded().to_string(), "my%20name=this%3B%20value%3F; Secure; Path=/");
/// ```
#[cfg(feature = "percent-encode")]
#[derive(Debug, Clone, Copy)]
pub struct EncodedCookie<'a>(pub(crate) &'a Cookie);

#[cfg(feature = "percent-encode")]
impl fmt::Display for EncodedCookie<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", PlainEncodedCookie(self.0))?;
        self.0.fmt_parameters(f)
    }
}

#[cfg(test)]
mod tests {
    use crate::Cookie;
    use time::macros::datetime;

    #[test]
    fn format_plain() {
        let cookie = Cookie::build("foo", "bar").build();
        assert_eq!(cookie.stripped().to_string(), "foo=bar");

        let cookie = Cookie::build("foo", "bar")
            .domain("example.com")
            .path("/")
            .expires(datetime!(2030-01-01 0:00 UTC))
            .http_only(true)
            .version(1)
            .build();
        assert_eq!(cookie.stripped().to_string(), "foo=bar");
    }

    #[test]
    #[cfg(feature = "percent-encode")]
    fn format_plain_encoded() {
        let cookie = Cookie::build("foo !?=", "bar;; a").build();
        assert_eq!(
            cookie.stripped_encoded().to_string(),
            "foo%20!%3F%3D=bar%3B%3B%20a"
        );

        let cookie = Cookie::build("foo !?=", "bar;; a")
            .domain("example.com")
            .http_only(true)
            .build();
        assert_eq!(
            cookie.stripped_encoded().to_string(),
            "foo%20!%3F%3D=bar%3B%3B%20a"
        );
        assert_eq!(
            cookie.encoded().to_string(),
            "foo%20!%3F%3D=bar%3B%3B%20a; HttpOnly; Path=/; Domain=example.com"
        );
    }
}
