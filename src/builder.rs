use std::borrow::Borrow;

use time::OffsetDateTime;

use crate::{Cookie, Expiration};

/// Structure that follows the builder pattern for building `Cookie` structs.
///
/// To construct a cookie:
///
///   1. Call [`Cookie::build()`] to start building.
///   2. Use any of the builder methods to set fields in the cookie.
///   3. Call [`CookieBuilder::build()`] to get the `Cookie`.
///
/// ```rust
/// use scrape_cookies::Cookie;
/// use time::macros::datetime;
///
/// let cookie: Cookie = Cookie::build("name", "value")
///     .domain("www.rust-lang.org")
///     .path("/")
///     .secure(true)
///     .http_only(true)
///     .expires(datetime!(2030-01-01 0:00 UTC))
///     .build();
///
/// assert_eq!(cookie.domain(), "www.rust-lang.org");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CookieBuilder {
    /// The cookie being built.
    cookie: Cookie,
}

impl CookieBuilder {
    /// Creates a new `CookieBuilder` instance from the given name and value.
    ///
    /// This method is typically called indirectly via [`Cookie::build()`].
    pub fn new<N, V>(name: N, value: V) -> Self
        where N: Into<String>,
              V: Into<String>
    {
        CookieBuilder { cookie: Cookie::new(name, value) }
    }

    /// Sets the `expires` field in the cookie being built.
    ///
    /// See [`Expiration`] for conversions.
    ///
    /// # Example
    ///
    /// ```rust
    /// use scrape_cookies::{Cookie, Expiration};
    /// use time::OffsetDateTime;
    ///
    /// let c = Cookie::build("foo", "bar").expires(OffsetDateTime::now_utc());
    /// assert!(c.inner().expires().is_datetime());
    ///
    /// let c = Cookie::build("foo", "bar").expires(None);
    /// assert_eq!(c.inner().expires(), Expiration::Session);
    /// ```
    #[inline]
    pub fn expires<E: Into<Expiration>>(mut self, when: E) -> Self {
        self.cookie.set_expires(when);
        self
    }

    /// Sets the `domain` field in the cookie being built.
    pub fn domain<D: Into<String>>(mut self, value: D) -> Self {
        self.cookie.set_domain(value);
        self
    }

    /// Sets the `path` field in the cookie being built.
    ///
    /// # Example
    ///
    /// ```rust
    /// use scrape_cookies::Cookie;
    ///
    /// let c = Cookie::build("foo", "bar").path("/docs");
    /// assert_eq!(c.inner().path(), "/docs");
    /// ```
    pub fn path<P: Into<String>>(mut self, path: P) -> Self {
        self.cookie.set_path(path);
        self
    }

    /// Sets the `secure` field in the cookie being built.
    #[inline]
    pub fn secure(mut self, value: bool) -> Self {
        self.cookie.set_secure(value);
        self
    }

    /// Sets the `http_only` field in the cookie being built.
    #[inline]
    pub fn http_only(mut self, value: bool) -> Self {
        self.cookie.set_http_only(value);
        self
    }

    /// Sets the `version` field in the cookie being built.
    ///
    /// # Example
    ///
    /// ```rust
    /// use scrape_cookies::Cookie;
    ///
    /// let c = Cookie::build("foo", "bar").version(1);
    /// assert_eq!(c.inner().version(), 1);
    /// ```
    #[inline]
    pub fn version(mut self, value: i32) -> Self {
        self.cookie.set_version(value);
        self
    }

    /// Sets the creation timestamp of the cookie being built.
    #[inline]
    pub fn created(mut self, at: OffsetDateTime) -> Self {
        self.cookie.set_created(at);
        self
    }

    /// Returns a borrow to the cookie currently being built.
    ///
    /// # Example
    ///
    /// ```rust
    /// use scrape_cookies::Cookie;
    ///
    /// let builder = Cookie::build("name", "value")
    ///     .domain("www.rust-lang.org")
    ///     .http_only(true);
    ///
    /// assert_eq!(builder.inner().name_value(), ("name", "value"));
    /// assert_eq!(builder.inner().domain(), "www.rust-lang.org");
    /// assert_eq!(builder.inner().path(), "/");
    /// assert!(builder.inner().http_only());
    /// assert!(!builder.inner().secure());
    /// ```
    #[inline]
    pub fn inner(&self) -> &Cookie {
        &self.cookie
    }

    /// Returns a mutable borrow to the cookie currently being built.
    #[inline]
    pub fn inner_mut(&mut self) -> &mut Cookie {
        &mut self.cookie
    }

    /// Finishes building and returns the built `Cookie`.
    #[inline]
    pub fn build(self) -> Cookie {
        self.cookie
    }
}

impl std::fmt::Display for CookieBuilder {
    #[inline(always)]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.cookie.fmt(f)
    }
}

impl Borrow<Cookie> for CookieBuilder {
    fn borrow(&self) -> &Cookie {
        &self.cookie
    }
}

impl AsRef<Cookie> for CookieBuilder {
    fn as_ref(&self) -> &Cookie {
        &self.cookie
    }
}

impl PartialEq<Cookie> for CookieBuilder {
    fn eq(&self, other: &Cookie) -> bool {
        &self.cookie == other
    }
}

impl PartialEq<CookieBuilder> for Cookie {
    fn eq(&self, other: &CookieBuilder) -> bool {
        self == &other.cookie
    }
}

impl From<Cookie> for CookieBuilder {
    fn from(cookie: Cookie) -> Self {
        CookieBuilder { cookie }
    }
}

impl From<CookieBuilder> for Cookie {
    fn from(builder: CookieBuilder) -> Self {
        builder.build()
    }
}
