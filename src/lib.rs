//! Lenient `Set-Cookie` header parsing for web scrapers.
//!
//! Real-world servers send `Set-Cookie` headers that stray far from the
//! RFCs: several cookies folded into one header, commas inside `Expires`
//! dates, dates in half a dozen formats, attributes in any case. This crate
//! turns such headers into [`Cookie`] records in three stages:
//!
//!   1. [`ParsedSetCookieHeader::parse`] splits the header into cookies and
//!      `name=value` pairs. It never fails; garbage yields fewer cookies.
//!   2. [`Resolver`] folds each cookie's pairs into a [`Cookie`], applying
//!      defaults for the originating host.
//!   3. [`parse_http_date`] interprets `Expires` values, trying the RFC 7231
//!      formats before a lenient fallback.
//!
//! [`parse_set_cookie_header`] runs the whole pipeline:
//!
//! ```rust
//! use scrape_cookies::parse_set_cookie_header;
//!
//! # fn main() -> Result<(), scrape_cookies::Error> {
//! let header = "__cfduid=d9de; expires=Sun, 02-Jul-17 22:07:33 GMT; path=/; \
//!     domain=.typicode.com; HttpOnly, theme=dark";
//!
//! let cookies = parse_set_cookie_header(header, "typicode.com")?;
//! assert_eq!(cookies.len(), 2);
//! assert_eq!(cookies[0].domain(), ".typicode.com");
//! assert!(cookies[0].http_only());
//! assert_eq!(cookies[1].domain(), "typicode.com");
//! # Ok(())
//! # }
//! ```
//!
//! # Logging
//!
//! Ignored attributes and discarded header input are reported through
//! [`tracing`] at `debug` and `trace` level. No subscriber is installed.
//!
//! # Features
//!
//! This crate can be configured at compile-time through the following Cargo
//! features:
//!
//! * **percent-encode** (disabled by default)
//!
//!   Enables [`Cookie::encoded()`] and [`Cookie::stripped_encoded()`], which
//!   percent-encode the cookie's name and value when displayed.
//!
//! * **serde** (disabled by default)
//!
//!   Implements `Serialize` and `Deserialize` for the parsed and resolved
//!   types.
//!
//! You can enable features via `Cargo.toml`:
//!
//! ```toml
//! [dependencies.scrape-cookies]
//! features = ["percent-encode", "serde"]
//! ```

#![deny(missing_docs)]

mod builder;
mod date;
mod error;
mod expiration;
mod iter;
mod parse;
mod plain;
mod resolve;

use std::fmt;

#[cfg(feature = "percent-encode")]
use percent_encoding::{AsciiSet, CONTROLS};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

pub use crate::builder::CookieBuilder;
pub use crate::date::{format_http_date, parse_http_date};
pub use crate::error::Error;
pub use crate::expiration::Expiration;
pub use crate::iter::ResolvedCookies;
pub use crate::parse::{NameValuePair, ParsedCookie, ParsedSetCookieHeader};
pub use crate::plain::PlainCookie;
#[cfg(feature = "percent-encode")]
pub use crate::plain::{EncodedCookie, PlainEncodedCookie};
pub use crate::resolve::{MaxAgePolicy, Resolver};

/// https://url.spec.whatwg.org/#fragment-percent-encode-set
#[cfg(feature = "percent-encode")]
const FRAGMENT: &AsciiSet = &CONTROLS.add(b' ').add(b'"').add(b'<').add(b'>').add(b'`');

/// https://url.spec.whatwg.org/#path-percent-encode-set
#[cfg(feature = "percent-encode")]
const PATH: &AsciiSet = &FRAGMENT.add(b'#').add(b'?').add(b'{').add(b'}');

/// https://url.spec.whatwg.org/#userinfo-percent-encode-set
#[cfg(feature = "percent-encode")]
const USERINFO: &AsciiSet = &PATH
    .add(b'/')
    .add(b':')
    .add(b';')
    .add(b'=')
    .add(b'@')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'|')
    .add(b'%');

/// Parses a raw `Set-Cookie` header value received from `host`.
///
/// Line breaks in `header` are removed, the header is split into cookies,
/// and each cookie is resolved with the default [`Resolver`] settings. Returns
/// [`Error::MissingHostName`] if `host` is blank; malformed header content is
/// never an error.
///
/// # Example
///
/// ```rust
/// use scrape_cookies::{parse_set_cookie_header, Error};
///
/// let cookies = parse_set_cookie_header("aaa=bbb,ccc=ddd;xxx=yyy", "example.com").unwrap();
/// let names: Vec<_> = cookies.iter().map(|c| c.name()).collect();
/// assert_eq!(names, ["aaa", "ccc"]);
///
/// assert!(parse_set_cookie_header("xxxxxxxx; xxxx,xxxx", "example.com").unwrap().is_empty());
/// assert_eq!(parse_set_cookie_header("a=b", " "), Err(Error::MissingHostName));
/// ```
pub fn parse_set_cookie_header(header: &str, host: &str) -> Result<Vec<Cookie>, Error> {
    Ok(Resolver::new(host)?.parse(header))
}

/// A cookie resolved from a `Set-Cookie` header.
///
/// Every attribute has a value: cookies resolved from a header default to a
/// path of `/`, the originating host as domain, version `0` and a session
/// expiry. The creation timestamp is informational and does not take part in
/// equality.
///
/// # Constructing a `Cookie`
///
/// Cookies usually come from a [`Resolver`]. To construct one by hand, use
/// [`Cookie::new()`] or [`Cookie::build()`]:
///
/// ```rust
/// use scrape_cookies::Cookie;
///
/// let cookie = Cookie::build("name", "value")
///     .domain("www.rust-lang.org")
///     .path("/docs")
///     .secure(true)
///     .build();
///
/// assert_eq!(cookie.to_string(), "name=value; Secure; Path=/docs; Domain=www.rust-lang.org");
/// assert_eq!(cookie.stripped().to_string(), "name=value");
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Cookie {
    /// The cookie's name.
    name: String,
    /// The cookie's value.
    value: String,
    /// The cookie's domain.
    domain: String,
    /// The cookie's path.
    path: String,
    /// The cookie's expiration.
    expires: Expiration,
    /// Whether this cookie was marked Secure.
    secure: bool,
    /// Whether this cookie was marked HttpOnly.
    http_only: bool,
    /// The cookie's version attribute.
    version: i32,
    /// When the cookie was created.
    created: OffsetDateTime,
}

impl Cookie {
    /// Creates a new `Cookie` with the given name and value, a path of `/`,
    /// no domain, and the current time as creation timestamp.
    ///
    /// # Example
    ///
    /// ```rust
    /// use scrape_cookies::Cookie;
    ///
    /// let cookie = Cookie::new("name", "value");
    /// assert_eq!(cookie.name_value(), ("name", "value"));
    /// assert_eq!(cookie.path(), "/");
    /// assert_eq!(cookie.domain(), "");
    /// ```
    pub fn new<N, V>(name: N, value: V) -> Cookie
        where N: Into<String>,
              V: Into<String>
    {
        Cookie {
            name: name.into(),
            value: value.into(),
            domain: String::new(),
            path: String::from("/"),
            expires: Expiration::Session,
            secure: false,
            http_only: false,
            version: 0,
            created: OffsetDateTime::now_utc(),
        }
    }

    /// Creates a new `CookieBuilder` starting from the given name and value.
    ///
    /// # Example
    ///
    /// ```rust
    /// use scrape_cookies::Cookie;
    ///
    /// let c = Cookie::build("foo", "bar").version(1).build();
    /// assert_eq!(c.name_value(), ("foo", "bar"));
    /// assert_eq!(c.version(), 1);
    /// ```
    pub fn build<N, V>(name: N, value: V) -> CookieBuilder
        where N: Into<String>,
              V: Into<String>
    {
        CookieBuilder::new(name, value)
    }

    /// Returns the name of `self`.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the value of `self`, exactly as the server sent it.
    #[inline]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Returns the name and value of `self` as a tuple of `(name, value)`.
    #[inline]
    pub fn name_value(&self) -> (&str, &str) {
        (self.name(), self.value())
    }

    /// Returns the `Domain` of the cookie.
    #[inline]
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Returns the `Path` of the cookie.
    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the cookie's expiration.
    ///
    /// # Example
    ///
    /// ```rust
    /// use scrape_cookies::{Cookie, Expiration};
    /// use time::macros::datetime;
    ///
    /// let mut c = Cookie::new("name", "value");
    /// assert_eq!(c.expires(), Expiration::Session);
    ///
    /// c.set_expires(datetime!(2017-07-02 22:07:33 UTC));
    /// assert!(c.expires().is_datetime());
    /// ```
    #[inline]
    pub fn expires(&self) -> Expiration {
        self.expires
    }

    /// Returns the expiry date-time, or `None` for session cookies.
    #[inline]
    pub fn expires_datetime(&self) -> Option<OffsetDateTime> {
        self.expires.datetime()
    }

    /// Returns whether this cookie was marked `Secure`.
    #[inline]
    pub fn secure(&self) -> bool {
        self.secure
    }

    /// Returns whether this cookie was marked `HttpOnly`.
    #[inline]
    pub fn http_only(&self) -> bool {
        self.http_only
    }

    /// Returns the cookie's `Version` attribute, `0` if none was given.
    #[inline]
    pub fn version(&self) -> i32 {
        self.version
    }

    /// Returns when the cookie was created.
    #[inline]
    pub fn created(&self) -> OffsetDateTime {
        self.created
    }

    /// Whether the cookie has expired at `now`. Session cookies never expire.
    ///
    /// # Example
    ///
    /// ```rust
    /// use scrape_cookies::Cookie;
    /// use time::macros::datetime;
    ///
    /// let c = Cookie::build("a", "b").expires(datetime!(2017-07-02 22:07:33 UTC)).build();
    /// assert!(c.expired_at(datetime!(2017-07-02 22:07:33 UTC)));
    /// assert!(!c.expired_at(datetime!(2017-07-02 22:07:32 UTC)));
    /// assert!(!Cookie::new("a", "b").expired_at(datetime!(9999-01-01 0:00 UTC)));
    /// ```
    pub fn expired_at(&self, now: OffsetDateTime) -> bool {
        self.expires.datetime().map_or(false, |expires| expires <= now)
    }

    /// Whether the cookie has expired by the current time.
    pub fn expired(&self) -> bool {
        self.expired_at(OffsetDateTime::now_utc())
    }

    /// Sets the name of `self` to `name`.
    pub fn set_name<N: Into<String>>(&mut self, name: N) {
        self.name = name.into();
    }

    /// Sets the value of `self` to `value`.
    pub fn set_value<V: Into<String>>(&mut self, value: V) {
        self.value = value.into();
    }

    /// Sets the `Domain` of `self` to `domain`.
    pub fn set_domain<D: Into<String>>(&mut self, domain: D) {
        self.domain = domain.into();
    }

    /// Sets the `Path` of `self` to `path`.
    pub fn set_path<P: Into<String>>(&mut self, path: P) {
        self.path = path.into();
    }

    /// Sets the expiration of `self`. See [`Expiration`] for conversions.
    ///
    /// # Example
    ///
    /// ```rust
    /// use scrape_cookies::{Cookie, Expiration};
    /// use time::OffsetDateTime;
    ///
    /// let mut c = Cookie::new("name", "value");
    /// c.set_expires(OffsetDateTime::now_utc());
    /// assert!(c.expires().is_datetime());
    ///
    /// c.set_expires(None);
    /// assert_eq!(c.expires(), Expiration::Session);
    /// ```
    pub fn set_expires<E: Into<Expiration>>(&mut self, when: E) {
        self.expires = when.into();
    }

    /// Sets the value of the `Secure` flag.
    #[inline]
    pub fn set_secure(&mut self, value: bool) {
        self.secure = value;
    }

    /// Sets the value of the `HttpOnly` flag.
    #[inline]
    pub fn set_http_only(&mut self, value: bool) {
        self.http_only = value;
    }

    /// Sets the `Version` attribute.
    #[inline]
    pub fn set_version(&mut self, version: i32) {
        self.version = version;
    }

    /// Sets the creation timestamp.
    #[inline]
    pub fn set_created(&mut self, at: OffsetDateTime) {
        self.created = at;
    }

    /// Wraps `self` in a [`PlainCookie`] that displays as `name=value`, the
    /// form used in a `Cookie` request header.
    #[inline]
    pub fn stripped(&self) -> PlainCookie<'_> {
        PlainCookie(self)
    }

    /// Like [`Cookie::stripped()`], percent-encoding the name and value.
    #[cfg(feature = "percent-encode")]
    #[inline]
    pub fn stripped_encoded(&self) -> PlainEncodedCookie<'_> {
        PlainEncodedCookie(self)
    }

    /// Wraps `self` in an [`EncodedCookie`] that displays like `self`, with
    /// the name and value percent-encoded.
    #[cfg(feature = "percent-encode")]
    #[inline]
    pub fn encoded(&self) -> EncodedCookie<'_> {
        EncodedCookie(self)
    }

    fn fmt_parameters(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.http_only() {
            write!(f, "; HttpOnly")?;
        }

        if self.secure() {
            write!(f, "; Secure")?;
        }

        if !self.path().is_empty() {
            write!(f, "; Path={}", self.path())?;
        }

        if !self.domain().is_empty() {
            write!(f, "; Domain={}", self.domain())?;
        }

        if self.version() != 0 {
            write!(f, "; Version={}", self.version())?;
        }

        if let Some(time) = self.expires_datetime().and_then(format_http_date) {
            write!(f, "; Expires={}", time)?;
        }

        Ok(())
    }
}

impl PartialEq for Cookie {
    fn eq(&self, other: &Cookie) -> bool {
        self.name == other.name
            && self.value == other.value
            && self.domain == other.domain
            && self.path == other.path
            && self.expires == other.expires
            && self.secure == other.secure
            && self.http_only == other.http_only
            && self.version == other.version
    }
}

impl Eq for Cookie {}

impl fmt::Display for Cookie {
    /// Formats the cookie `self` as a `Set-Cookie` header value.
    ///
    /// # Example
    ///
    /// ```rust
    /// use scrape_cookies::Cookie;
    ///
    /// let mut cookie = Cookie::new("foo", "bar");
    /// cookie.set_http_only(true);
    /// assert_eq!(cookie.to_string(), "foo=bar; HttpOnly; Path=/");
    /// ```
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name(), self.value())?;
        self.fmt_parameters(f)
    }
}
