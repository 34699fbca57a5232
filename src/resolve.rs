//! Folding parsed `Set-Cookie` pairs into [`Cookie`] records.

use time::macros::datetime;
use time::{Duration, OffsetDateTime};

use crate::date::parse_http_date;
use crate::iter::ResolvedCookies;
use crate::parse::{NameValuePair, ParsedCookie, ParsedSetCookieHeader};
use crate::{Cookie, Error};

/// Latest expiry a `Max-Age` can produce.
const FAR_FUTURE: OffsetDateTime = datetime!(9999-12-31 23:59:59 UTC);

/// What to do with a `Max-Age` attribute whose value is not an integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaxAgePolicy {
    /// Ignore the attribute, as is done for any other malformed attribute.
    /// An `Expires` attribute on the same cookie then applies.
    Lenient,
    /// Fail the whole cookie with [`Error::InvalidMaxAge`].
    Strict,
}

impl Default for MaxAgePolicy {
    fn default() -> Self {
        MaxAgePolicy::Lenient
    }
}

/// Resolves parsed cookies for responses from a single host.
///
/// The host becomes the `Domain` of every cookie that does not name one. A
/// resolver holds no other state and may be shared freely between threads.
///
/// # Example
///
/// ```rust
/// use scrape_cookies::{Resolver, ParsedSetCookieHeader};
///
/// # fn main() -> Result<(), scrape_cookies::Error> {
/// let resolver = Resolver::new("example.com")?;
///
/// let header = ParsedSetCookieHeader::parse("sid=1; Secure, lang=en; Domain=.example.com");
/// let cookies = resolver.resolve_all(&header);
///
/// assert_eq!(cookies[0].domain(), "example.com");
/// assert!(cookies[0].secure());
/// assert_eq!(cookies[1].domain(), ".example.com");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolver {
    host: String,
    max_age_policy: MaxAgePolicy,
}

impl Resolver {
    /// Creates a resolver for cookies received from `host`.
    ///
    /// Returns [`Error::MissingHostName`] if `host` is empty or only
    /// whitespace.
    pub fn new<H: Into<String>>(host: H) -> Result<Resolver, Error> {
        let host = host.into();
        let trimmed = host.trim();
        if trimmed.is_empty() {
            return Err(Error::MissingHostName);
        }

        let host = if trimmed.len() == host.len() { host } else { trimmed.to_owned() };
        Ok(Resolver { host, max_age_policy: MaxAgePolicy::default() })
    }

    /// Sets the handling of unparsable `Max-Age` values.
    ///
    /// # Example
    ///
    /// ```rust
    /// use scrape_cookies::{Error, MaxAgePolicy, ParsedCookie, Resolver};
    ///
    /// let parsed = ParsedCookie::parse("sid=1; Max-Age=soon");
    ///
    /// let lenient = Resolver::new("example.com").unwrap();
    /// assert!(lenient.resolve(&parsed).unwrap().is_some());
    ///
    /// let strict = lenient.max_age_policy(MaxAgePolicy::Strict);
    /// assert!(matches!(strict.resolve(&parsed), Err(Error::InvalidMaxAge { .. })));
    /// ```
    pub fn max_age_policy(mut self, policy: MaxAgePolicy) -> Self {
        self.max_age_policy = policy;
        self
    }

    /// The default domain for resolved cookies.
    #[inline]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The configured `Max-Age` handling.
    #[inline]
    pub fn policy(&self) -> MaxAgePolicy {
        self.max_age_policy
    }

    /// Resolves `parsed` against the current time.
    ///
    /// Returns `Ok(None)` if nothing was parsed. See [`Resolver::resolve_at`].
    pub fn resolve(&self, parsed: &ParsedCookie) -> Result<Option<Cookie>, Error> {
        self.resolve_at(parsed, OffsetDateTime::now_utc())
    }

    /// Resolves `parsed` as if it were received at `now`.
    ///
    /// The first pair supplies the cookie's name and value. Attributes are
    /// then applied in order, matching names case-insensitively:
    ///
    ///   * `HttpOnly` and `Secure` set their flag, whatever their value.
    ///   * `Path` and `Domain` replace the current value; an empty value
    ///     restores the default (`/` and the resolver's host).
    ///   * `Max-Age` sets the expiry to `now` plus the given seconds.
    ///   * `Expires` sets the expiry, unless the cookie carries a valid
    ///     `Max-Age` anywhere.
    ///   * `Version` sets the version if it is an integer.
    ///
    /// Later attributes override earlier ones. Anything else is ignored, as
    /// are values that fail to parse. The exception is a malformed `Max-Age`
    /// under [`MaxAgePolicy::Strict`].
    ///
    /// # Example
    ///
    /// ```rust
    /// use scrape_cookies::{ParsedCookie, Resolver};
    /// use time::macros::datetime;
    ///
    /// let resolver = Resolver::new("example.com").unwrap();
    /// let now = datetime!(2020-01-01 0:00 UTC);
    ///
    /// let parsed = ParsedCookie::parse("a=b; max-age=60; expires=Sun, 06 Nov 1994 08:49:37 GMT");
    /// let cookie = resolver.resolve_at(&parsed, now).unwrap().unwrap();
    /// assert_eq!(cookie.expires_datetime(), Some(datetime!(2020-01-01 0:01 UTC)));
    /// ```
    pub fn resolve_at(
        &self,
        parsed: &ParsedCookie,
        now: OffsetDateTime,
    ) -> Result<Option<Cookie>, Error> {
        let (first, attributes) = match parsed.pairs().split_first() {
            Some(split) => split,
            None => return Ok(None),
        };

        let mut cookie = Cookie::build(first.name(), first.value())
            .domain(self.host.as_str())
            .created(now)
            .build();

        let has_max_age = attributes.iter()
            .any(|pair| pair.is("max-age") && pair.value().trim().parse::<i64>().is_ok());
        for pair in attributes {
            self.apply(&mut cookie, pair, has_max_age, now)?;
        }

        Ok(Some(cookie))
    }

    fn apply(
        &self,
        cookie: &mut Cookie,
        pair: &NameValuePair,
        has_max_age: bool,
        now: OffsetDateTime,
    ) -> Result<(), Error> {
        let value = pair.value();
        if pair.is("httponly") {
            cookie.set_http_only(true);
        } else if pair.is("secure") {
            cookie.set_secure(true);
        } else if pair.is("path") {
            cookie.set_path(if value.is_empty() { "/" } else { value });
        } else if pair.is("domain") {
            cookie.set_domain(if value.is_empty() { self.host.as_str() } else { value });
        } else if pair.is("max-age") {
            match value.trim().parse::<i64>() {
                Ok(seconds) => cookie.set_expires(max_age_expiry(now, seconds)),
                Err(source) if self.max_age_policy == MaxAgePolicy::Strict => {
                    return Err(Error::InvalidMaxAge {
                        cookie: cookie.name().to_owned(),
                        value: value.to_owned(),
                        source,
                    });
                }
                Err(e) => {
                    tracing::debug!(cookie = cookie.name(), value, error = %e,
                        "ignoring unparsable Max-Age");
                }
            }
        } else if pair.is("expires") {
            if has_max_age {
                return Ok(());
            }

            match parse_http_date(value) {
                Some(expires) => cookie.set_expires(expires),
                None => tracing::debug!(cookie = cookie.name(), value, "ignoring unparsable Expires"),
            }
        } else if pair.is("version") {
            match value.trim().parse::<i32>() {
                Ok(version) => cookie.set_version(version),
                Err(_) => tracing::debug!(cookie = cookie.name(), value, "ignoring unparsable Version"),
            }
        } else {
            tracing::trace!(cookie = cookie.name(), attribute = pair.name(), "ignoring unknown attribute");
        }

        Ok(())
    }

    /// Lazily resolves every cookie of `header` against the current time.
    ///
    /// Empty parsed cookies are skipped. Errors are yielded in place of the
    /// offending cookie, so the remaining cookies still resolve.
    ///
    /// # Example
    ///
    /// ```rust
    /// use scrape_cookies::{MaxAgePolicy, ParsedSetCookieHeader, Resolver};
    ///
    /// let resolver = Resolver::new("example.com").unwrap()
    ///     .max_age_policy(MaxAgePolicy::Strict);
    ///
    /// let header = ParsedSetCookieHeader::parse("a=1; Max-Age=x, b=2");
    /// let results: Vec<_> = resolver.iter(&header).collect();
    /// assert!(results[0].is_err());
    /// assert_eq!(results[1].as_ref().unwrap().name(), "b");
    /// ```
    pub fn iter<'r, 'h>(&'r self, header: &'h ParsedSetCookieHeader) -> ResolvedCookies<'r, 'h> {
        self.iter_at(header, OffsetDateTime::now_utc())
    }

    /// Like [`Resolver::iter`], resolving every cookie as if received at
    /// `now`.
    pub fn iter_at<'r, 'h>(
        &'r self,
        header: &'h ParsedSetCookieHeader,
        now: OffsetDateTime,
    ) -> ResolvedCookies<'r, 'h> {
        ResolvedCookies::new(self, header.cookies(), now)
    }

    /// Resolves every cookie of `header`, in header order.
    ///
    /// Cookies that fail to resolve are logged and left out.
    pub fn resolve_all(&self, header: &ParsedSetCookieHeader) -> Vec<Cookie> {
        self.iter(header)
            .filter_map(|result| match result {
                Ok(cookie) => Some(cookie),
                Err(e) => {
                    tracing::warn!(host = %self.host, error = %e, "dropping cookie");
                    None
                }
            })
            .collect()
    }

    /// Parses and resolves a raw `Set-Cookie` header value.
    ///
    /// Carriage returns and line feeds are removed first, joining folded
    /// header lines.
    pub fn parse(&self, header: &str) -> Vec<Cookie> {
        let header = if header.contains(|c| c == '\r' || c == '\n') {
            header.replace(|c| c == '\r' || c == '\n', "")
        } else {
            header.to_owned()
        };

        self.resolve_all(&ParsedSetCookieHeader::parse(&header))
    }
}

/// `now + seconds`, clamped to the representable range.
fn max_age_expiry(now: OffsetDateTime, seconds: i64) -> OffsetDateTime {
    now.checked_add(Duration::seconds(seconds)).unwrap_or(match seconds {
        s if s < 0 => OffsetDateTime::UNIX_EPOCH,
        _ => FAR_FUTURE,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Expiration;
    use pretty_assertions::assert_eq;

    const HOST: &str = "example.com";
    const NOW: OffsetDateTime = datetime!(2016-05-02 0:00 UTC);

    fn resolver() -> Resolver {
        Resolver::new(HOST).unwrap()
    }

    fn resolve(s: &str) -> Cookie {
        resolver().resolve_at(&ParsedCookie::parse(s), NOW).unwrap().unwrap()
    }

    #[test]
    fn host_is_required() {
        assert_eq!(Resolver::new(""), Err(Error::MissingHostName));
        assert_eq!(Resolver::new("  \t"), Err(Error::MissingHostName));
        assert_eq!(Resolver::new(" example.com ").unwrap().host(), HOST);
        assert_eq!(resolver().policy(), MaxAgePolicy::Lenient);
    }

    #[test]
    fn empty_cookie_resolves_to_nothing() {
        assert_eq!(resolver().resolve_at(&ParsedCookie::default(), NOW), Ok(None));
        assert_eq!(resolver().resolve(&ParsedCookie::parse("")), Ok(None));
    }

    #[test]
    fn defaults() {
        let cookie = resolve("foo=bar");
        assert_eq!(cookie.name_value(), ("foo", "bar"));
        assert_eq!(cookie.path(), "/");
        assert_eq!(cookie.domain(), HOST);
        assert_eq!(cookie.version(), 0);
        assert_eq!(cookie.expires(), Expiration::Session);
        assert_eq!(cookie.created(), NOW);
        assert!(!cookie.secure());
        assert!(!cookie.http_only());
    }

    #[test]
    fn values_are_verbatim() {
        let cookie = resolve(r#"q="a%20b"; Path=/"#);
        assert_eq!(cookie.value(), r#""a%20b""#);
    }

    #[test]
    fn flags_ignore_case_and_value() {
        let cookie = resolve("a=b; HTTPONLY; sEcUrE");
        assert!(cookie.http_only() && cookie.secure());

        let cookie = resolve("a=b; HttpOnly=false; Secure=0");
        assert!(cookie.http_only() && cookie.secure());
    }

    #[test]
    fn path_and_domain() {
        let cookie = resolve("a=b; PATH=/x; Domain=.example.org");
        assert_eq!(cookie.path(), "/x");
        assert_eq!(cookie.domain(), ".example.org");

        let cookie = resolve("a=b; path=/x; path=/y; domain=a.com; domain=b.com");
        assert_eq!(cookie.path(), "/y");
        assert_eq!(cookie.domain(), "b.com");

        let cookie = resolve("a=b; path=/x; domain=a.com; path=; domain=");
        assert_eq!(cookie.path(), "/");
        assert_eq!(cookie.domain(), HOST);

        let cookie = resolve("a=b; path; domain");
        assert_eq!(cookie.path(), "/");
        assert_eq!(cookie.domain(), HOST);
    }

    #[test]
    fn version() {
        assert_eq!(resolve("a=b; Version=1").version(), 1);
        assert_eq!(resolve("a=b; version=1; version=2").version(), 2);
        assert_eq!(resolve("a=b; Version=1; Version=one").version(), 1);
        assert_eq!(resolve("a=b; Version=").version(), 0);
    }

    #[test]
    fn expires() {
        let cookie = resolve("a=b; expires=Sun, 06 Nov 1994 08:49:37 GMT");
        assert_eq!(cookie.expires_datetime(), Some(datetime!(1994-11-06 08:49:37 UTC)));

        let cookie = resolve("a=b; Expires=Sun, 06 Nov 1994 08:49:37 GMT; EXPIRES=Sun Nov  6 08:49:37 1995");
        assert_eq!(cookie.expires_datetime(), Some(datetime!(1995-11-06 08:49:37 UTC)));
    }

    #[test]
    fn bad_expires_is_ignored() {
        let cookie = resolve("foo=bar; expires=Xxx, 00-Xxx-00 00:00:00 GMT; path=/");
        assert_eq!(cookie.expires(), Expiration::Session);
        assert_eq!(cookie.path(), "/");

        let cookie = resolve("foo=bar; expires=Sun, 06 Nov 1994 08:49:37 GMT; expires=never");
        assert_eq!(cookie.expires_datetime(), Some(datetime!(1994-11-06 08:49:37 UTC)));
    }

    #[test]
    fn max_age_beats_expires_in_any_order() {
        let expected = Some(NOW + Duration::hours(1));

        let cookie = resolve("a=b; max-age=3600; expires=Sun, 06 Nov 1994 08:49:37 GMT");
        assert_eq!(cookie.expires_datetime(), expected);

        let cookie = resolve("a=b; expires=Sun, 06 Nov 1994 08:49:37 GMT; Max-Age=3600");
        assert_eq!(cookie.expires_datetime(), expected);

        let cookie = resolve("a=b; MAX-AGE=60; max-age=3600");
        assert_eq!(cookie.expires_datetime(), expected);
    }

    #[test]
    fn max_age_extremes() {
        assert_eq!(resolve("a=b; max-age=0").expires_datetime(), Some(NOW));
        assert_eq!(resolve("a=b; max-age=-60").expires_datetime(), Some(NOW - Duration::minutes(1)));

        let far = resolve(&format!("a=b; max-age={}", i64::MAX));
        assert_eq!(far.expires_datetime(), Some(FAR_FUTURE));

        let past = resolve(&format!("a=b; max-age={}", i64::MIN));
        assert_eq!(past.expires_datetime(), Some(OffsetDateTime::UNIX_EPOCH));
        assert!(past.expired_at(NOW));

        // Wider than 32 bits is still a number of seconds.
        let wide = resolve("a=b; max-age=2147483648");
        assert_eq!(wide.expires_datetime(), Some(NOW + Duration::seconds(2_147_483_648)));

        let strict = resolver().max_age_policy(MaxAgePolicy::Strict);
        let beyond = ParsedCookie::parse("a=b; max-age=9223372036854775808");
        assert!(strict.resolve_at(&beyond, NOW).is_err());
        let wide = ParsedCookie::parse("a=b; max-age=2147483648");
        assert!(strict.resolve_at(&wide, NOW).is_ok());
    }

    #[test]
    fn lenient_max_age() {
        let cookie = resolve("a=b; max-age=soon; expires=Sun, 06 Nov 1994 08:49:37 GMT; path=/x");
        assert_eq!(cookie.expires_datetime(), Some(datetime!(1994-11-06 08:49:37 UTC)));
        assert_eq!(cookie.path(), "/x");

        let cookie = resolve("a=b; max-age=; expires=garbage");
        assert_eq!(cookie.expires(), Expiration::Session);

        let cookie = resolve("a=b; max-age=soon; max-age=10");
        assert_eq!(cookie.expires_datetime(), Some(NOW + Duration::seconds(10)));
    }

    #[test]
    fn strict_max_age() {
        let strict = resolver().max_age_policy(MaxAgePolicy::Strict);
        let parsed = ParsedCookie::parse("sid=1; Max-Age=soon");

        match strict.resolve_at(&parsed, NOW) {
            Err(Error::InvalidMaxAge { cookie, value, .. }) => {
                assert_eq!(cookie, "sid");
                assert_eq!(value, "soon");
            }
            other => panic!("expected InvalidMaxAge, got {:?}", other),
        }

        let parsed = ParsedCookie::parse("sid=1; Max-Age=10");
        assert!(strict.resolve_at(&parsed, NOW).unwrap().is_some());
    }

    #[test]
    fn unknown_attributes_are_ignored() {
        let expected = resolve("foo=bar");
        assert_eq!(resolve("foo=bar; xxxxxxxxxx; xxxxxxx; xxxxx; xxxxxxxxxx"), expected);
        assert_eq!(resolve("foo=bar; SameSite=Lax; Comment=; Priority=High"), expected);
    }

    #[test]
    fn resolution_is_idempotent() {
        let header = ParsedSetCookieHeader::parse("a=1; path=/x; max-age=60, b=2; secure");
        let first: Vec<_> = resolver().iter_at(&header, NOW).collect::<Result<_, _>>().unwrap();
        let mut second: Vec<_> = resolver().iter_at(&header, NOW).collect::<Result<_, _>>().unwrap();
        for cookie in &mut second {
            cookie.set_created(NOW + Duration::seconds(5));
        }

        assert_eq!(first.len(), 2);
        assert_eq!(first, second);
    }

    #[test]
    fn header_order_is_preserved() {
        let cookies = resolver().parse("aaa=bbb,ccc=ddd");
        let names: Vec<_> = cookies.iter().map(Cookie::name).collect();
        assert_eq!(names, ["aaa", "ccc"]);
    }

    #[test]
    fn empty_segments_are_skipped() {
        let cookies = resolver().parse("a=1,,b=2");
        let names: Vec<_> = cookies.iter().map(Cookie::name).collect();
        assert_eq!(names, ["a", "b"]);

        let cookies = resolver().parse("a=1, ,b=2; path=/x");
        let names: Vec<_> = cookies.iter().map(Cookie::name).collect();
        assert_eq!(names, ["a", "b"]);
        assert_eq!(cookies[1].path(), "/x");
    }

    #[test]
    fn resolve_all_skips_failures() {
        let strict = resolver().max_age_policy(MaxAgePolicy::Strict);
        let header = ParsedSetCookieHeader::parse("a=1; max-age=x, b=2, c=3; max-age=1");
        let names: Vec<_> = strict.resolve_all(&header).into_iter().map(|c| c.name().to_owned()).collect();
        assert_eq!(names, ["b", "c"]);
    }

    #[test]
    fn line_breaks_are_removed() {
        let cookies = resolver().parse("foo=\rline1\nline2\rline3\r\nline4\r\rline5\n");
        assert_eq!(cookies.len(), 1);
        assert_eq!(cookies[0].value(), "line1line2line3line4line5");
    }
}
