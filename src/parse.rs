//! The `Set-Cookie` header grammar.
//!
//! Servers frequently fold several cookies into one header, separated by
//! commas, while the `Expires` attribute legally contains a comma of its own
//! (`Sun, 06 Nov 1994 08:49:37 GMT`). The grammar below resolves the
//! ambiguity by giving `expires` a dedicated value rule that swallows the
//! comma following a leading weekday:
//!
//! ```text
//! set-cookie-header = *cookie
//! cookie            = name-value *attribute [ "," ]
//! attribute         = expires-name-value / name-value / name-only
//! expires-name-value = "expires" "=" date-value [ ";" ]   ; case-insensitive
//! name-value        = name "=" value [ ";" ]
//! name-only         = name [ ";" ]
//! name              = 1*( any char except "=" / ";" / "," )
//! value             = *( any char except ";" / "," )
//! date-value        = *letter [ "," ] whitespace *( any char except ";" / "," )
//! ```
//!
//! Whitespace around names, values and delimiters is not significant. Every
//! rule is a function from the remaining input to an optional
//! `(production, rest)` pair; a failing rule consumes nothing, so
//! alternatives are tried from the same position.
//!
//! The grammar never fails: input it cannot make sense of simply produces
//! fewer cookies (or fewer attributes).

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A single `name=value` (or bare `name`) construct from a `Set-Cookie`
/// header.
///
/// Both parts are kept verbatim, apart from surrounding whitespace. A bare
/// name such as `Secure` has an empty value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NameValuePair {
    name: String,
    value: String,
}

impl NameValuePair {
    /// Creates a pair from its parts.
    ///
    /// # Example
    ///
    /// ```rust
    /// use scrape_cookies::NameValuePair;
    ///
    /// let pair = NameValuePair::new("Path", "/docs");
    /// assert_eq!(pair.name(), "Path");
    /// assert_eq!(pair.value(), "/docs");
    /// assert_eq!(pair.to_string(), "Path=/docs");
    /// ```
    pub fn new<N, V>(name: N, value: V) -> NameValuePair
        where N: Into<String>,
              V: Into<String>
    {
        NameValuePair { name: name.into(), value: value.into() }
    }

    /// Creates a pair without a value, such as the `HttpOnly` attribute.
    pub fn name_only<N: Into<String>>(name: N) -> NameValuePair {
        NameValuePair::new(name, String::new())
    }

    /// The name, in its original case.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The value, or `""` if none was given.
    #[inline]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Whether this pair's name matches `name`, ignoring ASCII case.
    #[inline]
    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

impl fmt::Display for NameValuePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

/// One cookie's worth of pairs, in header order.
///
/// The first pair is the cookie's own name and value; the rest are its
/// attributes. An empty header segment, as between the commas of `a=1,,b=2`,
/// produces a `ParsedCookie` with no pairs at all.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ParsedCookie {
    pairs: Vec<NameValuePair>,
}

impl ParsedCookie {
    /// Parses a single cookie from the start of `s`.
    ///
    /// Anything following the cookie (including further cookies) is ignored.
    ///
    /// # Example
    ///
    /// ```rust
    /// use scrape_cookies::ParsedCookie;
    ///
    /// let parsed = ParsedCookie::parse("sid=abc; Path=/; HttpOnly");
    /// assert_eq!(parsed.cookie_pair().map(|p| p.value()), Some("abc"));
    /// assert_eq!(parsed.attributes().len(), 2);
    ///
    /// assert!(ParsedCookie::parse("").is_empty());
    /// ```
    pub fn parse(s: &str) -> ParsedCookie {
        cookie(s).map(|(cookie, _)| cookie).unwrap_or_default()
    }

    /// All pairs, the cookie's own pair first.
    #[inline]
    pub fn pairs(&self) -> &[NameValuePair] {
        &self.pairs
    }

    /// The cookie's own `name=value` pair, if anything was parsed.
    #[inline]
    pub fn cookie_pair(&self) -> Option<&NameValuePair> {
        self.pairs.first()
    }

    /// The attribute pairs following the cookie's own pair.
    #[inline]
    pub fn attributes(&self) -> &[NameValuePair] {
        self.pairs.get(1..).unwrap_or(&[])
    }

    /// Whether nothing was parsed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl From<Vec<NameValuePair>> for ParsedCookie {
    fn from(pairs: Vec<NameValuePair>) -> Self {
        ParsedCookie { pairs }
    }
}

/// Every cookie found in a `Set-Cookie` header, in header order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ParsedSetCookieHeader {
    cookies: Vec<ParsedCookie>,
}

impl ParsedSetCookieHeader {
    /// Parses a raw `Set-Cookie` header value.
    ///
    /// This never fails. Unparsable input at any point ends the parse; the
    /// cookies read so far are kept.
    ///
    /// # Example
    ///
    /// ```rust
    /// use scrape_cookies::ParsedSetCookieHeader;
    ///
    /// let header = ParsedSetCookieHeader::parse(
    ///     "id=1; expires=Sun, 06 Nov 1994 08:49:37 GMT; path=/, lang=en");
    ///
    /// let cookies = header.cookies();
    /// assert_eq!(cookies.len(), 2);
    /// assert_eq!(cookies[0].attributes()[0].value(), "Sun, 06 Nov 1994 08:49:37 GMT");
    /// assert_eq!(cookies[1].cookie_pair().unwrap().name(), "lang");
    /// ```
    pub fn parse(s: &str) -> ParsedSetCookieHeader {
        set_cookie_header(s)
    }

    /// The parsed cookies.
    #[inline]
    pub fn cookies(&self) -> &[ParsedCookie] {
        &self.cookies
    }

    /// Consumes `self`, returning the parsed cookies.
    #[inline]
    pub fn into_cookies(self) -> Vec<ParsedCookie> {
        self.cookies
    }
}

impl<'a> IntoIterator for &'a ParsedSetCookieHeader {
    type Item = &'a ParsedCookie;
    type IntoIter = std::slice::Iter<'a, ParsedCookie>;

    fn into_iter(self) -> Self::IntoIter {
        self.cookies.iter()
    }
}

fn is_separator(c: char) -> bool {
    c == ';' || c == ','
}

/// `=`, surrounded by optional whitespace.
fn equals(s: &str) -> Option<&str> {
    s.trim_start().strip_prefix('=').map(str::trim_start)
}

/// The optional `;` ending a pair, with the whitespace around it.
fn terminator(s: &str) -> &str {
    let s = s.trim_start();
    s.strip_prefix(';').unwrap_or(s).trim_start()
}

fn name(s: &str) -> Option<(&str, &str)> {
    let s = s.trim_start();
    let end = s.find(|c| c == '=' || is_separator(c)).unwrap_or_else(|| s.len());
    let name = s[..end].trim_end();
    if name.is_empty() {
        return None;
    }

    Some((name, &s[end..]))
}

fn value(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    let end = s.find(is_separator).unwrap_or_else(|| s.len());
    (s[..end].trim_end(), &s[end..])
}

/// An `Expires` date: an optional weekday, an optional comma, one required
/// whitespace character, and everything up to the next `;` or `,`. Only the
/// comma directly after the weekday is protected.
fn date_value(s: &str) -> Option<(&str, &str)> {
    let weekday = s.find(|c: char| !c.is_alphabetic()).unwrap_or_else(|| s.len());
    let rest = &s[weekday..];
    let rest = rest.strip_prefix(',').unwrap_or(rest);

    let mut chars = rest.chars();
    match chars.next() {
        Some(c) if c.is_whitespace() => {}
        _ => return None,
    }

    let rest = chars.as_str();
    let end = s.len() - rest.len() + rest.find(is_separator).unwrap_or_else(|| rest.len());
    Some((s[..end].trim_end(), &s[end..]))
}

fn expires_name_value(s: &str) -> Option<(NameValuePair, &str)> {
    const EXPIRES: &str = "expires";

    let s = s.trim_start();
    let name = s.get(..EXPIRES.len()).filter(|n| n.eq_ignore_ascii_case(EXPIRES))?;
    let rest = equals(&s[EXPIRES.len()..])?;
    let (date, rest) = date_value(rest)?;
    Some((NameValuePair::new(name, date), terminator(rest)))
}

fn name_value(s: &str) -> Option<(NameValuePair, &str)> {
    let (name, rest) = name(s)?;
    let (value, rest) = value(equals(rest)?);
    Some((NameValuePair::new(name, value), terminator(rest)))
}

fn name_only(s: &str) -> Option<(NameValuePair, &str)> {
    let (name, rest) = name(s)?;
    Some((NameValuePair::name_only(name), terminator(rest)))
}

/// The `expires` rule must come first: the generic value rule would cut a
/// date short at its comma.
fn attribute(s: &str) -> Option<(NameValuePair, &str)> {
    expires_name_value(s)
        .or_else(|| name_value(s))
        .or_else(|| name_only(s))
}

fn cookie(s: &str) -> Option<(ParsedCookie, &str)> {
    let (pair, mut rest) = name_value(s)?;
    let mut pairs = vec![pair];
    while let Some((pair, next)) = attribute(rest) {
        pairs.push(pair);
        rest = next;
    }

    let rest = rest.strip_prefix(',').unwrap_or(rest);
    Some((ParsedCookie { pairs }, rest))
}

fn set_cookie_header(s: &str) -> ParsedSetCookieHeader {
    let mut cookies = Vec::new();
    let mut rest = s;
    loop {
        if let Some((parsed, next)) = cookie(rest) {
            cookies.push(parsed);
            rest = next;
        } else if let Some(next) = rest.trim_start().strip_prefix(',') {
            // An empty segment between two commas.
            cookies.push(ParsedCookie::default());
            rest = next;
        } else {
            break;
        }
    }

    if !rest.trim().is_empty() {
        tracing::trace!(ignored = rest, "discarding unparsable Set-Cookie input");
    }

    ParsedSetCookieHeader { cookies }
}
