use std::slice;

use time::OffsetDateTime;

use crate::parse::ParsedCookie;
use crate::{Cookie, Error, Resolver};

/// Iterator over the resolved cookies of a parsed header.
///
/// Returned by [`Resolver::iter()`] and [`Resolver::iter_at()`]. Every cookie
/// is resolved against the same instant.
#[derive(Debug, Clone)]
pub struct ResolvedCookies<'r, 'h> {
    resolver: &'r Resolver,
    cookies: slice::Iter<'h, ParsedCookie>,
    now: OffsetDateTime,
}

impl<'r, 'h> ResolvedCookies<'r, 'h> {
    pub(crate) fn new(
        resolver: &'r Resolver,
        cookies: &'h [ParsedCookie],
        now: OffsetDateTime,
    ) -> Self {
        ResolvedCookies { resolver, cookies: cookies.iter(), now }
    }
}

impl Iterator for ResolvedCookies<'_, '_> {
    type Item = Result<Cookie, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let parsed = self.cookies.next()?;
            if let Some(result) = self.resolver.resolve_at(parsed, self.now).transpose() {
                return Some(result);
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.cookies.size_hint().1)
    }
}

#[cfg(test)]
mod tests {
    use crate::parse::{NameValuePair, ParsedCookie, ParsedSetCookieHeader};
    use crate::Resolver;
    use time::macros::datetime;

    #[test]
    fn skips_empty_cookies() {
        let header = ParsedSetCookieHeader::parse("a=1, b=2");
        let cookies = header.into_cookies();
        let with_gap = vec![
            ParsedCookie::default(),
            cookies[0].clone(),
            ParsedCookie::default(),
            cookies[1].clone(),
        ];

        let resolver = Resolver::new("example.com").unwrap();
        let now = datetime!(2020-01-01 0:00 UTC);
        let names: Vec<_> = super::ResolvedCookies::new(&resolver, &with_gap, now)
            .map(|c| c.unwrap().name().to_owned())
            .collect();

        assert_eq!(names, ["a", "b"]);

        let header = ParsedSetCookieHeader::parse(",a=1,, ,b=2");
        assert_eq!(header.cookies().len(), 5);
        let names: Vec<_> = resolver.iter_at(&header, now)
            .map(|c| c.unwrap().name().to_owned())
            .collect();

        assert_eq!(names, ["a", "b"]);
    }

    #[test]
    fn shares_one_instant() {
        let header = ParsedSetCookieHeader::parse("a=1; max-age=1, b=2; max-age=1");
        let resolver = Resolver::new("example.com").unwrap();

        let cookies: Vec<_> = resolver.iter(&header).map(Result::unwrap).collect();
        assert_eq!(cookies.len(), 2);
        assert_eq!(cookies[0].created(), cookies[1].created());
        assert_eq!(cookies[0].expires(), cookies[1].expires());

        let single = ParsedCookie::from(vec![NameValuePair::new("x", "y")]);
        assert_eq!(resolver.iter(&header).size_hint(), (0, Some(2)));
        assert!(resolver.resolve(&single).unwrap().is_some());
    }
}
