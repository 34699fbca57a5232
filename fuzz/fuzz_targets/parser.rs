#![no_main]

use libfuzzer_sys::fuzz_target;
use scrape_cookies::{ParsedSetCookieHeader, Resolver};

fuzz_target!(|data: &str| {
    let header = ParsedSetCookieHeader::parse(data);
    let nonempty = header.cookies().iter().filter(|c| !c.is_empty()).count();

    if let Ok(resolver) = Resolver::new("example.com") {
        let cookies = resolver.resolve_all(&header);
        assert!(cookies.len() <= nonempty);
    }
});
