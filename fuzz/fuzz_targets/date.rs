#![no_main]

use libfuzzer_sys::fuzz_target;
use scrape_cookies::{format_http_date, parse_http_date};

fuzz_target!(|data: &str| {
    if let Some(datetime) = parse_http_date(data) {
        // Anything we accept must survive a trip through the preferred format.
        if let Some(formatted) = format_http_date(datetime) {
            assert_eq!(parse_http_date(&formatted), Some(datetime));
        }
    }
});
