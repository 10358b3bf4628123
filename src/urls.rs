// src/urls.rs
// The compiled-in list of sites to fetch, in the order they are enqueued.

pub const URLS: &[&str] = &[
    "http://yahoo.com",
    "http://google.com",
    "http://zurmo.com",
    "http://www.gravity.com",
    "http://facebook.com",
    "http://www.tripadvisor.com",
    "http://www.booking.com",
    "http://aaaro02.com",
];

pub fn default_urls() -> Vec<String> {
    URLS.iter().map(|url| url.to_string()).collect()
}
