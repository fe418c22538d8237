//! Page fetching.
//!
//! Everything that downloads a recipe page goes through [`HttpClient`], so
//! the resolver can run against [`MockClient`] in tests.

mod client;

pub use client::{
    BrowserClient, BrowserClientBuilder, HttpClient, MockClient, MockResponse, BROWSER_USER_AGENT,
    DEFAULT_TIMEOUT,
};
