pub mod cache;
pub mod config;
pub mod duration;
pub mod error;
pub mod extract;
pub mod http;
pub mod instructions;
pub mod markdown;
pub mod resolve;
pub mod retry;
pub mod slug;
pub mod types;
pub mod url_path;

pub use cache::{
    connect_with_retry, CacheBackend, Connector, MemoryStore, RecipeCache, RedisBackend,
    RedisConnector,
};
pub use config::CacheConfig;
pub use error::{AcquireError, BackendError, ExtractError, FetchError, ResolveError};
pub use extract::extract_recipe;
pub use http::{BrowserClient, BrowserClientBuilder, HttpClient, MockClient, MockResponse};
pub use markdown::recipe_to_markdown;
pub use resolve::{Processed, Resolver};
pub use retry::{RecordingSleeper, RetryPolicy, Sleeper, TokioSleeper};
pub use types::{CacheEntry, Recipe};
pub use url_path::normalize_url_for_path;
