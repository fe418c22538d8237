//! # Redis
//!
//! Shared cache backend. Entries are JSON strings under `recipe:{key}` with a
//! 30 day expiry, so several server processes can serve one cache.
//!
//! Calls go through a `ConnectionManager`, which redials after Redis restarts
//! or a dropped socket. It is cheap to clone; each call takes its own clone
//! rather than locking a shared one.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};

use super::{connect_with_retry, CacheBackend, Connector};
use crate::config::CacheConfig;
use crate::error::BackendError;
use crate::retry::Sleeper;

/// Upper bound on opening a single connection.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens a managed Redis connection and pings it.
pub struct RedisConnector {
    url: String,
}

impl RedisConnector {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.redis_url())
    }
}

#[async_trait]
impl Connector for RedisConnector {
    type Handle = RedisBackend;

    async fn connect(&self) -> Result<RedisBackend, BackendError> {
        let client = Client::open(self.url.as_str())?;

        let mut conn = tokio::time::timeout(CONNECT_TIMEOUT, client.get_connection_manager())
            .await
            .map_err(|_| {
                BackendError::Unavailable(format!(
                    "connect timed out after {}s",
                    CONNECT_TIMEOUT.as_secs()
                ))
            })??;

        let pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        tracing::debug!(url = %self.url, %pong, "redis ping");

        Ok(RedisBackend { conn })
    }
}

#[derive(Clone)]
pub struct RedisBackend {
    conn: ConnectionManager,
}

impl RedisBackend {
    /// Connect using the configured address and retry policy.
    pub async fn connect(config: &CacheConfig, sleeper: &dyn Sleeper) -> Option<Self> {
        let connector = RedisConnector::from_config(config);
        tracing::info!(
            host = %config.redis_host,
            port = config.redis_port,
            "connecting to redis"
        );
        connect_with_retry(&connector, &config.connect_policy(), sleeper).await
    }
}

#[async_trait]
impl CacheBackend for RedisBackend {
    fn name(&self) -> &'static str {
        "redis"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, BackendError> {
        let mut conn = self.conn.clone();
        Ok(conn.get::<_, Option<String>>(key).await?)
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), BackendError> {
        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(key, value, ttl.as_secs()).await?;
        Ok(())
    }

    async fn keys(&self, pattern: &str) -> Result<Vec<String>, BackendError> {
        let mut conn = self.conn.clone();
        Ok(conn.keys::<_, Vec<String>>(pattern).await?)
    }

    async fn delete(&self, key: &str) -> Result<(), BackendError> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(key).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::{RecordingSleeper, RetryPolicy};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
    use tokio::net::tcp::OwnedReadHalf;
    use tokio::net::{TcpListener, TcpStream};

    /// Read one RESP array command, e.g. `*2\r\n$3\r\nGET\r\n$1\r\nk\r\n`.
    async fn read_command(reader: &mut BufReader<OwnedReadHalf>) -> Option<Vec<String>> {
        let mut line = String::new();
        if reader.read_line(&mut line).await.ok()? == 0 {
            return None;
        }
        let count: usize = line.trim_end().strip_prefix('*')?.parse().ok()?;

        let mut args = Vec::with_capacity(count);
        for _ in 0..count {
            line.clear();
            reader.read_line(&mut line).await.ok()?;
            let len: usize = line.trim_end().strip_prefix('$')?.parse().ok()?;
            let mut buf = vec![0u8; len + 2];
            reader.read_exact(&mut buf).await.ok()?;
            buf.truncate(len);
            args.push(String::from_utf8(buf).ok()?);
        }
        Some(args)
    }

    /// Answers PING and GET (always a miss); everything else gets +OK.
    async fn serve(socket: TcpStream, close_after_get: bool) {
        let (read, mut write) = socket.into_split();
        let mut reader = BufReader::new(read);

        while let Some(args) = read_command(&mut reader).await {
            let command = args
                .first()
                .map(|c| c.to_ascii_uppercase())
                .unwrap_or_default();
            let reply = match command.as_str() {
                "PING" => "+PONG\r\n",
                "GET" => "$-1\r\n",
                _ => "+OK\r\n",
            };
            if write.write_all(reply.as_bytes()).await.is_err() {
                return;
            }
            if close_after_get && command == "GET" {
                return;
            }
        }
    }

    /// Redis stand-in whose first connection dies after its first GET.
    async fn spawn_flaky_redis() -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let accepted = Arc::new(AtomicUsize::new(0));
        let counter = accepted.clone();

        tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                let first = counter.fetch_add(1, Ordering::SeqCst) == 0;
                tokio::spawn(serve(socket, first));
            }
        });

        (format!("redis://{}/", addr), accepted)
    }

    #[tokio::test]
    async fn test_backend_redials_after_dropped_connection() {
        let (url, accepted) = spawn_flaky_redis().await;
        let backend = RedisConnector::new(url).connect().await.unwrap();

        assert_eq!(backend.get("recipe:pie").await.unwrap(), None);

        let mut recovered = false;
        for _ in 0..50 {
            if backend.get("recipe:pie").await.is_ok() {
                recovered = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }

        assert!(recovered, "backend never recovered from the dropped connection");
        assert!(accepted.load(Ordering::SeqCst) >= 2);
    }

    #[tokio::test]
    async fn test_unparsable_url_is_a_failed_attempt() {
        let connector = RedisConnector::new("not a redis url");
        let sleeper = RecordingSleeper::new();
        let policy = RetryPolicy::exponential(2, Duration::from_millis(10));

        let handle = connect_with_retry(&connector, &policy, &sleeper).await;

        assert!(handle.is_none());
        assert_eq!(sleeper.sleeps(), vec![Duration::from_millis(10)]);
    }

    #[test]
    fn test_connector_from_config() {
        let config = CacheConfig {
            redis_host: "cache.internal".to_string(),
            redis_port: 6380,
            ..CacheConfig::default()
        };
        assert_eq!(
            RedisConnector::from_config(&config).url,
            "redis://cache.internal:6380/"
        );
    }
}
