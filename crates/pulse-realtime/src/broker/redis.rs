//! Redis pub/sub broker for multi-node deployments.

#[cfg(feature = "redis-pubsub")]
pub mod implementation {
    use async_trait::async_trait;
    use bytes::Bytes;
    use futures::StreamExt;
    use ::redis::AsyncCommands;
    use ::redis::Client;
    use ::redis::aio::ConnectionManager;
    use tracing::{debug, info};

    use pulse_core::error::{AppError, ErrorKind};
    use pulse_core::result::AppResult;

    use crate::broker::{Broker, PayloadStream};

    /// Redis pub/sub broker.
    ///
    /// Publishing goes through one shared, reconnecting connection; every
    /// subscription opens its own dedicated pub/sub connection, closed when
    /// the returned stream is dropped.
    #[derive(Clone)]
    pub struct RedisBroker {
        client: Client,
        publisher: ConnectionManager,
    }

    impl std::fmt::Debug for RedisBroker {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("RedisBroker").finish()
        }
    }

    impl RedisBroker {
        /// Connects to Redis at `url`.
        pub async fn connect(url: &str) -> AppResult<Self> {
            info!(url = %mask_redis_url(url), "Connecting to Redis broker");

            let client = Client::open(url).map_err(|e| {
                AppError::with_source(ErrorKind::Broker, "Failed to create Redis client", e)
            })?;

            let publisher = ConnectionManager::new(client.clone()).await.map_err(|e| {
                AppError::with_source(ErrorKind::Broker, "Failed to connect to Redis", e)
            })?;

            info!("Successfully connected to Redis broker");
            Ok(Self { client, publisher })
        }
    }

    #[async_trait]
    impl Broker for RedisBroker {
        async fn subscribe(&self, channel: &str) -> AppResult<PayloadStream> {
            let mut pubsub = self.client.get_async_pubsub().await.map_err(|e| {
                AppError::with_source(ErrorKind::Broker, "Failed to open Redis pub/sub connection", e)
            })?;

            pubsub.subscribe(channel).await.map_err(|e| {
                AppError::with_source(ErrorKind::Broker, format!("SUBSCRIBE {channel} failed"), e)
            })?;

            debug!(channel = %channel, "Subscribed to Redis channel");

            Ok(pubsub
                .into_on_message()
                .map(|msg| Bytes::copy_from_slice(msg.get_payload_bytes()))
                .boxed())
        }

        async fn publish(&self, channel: &str, payload: Bytes) -> AppResult<usize> {
            let mut conn = self.publisher.clone();
            let receivers: i64 = conn.publish(channel, payload.as_ref()).await.map_err(|e| {
                AppError::with_source(ErrorKind::Broker, format!("PUBLISH {channel} failed"), e)
            })?;

            Ok(usize::try_from(receivers).unwrap_or(0))
        }
    }

    /// Mask password in Redis URL for safe logging.
    fn mask_redis_url(url: &str) -> String {
        if let Some(at_pos) = url.find('@') {
            if let Some(colon_pos) = url[..at_pos].rfind(':') {
                let scheme_end = url.find("://").map(|p| p + 3).unwrap_or(0);
                if colon_pos > scheme_end {
                    return format!("{}:****@{}", &url[..colon_pos], &url[at_pos + 1..]);
                }
            }
        }
        url.to_string()
    }

}

#[cfg(not(feature = "redis-pubsub"))]
pub mod implementation {
    use async_trait::async_trait;
    use bytes::Bytes;

    use pulse_core::error::AppError;
    use pulse_core::result::AppResult;

    use crate::broker::{Broker, PayloadStream};

    /// Placeholder when the `redis-pubsub` feature is disabled; never constructed.
    #[derive(Debug, Clone)]
    pub struct RedisBroker;

    impl RedisBroker {
        /// Always fails: the binary was built without Redis support.
        pub async fn connect(_url: &str) -> AppResult<Self> {
            Err(AppError::configuration(
                "Redis broker requested but the `redis-pubsub` feature is disabled",
            ))
        }
    }

    #[async_trait]
    impl Broker for RedisBroker {
        async fn subscribe(&self, _channel: &str) -> AppResult<PayloadStream> {
            Err(AppError::configuration("Redis broker unavailable"))
        }

        async fn publish(&self, _channel: &str, _payload: Bytes) -> AppResult<usize> {
            Err(AppError::configuration("Redis broker unavailable"))
        }
    }
}

pub use implementation::RedisBroker;
