//! Redis store backed by a single multiplexed connection.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client, RedisResult};
use tokio::sync::{Notify, RwLock, watch};
use tokio::task::JoinHandle;

use crate::cache::{CacheError, ConnectionState, KeyValueStore};
use crate::config::settings::RedisConfig;

/// Delay before the first reconnect attempt; doubles up to the max.
const RECONNECT_DELAY_MIN: Duration = Duration::from_millis(100);
const RECONNECT_DELAY_MAX: Duration = Duration::from_secs(5);

/// Redis-backed store.
///
/// A supervisor task spawned from [`RedisStore::connect`] owns the session.
/// It negotiates the connection, `PING`s it while idle and reconnects with
/// backoff whenever a request or health check sees a transport failure.
/// While no session is up, requests fail fast with [`CacheError::NotReady`]
/// (first negotiation) or [`CacheError::Transport`] (session lost). All
/// requests share one multiplexed connection.
pub struct RedisStore {
    shared: Arc<Shared>,
    supervisor: Mutex<Option<JoinHandle<()>>>,
}

struct Shared {
    conn: RwLock<Option<MultiplexedConnection>>,
    state: watch::Sender<ConnectionState>,
    /// Wakes the supervisor when a request loses the session.
    lost: Notify,
}

impl Shared {
    fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Move to `next` unless the owner already closed the store.
    fn transition(&self, next: ConnectionState) -> bool {
        self.state.send_if_modified(|current| {
            if *current == ConnectionState::Closed || *current == next {
                false
            } else {
                *current = next;
                true
            }
        })
    }

    /// Publish a fresh session. Returns `false` if the store was closed.
    async fn install(&self, conn: MultiplexedConnection) -> bool {
        let mut slot = self.conn.write().await;
        if self.state() == ConnectionState::Closed {
            return false;
        }
        *slot = Some(conn);
        self.transition(ConnectionState::Connected);
        true
    }

    /// Record that the session is down. Only the first report is logged.
    fn mark_lost(&self, reason: &str) -> bool {
        let changed = self.transition(ConnectionState::Disconnected);
        if changed {
            tracing::error!("Redis client not connected to the server: {}", reason);
            self.lost.notify_one();
        }
        changed
    }
}

#[derive(Debug, Clone, Copy)]
struct Timing {
    connect_timeout: Duration,
    health_check_interval: Duration,
}

impl RedisStore {
    /// Start connecting to the server described by `config`.
    ///
    /// Returns immediately. Fails only when the URL cannot be parsed or when
    /// called outside a Tokio runtime.
    pub fn connect(config: &RedisConfig) -> Result<Self, CacheError> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| CacheError::Config(format!("no async runtime available: {}", e)))?;
        let client =
            Client::open(config.url.as_str()).map_err(|e| CacheError::Config(e.to_string()))?;

        let (state, _) = watch::channel(ConnectionState::Connecting);
        let shared = Arc::new(Shared {
            conn: RwLock::new(None),
            state,
            lost: Notify::new(),
        });

        let timing = Timing {
            connect_timeout: Duration::from_secs(config.connection_timeout),
            health_check_interval: Duration::from_secs(config.health_check_interval),
        };
        let task = runtime.spawn(supervise(client, Arc::clone(&shared), timing));

        Ok(Self {
            shared,
            supervisor: Mutex::new(Some(task)),
        })
    }

    async fn connection(&self) -> Result<MultiplexedConnection, CacheError> {
        if let Some(err) = self.state().unavailable_error() {
            return Err(err);
        }
        self.shared
            .conn
            .read()
            .await
            .clone()
            .ok_or(CacheError::NotReady)
    }

    /// Translate a reply, handing transport failures to the supervisor.
    fn track<T>(&self, result: RedisResult<T>) -> Result<T, CacheError> {
        result.map_err(|e| {
            let err = CacheError::from(e);
            if let CacheError::Transport(ref reason) = err {
                self.shared.mark_lost(reason);
            }
            err
        })
    }
}

async fn supervise(client: Client, shared: Arc<Shared>, timing: Timing) {
    let mut delay = RECONNECT_DELAY_MIN;

    while shared.state() != ConnectionState::Closed {
        match open_connection(&client, timing.connect_timeout).await {
            Ok(conn) => {
                if !shared.install(conn).await {
                    return;
                }
                tracing::info!("Redis client connected to the server");
                delay = RECONNECT_DELAY_MIN;

                monitor(&shared, timing).await;
                shared.conn.write().await.take();
            }
            Err(reason) => {
                if !shared.mark_lost(&reason) {
                    tracing::debug!(retry_in = ?delay, "Redis reconnect failed: {}", reason);
                }
                tokio::time::sleep(delay).await;
                delay = (delay * 2).min(RECONNECT_DELAY_MAX);
            }
        }
    }
}

async fn open_connection(
    client: &Client,
    timeout: Duration,
) -> Result<MultiplexedConnection, String> {
    match tokio::time::timeout(timeout, client.get_multiplexed_async_connection()).await {
        Ok(Ok(conn)) => Ok(conn),
        Ok(Err(e)) => Err(e.to_string()),
        Err(_) => Err(format!("timed out after {}s", timeout.as_secs())),
    }
}

/// Hold an established session until it is lost or the store closes.
async fn monitor(shared: &Shared, timing: Timing) {
    while shared.state() == ConnectionState::Connected {
        tokio::select! {
            _ = shared.lost.notified() => {}
            _ = tokio::time::sleep(timing.health_check_interval) => {
                if let Err(reason) = health_check(shared, timing.connect_timeout).await {
                    shared.mark_lost(&reason);
                }
            }
        }
    }
}

/// `PING` the session. Error replies still prove the socket is alive.
async fn health_check(shared: &Shared, timeout: Duration) -> Result<(), String> {
    let Some(mut conn) = shared.conn.read().await.clone() else {
        return Err("connection handle missing".to_string());
    };

    let ping = redis::cmd("PING");
    match tokio::time::timeout(timeout, ping.query_async::<()>(&mut conn)).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => match CacheError::from(e) {
            CacheError::Transport(reason) => Err(reason),
            _ => Ok(()),
        },
        Err(_) => Err(format!("PING timed out after {}s", timeout.as_secs())),
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    fn state(&self) -> ConnectionState {
        self.shared.state()
    }

    async fn wait_until_connected(&self, timeout: Duration) -> bool {
        let mut rx = self.shared.state.subscribe();
        let settled = rx.wait_for(|state| {
            matches!(state, ConnectionState::Connected | ConnectionState::Closed)
        });

        match tokio::time::timeout(timeout, settled).await {
            Ok(Ok(state)) => *state == ConnectionState::Connected,
            _ => false,
        }
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.connection().await?;
        self.track(conn.get::<_, Option<String>>(key).await)
    }

    async fn set_ex(&self, key: &str, value: &str, seconds: u64) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;
        self.track(conn.set_ex::<_, _, ()>(key, value, seconds).await)
    }

    async fn del(&self, key: &str) -> Result<u64, CacheError> {
        let mut conn = self.connection().await?;
        self.track(conn.del::<_, u64>(key).await)
    }

    async fn close(&self) {
        if let Some(task) = self.supervisor.lock().ok().and_then(|mut slot| slot.take()) {
            task.abort();
        }
        self.shared.state.send_replace(ConnectionState::Closed);
        // Dropping the last clone shuts down the multiplexer task.
        self.shared.conn.write().await.take();
        tracing::info!("Redis connection closed");
    }
}

impl Drop for RedisStore {
    fn drop(&mut self) {
        if let Some(task) = self.supervisor.get_mut().ok().and_then(|slot| slot.take()) {
            task.abort();
        }
    }
}
