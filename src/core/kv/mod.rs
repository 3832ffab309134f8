//! Redis-backed key-value access: every subsystem that
//! needs shared, hot-reloadable state reads the same three hashes —
//! `nexus:bidders`, `nexus:api_keys`, `nexus:publishers` — through this
//! thin wrapper.

use redis::AsyncCommands;

#[derive(Clone)]
pub struct RedisKvStore {
    client: redis::Client,
}

impl RedisKvStore {
    pub fn new(url: &str) -> anyhow::Result<Self> {
        let client = redis::Client::open(url)?;
        Ok(Self { client })
    }

    pub async fn ping(&self) -> anyhow::Result<()> {
        let mut conn = self.client.get_connection_manager().await?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }

    /// `HGETALL key`, returning an empty map if the key does not exist.
    pub async fn hgetall(&self, key: &str) -> anyhow::Result<std::collections::HashMap<String, String>> {
        let mut conn = self.client.get_connection_manager().await?;
        let map = conn.hgetall(key).await?;
        Ok(map)
    }

    pub async fn hget(&self, key: &str, field: &str) -> anyhow::Result<Option<String>> {
        let mut conn = self.client.get_connection_manager().await?;
        let value = conn.hget(key, field).await?;
        Ok(value)
    }

    pub async fn hset(&self, key: &str, field: &str, value: &str) -> anyhow::Result<()> {
        let mut conn = self.client.get_connection_manager().await?;
        let _: () = conn.hset(key, field, value).await?;
        Ok(())
    }
}

pub const BIDDERS_KEY: &str = "nexus:bidders";
pub const API_KEYS_KEY: &str = "nexus:api_keys";
pub const PUBLISHERS_KEY: &str = "nexus:publishers";
