use std::net::{IpAddr, SocketAddr};

use anyhow::Context;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://todos.db";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: IpAddr,
    pub port: u16,
    pub max_connections: u32,
}

impl Config {
    /// Reads the process environment, after loading `.env` if one exists.
    pub fn from_env() -> anyhow::Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let database_url = lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());
        let host = match lookup("HOST") {
            Some(v) => v.parse::<IpAddr>().with_context(|| format!("invalid HOST {v}"))?,
            None => IpAddr::from([127, 0, 0, 1]),
        };
        let port = match lookup("PORT") {
            Some(v) => v.parse::<u16>().with_context(|| format!("invalid PORT {v}"))?,
            None => 3000,
        };
        let max_connections = match lookup("DB_MAX_CONNECTIONS") {
            Some(v) => v.parse::<u32>().with_context(|| format!("invalid DB_MAX_CONNECTIONS {v}"))?,
            None => 5,
        };
        Ok(Self { database_url, host, port, max_connections })
    }

    pub fn addr(&self) -> SocketAddr { SocketAddr::new(self.host, self.port) }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(config.addr().to_string(), "127.0.0.1:3000");
        assert_eq!(config.max_connections, 5);
    }

    #[test]
    fn overrides_and_bad_port() {
        let config = Config::from_lookup(lookup(&[("PORT", "8080"), ("HOST", "0.0.0.0"), ("DATABASE_URL", "sqlite::memory:")])).unwrap();
        assert_eq!(config.addr().to_string(), "0.0.0.0:8080");
        assert_eq!(config.database_url, "sqlite::memory:");

        assert!(Config::from_lookup(lookup(&[("PORT", "eighty")])).is_err());
    }
}
