use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HashingConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            memory_kib: argon2::Params::DEFAULT_M_COST,
            iterations: argon2::Params::DEFAULT_T_COST,
            parallelism: argon2::Params::DEFAULT_P_COST,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LogConfig {
    pub filter: String,
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "usercred=debug".into(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AppConfig {
    pub hashing: HashingConfig,
    pub log: LogConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = HashingConfig::default();
        let hashing = HashingConfig {
            memory_kib: parse_u32(&lookup, "ARGON2_MEMORY_KIB", defaults.memory_kib)?,
            iterations: parse_u32(&lookup, "ARGON2_ITERATIONS", defaults.iterations)?,
            parallelism: parse_u32(&lookup, "ARGON2_PARALLELISM", defaults.parallelism)?,
        };
        let log = LogConfig {
            filter: lookup("RUST_LOG").unwrap_or_else(|| LogConfig::default().filter),
            json: lookup("LOG_FORMAT").map(|v| v == "json").unwrap_or(false),
        };
        Ok(Self { hashing, log })
    }
}

fn parse_u32<F>(lookup: &F, key: &str, default: u32) -> anyhow::Result<u32>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<u32>()
            .with_context(|| format!("{key} must be a non-negative integer, got {raw:?}")),
        None => Ok(default),
    }
}
