use std::{env, path::PathBuf, time::Duration};

use sim_queue::{StoreConfig, DEFAULT_BUSY_TIMEOUT_MS};

pub(crate) const DEFAULT_DB_PATH: &str = "simulations.db";
pub(crate) const DB_PATH_ENV: &str = "SIM_QUEUE_DB";
pub(crate) const BUSY_TIMEOUT_ENV: &str = "SIM_QUEUE_BUSY_TIMEOUT_MS";

/// Database path when `--db` is not given: `SIM_QUEUE_DB`, then the default.
pub(crate) fn default_db_path() -> PathBuf {
    env::var(DB_PATH_ENV)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_DB_PATH.to_string())
        .into()
}

pub(crate) fn store_config() -> StoreConfig {
    StoreConfig {
        busy_timeout: Duration::from_millis(read_env_u64(
            BUSY_TIMEOUT_ENV,
            DEFAULT_BUSY_TIMEOUT_MS,
        )),
    }
}

pub(crate) fn read_env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_env_u64_falls_back_on_missing_zero_or_garbage() {
        let name = "DSS_GENERATOR_TEST_READ_ENV_U64";
        env::remove_var(name);
        assert_eq!(read_env_u64(name, 7), 7);

        env::set_var(name, "0");
        assert_eq!(read_env_u64(name, 7), 7);

        env::set_var(name, "soon");
        assert_eq!(read_env_u64(name, 7), 7);

        env::set_var(name, "250");
        assert_eq!(read_env_u64(name, 7), 250);
        env::remove_var(name);
    }
}
