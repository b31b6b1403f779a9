use crate::game_manager::session::MAX_GAME_DURATION;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_GAME_SECONDS: u64 = 2 * 60;
const DEFAULT_GRID_ROWS: usize = 10;
const DEFAULT_GRID_COLS: usize = 17;
const DEFAULT_ROOM_IDLE_SECS: u64 = 60 * 60;
const DEFAULT_CLEANUP_INTERVAL_SECS: u64 = 5 * 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    /// Used when a start request does not name a duration.
    pub game_duration: Duration,
    pub grid_rows: usize,
    pub grid_cols: usize,
    pub room_idle_ttl: Duration,
    pub cleanup_interval: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT)),
            game_duration: Duration::from_secs(DEFAULT_GAME_SECONDS),
            grid_rows: DEFAULT_GRID_ROWS,
            grid_cols: DEFAULT_GRID_COLS,
            room_idle_ttl: Duration::from_secs(DEFAULT_ROOM_IDLE_SECS),
            cleanup_interval: Duration::from_secs(DEFAULT_CLEANUP_INTERVAL_SECS),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::resolve(|k| std::env::var(k).ok())
    }

    /// Builds the config from a variable lookup. Missing values use the
    /// defaults; unparseable or zero values are logged and ignored.
    pub fn resolve<F>(mut get_env: F) -> Self
    where
        F: FnMut(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            addr: parse_var(&mut get_env, "SUMTEN_ADDR").unwrap_or(defaults.addr),
            game_duration: positive_var(&mut get_env, "SUMTEN_GAME_SECONDS")
                .map(Duration::from_secs)
                .filter(|duration| {
                    let fits = *duration <= MAX_GAME_DURATION;
                    if !fits {
                        tracing::warn!(seconds = duration.as_secs(), "Ignoring game duration above the limit");
                    }
                    fits
                })
                .unwrap_or(defaults.game_duration),
            grid_rows: positive_var(&mut get_env, "SUMTEN_GRID_ROWS")
                .and_then(|v| usize::try_from(v).ok())
                .unwrap_or(defaults.grid_rows),
            grid_cols: positive_var(&mut get_env, "SUMTEN_GRID_COLS")
                .and_then(|v| usize::try_from(v).ok())
                .unwrap_or(defaults.grid_cols),
            room_idle_ttl: positive_var(&mut get_env, "SUMTEN_ROOM_IDLE_SECS")
                .map_or(defaults.room_idle_ttl, Duration::from_secs),
            cleanup_interval: positive_var(&mut get_env, "SUMTEN_CLEANUP_INTERVAL_SECS")
                .map_or(defaults.cleanup_interval, Duration::from_secs),
        }
    }
}

fn parse_var<F, T>(get_env: &mut F, key: &str) -> Option<T>
where
    F: FnMut(&str) -> Option<String>,
    T: FromStr,
{
    let raw = get_env(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "Ignoring unparseable config value");
            None
        }
    }
}

fn positive_var<F>(get_env: &mut F, key: &str) -> Option<u64>
where
    F: FnMut(&str) -> Option<String>,
{
    match parse_var::<_, u64>(get_env, key)? {
        0 => {
            tracing::warn!(key, "Ignoring zero config value");
            None
        }
        value => Some(value),
    }
}
