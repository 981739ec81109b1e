use chrono_tz::Tz;
use tracing::{info, warn};

const DEFAULT_PORT: usize = 5000;
const DEFAULT_TIMEZONE: Tz = chrono_tz::Asia::Manila;

#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the application to run on
    pub port: usize,
    /// Timezone used to read wall clock input when the client does not provide one
    pub default_timezone: Tz,
    /// Maximum allowed duration in millis for querying events and their occurrences.
    /// Expanding recurring events over a timespan of several years is slow and
    /// not very useful for a calendar view anyways.
    pub event_query_duration_limit: i64,
}

impl Config {
    pub fn new() -> Self {
        let port = std::env::var("PORT").unwrap_or_else(|_| DEFAULT_PORT.to_string());
        let port = match port.parse::<usize>() {
            Ok(port) => port,
            Err(_) => {
                warn!(
                    "The given PORT: {} is not valid, falling back to the default port: {}.",
                    port, DEFAULT_PORT
                );
                DEFAULT_PORT
            }
        };

        let default_timezone = match std::env::var("DEFAULT_TIMEZONE") {
            Ok(timezone) => match timezone.parse::<Tz>() {
                Ok(tz) => tz,
                Err(_) => {
                    warn!(
                        "Unknown DEFAULT_TIMEZONE: {}, falling back to: {}.",
                        timezone, DEFAULT_TIMEZONE
                    );
                    DEFAULT_TIMEZONE
                }
            },
            Err(_) => {
                info!(
                    "Did not find DEFAULT_TIMEZONE environment variable. Using: {}",
                    DEFAULT_TIMEZONE
                );
                DEFAULT_TIMEZONE
            }
        };

        Self {
            port,
            default_timezone,
            event_query_duration_limit: 1000 * 60 * 60 * 24 * 62, // 62 days
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
