use std::time::Duration;

/// How long a fetched page stays in `result:{url}`.
pub const DEFAULT_RESULT_TTL: Duration = Duration::from_secs(10);

/// Shortest TTL a store can express (`PSETEX` rejects 0).
pub const MIN_RESULT_TTL: Duration = Duration::from_millis(1);

const COUNT_PREFIX: &str = "count:";
const RESULT_PREFIX: &str = "result:";

/// Key of the request counter for `url`. The url is used verbatim.
pub fn count_key(url: &str) -> String {
    format!("{COUNT_PREFIX}{url}")
}

/// Key of the cached body for `url`.
pub fn result_key(url: &str) -> String {
    format!("{RESULT_PREFIX}{url}")
}
