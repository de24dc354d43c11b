//! Landing-view leaderboard flag
//!
//! After a successful save the share URL carries `leaderboard=open` so a
//! fresh load of the landing view auto-opens the leaderboard panel. The flag
//! is read once at landing initialization.

const FLAG_KEY: &str = "leaderboard";
const FLAG_VALUE: &str = "open";

/// Append the leaderboard flag to a base URL, preserving any existing query
pub fn with_leaderboard_flag(base_url: &str) -> String {
    let separator = if base_url.contains('?') { '&' } else { '?' };
    format!("{}{}{}={}", base_url, separator, FLAG_KEY, FLAG_VALUE)
}

/// Check a raw query string (no leading '?') for the leaderboard flag
pub fn should_open_leaderboard(query: &str) -> bool {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .any(|(key, value)| key == FLAG_KEY && value == FLAG_VALUE)
}
