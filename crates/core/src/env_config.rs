//! Environment variable parsing with warn-level logging for invalid values.

/// Parse an environment variable with a default fallback.
///
/// - If the variable is not set: returns `default` silently (expected case).
/// - If the variable is set but cannot be parsed: logs a warning and returns `default`.
pub fn env_parse_with_default<T: std::str::FromStr + std::fmt::Display>(
    var: &str,
    default: T,
) -> T {
    parse_with_default(var, std::env::var(var).ok(), default)
}

/// Same as [`env_parse_with_default`], over an already-read raw value.
pub fn parse_with_default<T: std::str::FromStr + std::fmt::Display>(
    var: &str,
    raw: Option<String>,
    default: T,
) -> T {
    match raw {
        Some(v) => match v.trim().parse() {
            Ok(n) => n,
            Err(_) => {
                tracing::warn!(
                    var,
                    value = %v,
                    default = %default,
                    "invalid env var value, using default"
                );
                default
            },
        },
        None => default,
    }
}
