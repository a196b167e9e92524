//! Tracing subscriber setup.

pub const LOG_ENV_VAR: &str = "FXCROSS_LOG";
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Pick the filter directive: environment, then CLI flag, then config file.
pub fn select_filter(env: Option<String>, cli_level: Option<&str>, config_level: Option<String>) -> String {
    env.filter(|v| !v.trim().is_empty())
        .or_else(|| cli_level.map(str::to_string))
        .or(config_level)
        .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string())
}

/// Install a stderr fmt subscriber. Installing twice is a no-op.
pub fn init_tracing(cli_level: Option<&str>, config_level: Option<String>) -> Result<(), String> {
    let filter = select_filter(std::env::var(LOG_ENV_VAR).ok(), cli_level, config_level);
    let env_filter = tracing_subscriber::EnvFilter::try_new(&filter)
        .map_err(|err| format!("invalid log filter '{filter}': {err}"))?;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
    Ok(())
}
