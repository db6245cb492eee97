/// Routes the engine's `tracing` events to `env_logger`.
///
/// Defaults to the `info` level; override with `RUST_LOG`. Calling it again is a no-op.
pub fn init_tracing() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_tracing_can_run_twice() {
        init_tracing();
        init_tracing();
        tracing::info!("logger installed");
        assert!(log::log_enabled!(log::Level::Error));
    }
}
