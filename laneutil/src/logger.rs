use std::sync::Once;

static INIT: Once = Once::new();

/// Route messages from the `log` crate to STDERR through `env_logger`. The filter defaults to
/// `info` and can be overridden with `RUST_LOG`. Calling this more than once is harmless, so tests
/// can call it freely.
pub fn setup() {
    INIT.call_once(|| {
        use env_logger::{Builder, Env};
        // Another logger may already be installed by an embedding binary; keep theirs.
        let _ = Builder::from_env(Env::default().default_filter_or("info"))
            .format_timestamp(None)
            .try_init();
    });
}
