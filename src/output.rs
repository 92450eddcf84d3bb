use std::sync::OnceLock;

pub const QUIET_ENV: &str = "SRCTRL_QUIET";

static QUIET: OnceLock<bool> = OnceLock::new();

/// True when `SRCTRL_QUIET` is `1` or `true`; progress output is then suppressed
pub fn is_quiet() -> bool {
    *QUIET.get_or_init(|| {
        std::env::var(QUIET_ENV)
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    })
}
