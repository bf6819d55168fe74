//! Default configuration values

pub struct HttpDefaults;

impl HttpDefaults {
    pub const REQUEST_TIMEOUT_SECS: u64 = 30;
    pub const MAX_REQUEST_SIZE: usize = 64 * 1024;
    pub const ENABLE_TRACING: bool = true;
    pub const HEALTH_CHECK_PATH: &'static str = "/health";
}
