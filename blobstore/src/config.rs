use std::time::Duration;

pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 100 * 1024 * 1024;
pub const DEFAULT_ACCEPTED_MIMETYPE: &str = "application/x-tar";

#[derive(Clone, Debug)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub storage_typ: String,
    pub db_url: String,
    pub db_max_connections: u32,
    pub max_upload_bytes: u64,
    pub accepted_mimetypes: Vec<String>,
    pub backend_timeout: Duration,
    pub jwt_secret: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8969,
            storage_typ: "MEMORY".to_string(),
            db_url: "sqlite::memory:".to_string(),
            db_max_connections: 12,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            accepted_mimetypes: vec![DEFAULT_ACCEPTED_MIMETYPE.to_string()],
            backend_timeout: Duration::from_secs(30),
            jwt_secret: "secret".to_string(),
        }
    }
}
