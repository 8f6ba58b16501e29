use clap::Parser;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Listening host
    #[arg(long, env = "BLOBSTORE_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Listening port
    #[arg(short, long, env = "BLOBSTORE_PORT", default_value_t = 8969)]
    pub port: u16,

    /// Storage backend type (SQLITE or MEMORY)
    #[arg(short, long, env = "BLOBSTORE_STORAGE", default_value = "SQLITE")]
    pub storage: String,

    /// SQLite database url
    #[arg(
        long,
        env = "BLOBSTORE_DATABASE_URL",
        default_value = "sqlite:///var/lib/blobstore/blobstore.db?mode=rwc"
    )]
    pub database_url: String,

    /// Maximum number of pooled database connections
    #[arg(long, env = "BLOBSTORE_DATABASE_MAX_CONNECTIONS", default_value_t = 12)]
    pub database_max_connections: u32,

    /// Largest accepted upload body, in bytes
    #[arg(long, env = "BLOBSTORE_MAX_UPLOAD_BYTES", default_value_t = 104_857_600)]
    pub max_upload_bytes: u64,

    /// Content types accepted for upload
    #[arg(
        long = "accepted-mimetype",
        env = "BLOBSTORE_ACCEPTED_MIMETYPES",
        value_delimiter = ',',
        default_value = "application/x-tar"
    )]
    pub accepted_mimetypes: Vec<String>,

    /// Upper bound on a single storage backend call, in seconds
    #[arg(long, env = "BLOBSTORE_BACKEND_TIMEOUT_SECS", default_value_t = 30)]
    pub backend_timeout_secs: u64,
}
