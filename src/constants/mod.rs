/// Sort key of the record that represents the file itself rather than a share.
pub const OWNER_RECIPIENT: &str = "-";

/// Maximum number of rows written per batch insert.
pub const BATCH_SIZE: usize = 25;

/// Object metadata keys attached to uploads.
pub const META_OWNER_ID: &str = "owner-id";
pub const META_FILENAME: &str = "filename";

/// Query metadata embedded in signed download URLs.
pub const META_RECIPIENT_ID: &str = "recipient-id";
pub const META_RECIPIENT_EMAIL: &str = "recipient-email";

pub struct Env {
    pub jwt_secret: String,
    pub access_token_expiration: u64,
    pub database_url: String,
    pub redis_url: String,
    pub frontend_url: String,
    pub ip: String,
    pub port: u16,
    pub region: String,
    pub bucket_name: String,
    pub file_table: String,
    pub download_table: String,
    pub user_table: String,
    pub api_url: String,
    pub presigned_url_expiration: u64,
    pub download_record_ttl: i64,
    pub download_purge_interval: u64,
}

/// Download records are kept at most a century.
const MAX_RECORD_TTL_SECS: i64 = 100 * 365 * 24 * 3600;

fn checked_record_ttl(secs: i64) -> Option<i64> {
    (1..=MAX_RECORD_TTL_SECS).contains(&secs).then_some(secs)
}

fn checked_purge_interval(secs: u64) -> Option<u64> {
    (secs > 0).then_some(secs)
}

fn required(key: &str) -> String {
    std::env::var(key)
        .unwrap_or_else(|_| panic!("{key} must be set in .env file or environment variable"))
}

impl Env {
    fn new() -> Self {
        let jwt_secret = required("SECRET_KEY");

        let access_token_expiration = std::env::var("ACCESS_TOKEN_EXPIRATION")
            .unwrap_or_else(|_| "900".to_string())
            .parse::<u64>()
            .expect("ACCESS_TOKEN_EXPIRATION must be a valid u64 integer");

        let database_url = required("DATABASE_URL");
        let redis_url = required("REDIS_URL");

        let region = required("REGION");
        let bucket_name = required("BUCKET_NAME");
        let file_table = required("FILE_TABLE");
        let download_table = required("DOWNLOAD_TABLE");
        let user_table = required("USER_TABLE");

        let frontend_url =
            std::env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:5173".to_string());
        let ip = std::env::var("IP").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .expect("PORT must be a valid u16 integer");
        let api_url = std::env::var("API_URL").unwrap_or_else(|_| format!("http://{ip}:{port}"));

        let presigned_url_expiration = std::env::var("PRESIGNED_URL_EXPIRATION")
            .unwrap_or_else(|_| "900".to_string())
            .parse::<u64>()
            .expect("PRESIGNED_URL_EXPIRATION must be a valid u64 integer");
        let download_record_ttl = std::env::var("DOWNLOAD_RECORD_TTL")
            .unwrap_or_else(|_| "7776000".to_string())
            .parse::<i64>()
            .ok()
            .and_then(checked_record_ttl)
            .expect("DOWNLOAD_RECORD_TTL must be between 1 and 3153600000 seconds");
        let download_purge_interval = std::env::var("DOWNLOAD_PURGE_INTERVAL")
            .unwrap_or_else(|_| "3600".to_string())
            .parse::<u64>()
            .ok()
            .and_then(checked_purge_interval)
            .expect("DOWNLOAD_PURGE_INTERVAL must be a positive number of seconds");

        Env {
            jwt_secret,
            access_token_expiration,
            database_url,
            redis_url,
            frontend_url,
            ip,
            port,
            region,
            bucket_name,
            file_table,
            download_table,
            user_table,
            api_url,
            presigned_url_expiration,
            download_record_ttl,
            download_purge_interval,
        }
    }
}

impl Default for Env {
    fn default() -> Self {
        Self::new()
    }
}
