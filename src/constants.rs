/// Header carrying the shared admin secret on guarded routes
pub const ADMIN_SECRET_HEADER: &str = "x-admin-secret";

/// Secret used when neither the config file nor `ADMIN_SECRET` provides one
pub const DEFAULT_ADMIN_SECRET: &str = "admin1234";

/// Upper bound on subject and lecture names, in characters
pub const MAX_NAME_LEN: usize = 30;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0";
pub const DEFAULT_DATABASE_PATH: &str = "catalog.db";
pub const DEFAULT_CONFIG_PATH: &str = "catalog.toml";
pub const DEFAULT_LOG_DIR: &str = "logs";
pub const DEFAULT_LOG_FILE: &str = "catalog.log";
pub const DEFAULT_METRICS_ADDR: &str = "127.0.0.1:9898";

/// Frontend hosts allowed to call the API with credentials
pub const DEFAULT_CORS_ORIGINS: &[&str] = &[
    "http://localhost:5173",
    "http://localhost:5174",
    "https://zhy2on.github.io",
    "https://ssafy-quiz-club.github.io",
    "https://quiz-api.kro.kr",
];

/// Get the default CORS origins as owned strings
pub fn default_cors_origins() -> Vec<String> {
    DEFAULT_CORS_ORIGINS.iter().map(|s| s.to_string()).collect()
}
