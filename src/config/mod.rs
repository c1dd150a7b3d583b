use std::env;
use std::time::Duration;

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expiration_secs: u64,
    pub server_host: String,
    pub server_port: u16,
    pub api_base_uri: String,
    pub smtp_host: String,
    pub smtp_account: String,
    pub smtp_password: String,
    pub mail_from: String,
    pub cdn_prefix: String,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        dotenv::dotenv().ok();

        let jwt_expiration = env::var("JWT_EXPIRATION")
            .unwrap_or_else(|_| "24".into())
            .trim_end_matches('h')
            .parse::<u64>()
            .unwrap_or(24);

        Ok(Config {
            database_url: env::var("DATABASE_URL")?,
            jwt_secret: env::var("JWT_SECRET")?,
            jwt_expiration_secs: jwt_expiration * 3600,
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "::".into()),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_default()
                .parse()
                .unwrap_or(3000),
            api_base_uri: env::var("API_BASE_URI").unwrap_or_else(|_| "/api".into()),
            smtp_host: env::var("SMTP_HOST")?,
            smtp_account: env::var("EMAIL_ACCOUNT")?,
            smtp_password: env::var("EMAIL_PASSWORD")?,
            mail_from: env::var("MAIL_FROM")
                .unwrap_or_else(|_| "小众点评 <dianping@example.com>".into()),
            cdn_prefix: env::var("CDN_PREFIX")
                .unwrap_or_else(|_| "http://cdn.dianping.example.com/".into()),
        })
    }

    pub fn jwt_expiration(&self) -> Duration {
        Duration::from_secs(self.jwt_expiration_secs)
    }
}
