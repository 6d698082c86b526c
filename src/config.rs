use std::env;

/// Process-wide configuration, collected once at startup and handed to the
/// application via `web::Data`. Services receive it explicitly; nothing in
/// this crate reads configuration from the environment after boot.
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_port: u16,
    pub server_host: String,
}

impl Config {
    /// Reads configuration from the environment.
    ///
    /// Fails closed on a missing `JWT_SECRET` in release builds: without a
    /// signing key the server must not start. Debug builds fall back to a
    /// development-only secret so local runs and tests work out of the box.
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            jwt_secret: Self::jwt_secret_from_env(),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .expect("SERVER_PORT must be a number"),
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
        }
    }

    fn jwt_secret_from_env() -> String {
        match env::var("JWT_SECRET") {
            Ok(secret) => secret,
            Err(_) => {
                if cfg!(debug_assertions) {
                    log::warn!("JWT_SECRET not set; using development-only secret");
                    "tasknest-dev-secret".to_string()
                } else {
                    panic!("JWT_SECRET must be set");
                }
            }
        }
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}
