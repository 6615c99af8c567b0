use anyhow::Context;
use jsonwebtoken::Algorithm;

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub algorithm: Algorithm,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

/// Argon2 variant and cost used for newly computed password hashes.
#[derive(Debug, Clone)]
pub struct HashingConfig {
    pub scheme: argon2::Algorithm,
    pub params: argon2::Params,
}

#[derive(Debug, Clone)]
pub struct S3Config {
    pub bucket: String,
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub endpoint: Option<String>, // MinIO or other S3-compatible endpoint
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt: JwtConfig,
    pub hashing: HashingConfig,
    pub s3: S3Config,
    pub avatar_url_ttl_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL")?;

        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET")?,
            algorithm: parse_algorithm(&var_or("JWT_ALGORITHM", "HS256"))?,
            issuer: var_or("JWT_ISSUER", "pressroom"),
            audience: var_or("JWT_AUDIENCE", "pressroom-users"),
            ttl_minutes: parse_or("ACCESS_TOKEN_EXPIRE_MINUTES", 60)?,
        };
        anyhow::ensure!(!jwt.secret.is_empty(), "JWT_SECRET must not be empty");
        anyhow::ensure!(jwt.ttl_minutes > 0, "ACCESS_TOKEN_EXPIRE_MINUTES must be positive");

        let hashing = HashingConfig {
            scheme: var_or("PASSWORD_HASH_SCHEME", "argon2id")
                .parse::<argon2::Algorithm>()
                .map_err(|e| anyhow::anyhow!("PASSWORD_HASH_SCHEME: {}", e))?,
            params: argon2::Params::new(
                parse_or("PASSWORD_HASH_MEMORY_KIB", argon2::Params::DEFAULT_M_COST)?,
                parse_or("PASSWORD_HASH_ITERATIONS", argon2::Params::DEFAULT_T_COST)?,
                parse_or("PASSWORD_HASH_PARALLELISM", argon2::Params::DEFAULT_P_COST)?,
                None,
            )
            .map_err(|e| anyhow::anyhow!("invalid argon2 params: {}", e))?,
        };

        let s3 = S3Config {
            bucket: std::env::var("AWS_S3_BUCKET").context("AWS_S3_BUCKET")?,
            region: std::env::var("AWS_REGION").context("AWS_REGION")?,
            access_key_id: std::env::var("AWS_ACCESS_KEY_ID").context("AWS_ACCESS_KEY_ID")?,
            secret_access_key: std::env::var("AWS_SECRET_ACCESS_KEY")
                .context("AWS_SECRET_ACCESS_KEY")?,
            endpoint: std::env::var("AWS_S3_ENDPOINT").ok().filter(|v| !v.is_empty()),
        };

        Ok(Self {
            database_url,
            host: var_or("APP_HOST", "0.0.0.0"),
            port: parse_or("APP_PORT", 8080)?,
            jwt,
            hashing,
            s3,
            avatar_url_ttl_secs: parse_or("AVATAR_URL_TTL_SECS", 3600)?,
        })
    }
}

/// Only HMAC algorithms can be driven by a shared secret.
pub fn parse_algorithm(raw: &str) -> anyhow::Result<Algorithm> {
    let alg = raw
        .parse::<Algorithm>()
        .with_context(|| format!("unknown JWT_ALGORITHM {}", raw))?;
    match alg {
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Ok(alg),
        other => anyhow::bail!("JWT_ALGORITHM {:?} is not a shared-secret algorithm", other),
    }
}

fn var_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.into())
}

fn parse_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(v) => v
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{}={}: {}", key, v, e)),
        Err(_) => Ok(default),
    }
}
