use base64::{engine::general_purpose::STANDARD, Engine as _};
use thiserror::Error;

/// Lowest and highest work factors bcrypt accepts
pub const MIN_BCRYPT_COST: u32 = 4;
pub const MAX_BCRYPT_COST: u32 = 31;

/// Email/secret pair carried by an `Authorization: Basic` header
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub secret: String,
}

// Keep secrets out of logs
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("secret", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CredentialsError {
    #[error("authorization scheme must be Basic")]
    WrongScheme,
    #[error("credentials are not valid base64")]
    InvalidEncoding,
    #[error("credentials are not valid UTF-8")]
    InvalidUtf8,
    #[error("credentials must be in the form user:password")]
    MissingSeparator,
}

impl Credentials {
    /// Parse the value of an `Authorization` header.
    ///
    /// The scheme is matched case-insensitively; the secret is everything after
    /// the first `:` so passwords may contain colons.
    pub fn from_header(value: &str) -> Result<Self, CredentialsError> {
        let value = value.trim();
        let (scheme, encoded) = value
            .split_once(char::is_whitespace)
            .ok_or(CredentialsError::WrongScheme)?;

        if !scheme.eq_ignore_ascii_case("basic") {
            return Err(CredentialsError::WrongScheme);
        }

        let decoded = STANDARD
            .decode(encoded.trim())
            .map_err(|_| CredentialsError::InvalidEncoding)?;
        let decoded = String::from_utf8(decoded).map_err(|_| CredentialsError::InvalidUtf8)?;

        let (email, secret) = decoded
            .split_once(':')
            .ok_or(CredentialsError::MissingSeparator)?;

        Ok(Self {
            email: email.to_string(),
            secret: secret.to_string(),
        })
    }

    /// Build a header value, used by clients and tests
    pub fn to_header(&self) -> String {
        format!("Basic {}", STANDARD.encode(format!("{}:{}", self.email, self.secret)))
    }
}

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("password hashing failed: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),
    #[error("password worker failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Hash a plaintext password with a fresh salt
pub async fn hash_password(plain: String, cost: u32) -> Result<String, PasswordError> {
    let hashed = tokio::task::spawn_blocking(move || bcrypt::hash(plain, cost)).await??;
    Ok(hashed)
}

/// Compare a plaintext password against a stored hash.
///
/// A malformed stored hash counts as a mismatch.
pub async fn verify_password(plain: String, hash: String) -> Result<bool, PasswordError> {
    let matches = tokio::task::spawn_blocking(move || match bcrypt::verify(plain, &hash) {
        Ok(matches) => matches,
        Err(e) => {
            tracing::warn!("Stored password hash could not be parsed: {}", e);
            false
        }
    })
    .await?;
    Ok(matches)
}

/// Burn the same amount of work as a real verification, so unknown accounts
/// and wrong passwords are indistinguishable by timing
pub async fn equalize_timing(plain: String, cost: u32) -> Result<(), PasswordError> {
    hash_password(plain, cost).await.map(|_| ())
}
