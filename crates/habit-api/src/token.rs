//! Bearer token issuance and verification (HS256 JWT).

use chrono::{Duration, Utc};
use habit_core::user::{PublicUser, UserId};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

/// Default token lifetime.
pub const DEFAULT_TTL: Duration = Duration::days(7);

/// JWT payload: the public user record plus the standard timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
  pub id:       UserId,
  pub username: String,
  pub email:    String,
  pub iat:      i64,
  pub exp:      i64,
}

impl Claims {
  pub fn new(user: &PublicUser, ttl: Duration) -> Self {
    let now = Utc::now();
    Self {
      id:       user.id,
      username: user.username.clone(),
      email:    user.email.clone(),
      iat:      now.timestamp(),
      exp:      (now + ttl).timestamp(),
    }
  }
}

/// Signing material shared by every request.
pub struct TokenKeys {
  encoding:   EncodingKey,
  decoding:   DecodingKey,
  validation: Validation,
  ttl:        Duration,
}

impl TokenKeys {
  pub fn new(secret: &[u8], ttl: Duration) -> Self {
    Self {
      encoding: EncodingKey::from_secret(secret),
      decoding: DecodingKey::from_secret(secret),
      validation: Validation::new(Algorithm::HS256),
      ttl,
    }
  }

  pub fn ttl(&self) -> Duration { self.ttl }

  pub fn issue(&self, user: &PublicUser) -> jsonwebtoken::errors::Result<String> {
    self.sign(&Claims::new(user, self.ttl))
  }

  pub fn sign(&self, claims: &Claims) -> jsonwebtoken::errors::Result<String> {
    encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
  }

  /// Check signature and expiry.
  pub fn verify(&self, token: &str) -> jsonwebtoken::errors::Result<Claims> {
    decode::<Claims>(token, &self.decoding, &self.validation).map(|data| data.claims)
  }
}
