// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Whop identity provider.
//!
//! The Whop proxy attaches an ES256-signed user token to every request in the
//! `x-whop-user-token` header. We verify it locally, then fetch the user's
//! display name from the Whop API.

use crate::config::WhopConfig;
use crate::services::identity::{header_str, CallerIdentity, IdentityError, IdentityResolver};
use anyhow::Context;
use async_trait::async_trait;
use axum::http::HeaderMap;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;

/// Header carrying the Whop user token.
pub const WHOP_USER_TOKEN_HEADER: &str = "x-whop-user-token";
/// Issuer of Whop user tokens.
pub const WHOP_TOKEN_ISSUER: &str = "urn:whopcom:exp-proxy";

const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(5);
const CLOCK_SKEW_SECS: u64 = 60;
const FALLBACK_DISPLAY_NAME: &str = "New User";

#[derive(Debug, Deserialize)]
struct WhopTokenClaims {
    sub: String,
}

/// User record returned by the Whop API.
#[derive(Debug, Deserialize)]
struct WhopUser {
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

impl WhopUser {
    fn display_name(self) -> String {
        self.username
            .filter(|s| !s.trim().is_empty())
            .or(self.name.filter(|s| !s.trim().is_empty()))
            .unwrap_or_else(|| FALLBACK_DISPLAY_NAME.to_string())
    }
}

/// Identity resolver backed by Whop user tokens.
pub struct WhopIdentity {
    http: reqwest::Client,
    api_base: String,
    api_key: String,
    app_id: String,
    decoding_key: DecodingKey,
}

impl WhopIdentity {
    /// Build a resolver from config, parsing the PEM public key.
    pub fn new(config: &WhopConfig) -> anyhow::Result<Self> {
        let decoding_key = DecodingKey::from_ec_pem(config.token_public_key_pem.as_bytes())
            .context("invalid WHOP_TOKEN_PUBLIC_KEY")?;
        Self::with_decoding_key(config, decoding_key)
    }

    /// Build a resolver with an already-parsed verification key.
    pub fn with_decoding_key(config: &WhopConfig, decoding_key: DecodingKey) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .context("failed building Whop HTTP client")?;

        tracing::info!(app_id = %config.app_id, api_base = %config.api_base, "Initialized Whop identity resolver");

        Ok(Self {
            http,
            api_base: config.api_base.clone(),
            api_key: config.api_key.clone(),
            app_id: config.app_id.clone(),
            decoding_key,
        })
    }

    /// Verify a Whop user token and return the user ID it was issued for.
    pub fn verify_token(&self, token: &str) -> Result<String, IdentityError> {
        let mut validation = Validation::new(Algorithm::ES256);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        validation.set_issuer(&[WHOP_TOKEN_ISSUER]);
        validation.set_audience(&[self.app_id.as_str()]);
        validation.leeway = CLOCK_SKEW_SECS;

        let token_data = decode::<WhopTokenClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| IdentityError::Rejected(format!("JWT validation failed: {e}")))?;

        let user_id = token_data.claims.sub.trim().to_string();
        if user_id.is_empty() {
            return Err(IdentityError::Rejected("empty sub claim".to_string()));
        }
        Ok(user_id)
    }

    /// Look up the user's display name.
    async fn fetch_display_name(&self, user_id: &str) -> Result<String, IdentityError> {
        let url = format!("{}/users/{}", self.api_base, urlencoding::encode(user_id));
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| IdentityError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(lookup_error(status, &body));
        }

        let user: WhopUser = response
            .json()
            .await
            .map_err(|e| IdentityError::Unavailable(format!("JSON parse error: {}", e)))?;

        Ok(user.display_name())
    }
}

/// Classify a failed user lookup.
///
/// Only an unknown user is the caller's fault; auth failures here mean our
/// own API key is bad.
fn lookup_error(status: StatusCode, body: &str) -> IdentityError {
    if status == StatusCode::NOT_FOUND {
        IdentityError::Rejected(format!("Whop user lookup returned {status}"))
    } else {
        IdentityError::Unavailable(format!("HTTP {}: {}", status, body))
    }
}

#[async_trait]
impl IdentityResolver for WhopIdentity {
    async fn resolve(&self, headers: &HeaderMap) -> Result<CallerIdentity, IdentityError> {
        let token = header_str(headers, WHOP_USER_TOKEN_HEADER).ok_or(IdentityError::Missing)?;
        let external_id = self.verify_token(token)?;
        let display_name = self.fetch_display_name(&external_id).await?;

        tracing::debug!(external_id = %external_id, "Resolved Whop caller");

        Ok(CallerIdentity {
            external_id,
            display_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use ring::rand::SystemRandom;
    use ring::signature::{EcdsaKeyPair, KeyPair, ECDSA_P256_SHA256_FIXED_SIGNING};
    use serde::Serialize;
    use std::time::{SystemTime, UNIX_EPOCH};

    #[derive(Serialize)]
    struct TestClaims<'a> {
        sub: &'a str,
        iss: &'a str,
        aud: &'a str,
        exp: u64,
    }

    fn test_config() -> WhopConfig {
        WhopConfig {
            app_id: "app_test".to_string(),
            api_key: "key".to_string(),
            token_public_key_pem: String::new(),
            api_base: "http://127.0.0.1:9".to_string(),
        }
    }

    /// Returns (encoding key, decoding key) for a fresh P-256 key pair.
    fn key_pair() -> (EncodingKey, DecodingKey) {
        let rng = SystemRandom::new();
        let pkcs8 = EcdsaKeyPair::generate_pkcs8(&ECDSA_P256_SHA256_FIXED_SIGNING, &rng).unwrap();
        let pair =
            EcdsaKeyPair::from_pkcs8(&ECDSA_P256_SHA256_FIXED_SIGNING, pkcs8.as_ref(), &rng)
                .unwrap();
        (
            EncodingKey::from_ec_der(pkcs8.as_ref()),
            DecodingKey::from_ec_der(pair.public_key().as_ref()),
        )
    }

    fn sign(key: &EncodingKey, sub: &str, iss: &str, aud: &str, exp_offset: i64) -> String {
        let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs() as i64;
        let claims = TestClaims {
            sub,
            iss,
            aud,
            exp: (now + exp_offset) as u64,
        };
        encode(&Header::new(Algorithm::ES256), &claims, key).unwrap()
    }

    #[test]
    fn test_valid_token_yields_user_id() {
        let (enc, dec) = key_pair();
        let whop = WhopIdentity::with_decoding_key(&test_config(), dec).unwrap();

        let token = sign(&enc, "user_abc", WHOP_TOKEN_ISSUER, "app_test", 3600);
        assert_eq!(whop.verify_token(&token).unwrap(), "user_abc");
    }

    #[test]
    fn test_wrong_audience_is_rejected() {
        let (enc, dec) = key_pair();
        let whop = WhopIdentity::with_decoding_key(&test_config(), dec).unwrap();

        let token = sign(&enc, "user_abc", WHOP_TOKEN_ISSUER, "app_other", 3600);
        assert!(matches!(
            whop.verify_token(&token),
            Err(IdentityError::Rejected(_))
        ));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let (enc, dec) = key_pair();
        let whop = WhopIdentity::with_decoding_key(&test_config(), dec).unwrap();

        let token = sign(&enc, "user_abc", WHOP_TOKEN_ISSUER, "app_test", -3600);
        assert!(matches!(
            whop.verify_token(&token),
            Err(IdentityError::Rejected(_))
        ));
    }

    #[test]
    fn test_token_from_other_key_is_rejected() {
        let (enc, _) = key_pair();
        let (_, other_dec) = key_pair();
        let whop = WhopIdentity::with_decoding_key(&test_config(), other_dec).unwrap();

        let token = sign(&enc, "user_abc", WHOP_TOKEN_ISSUER, "app_test", 3600);
        assert!(matches!(
            whop.verify_token(&token),
            Err(IdentityError::Rejected(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_header_is_missing_identity() {
        let (_, dec) = key_pair();
        let whop = WhopIdentity::with_decoding_key(&test_config(), dec).unwrap();

        let err = whop.resolve(&HeaderMap::new()).await.unwrap_err();
        assert!(matches!(err, IdentityError::Missing));
    }

    #[test]
    fn test_lookup_errors_blame_caller_only_for_unknown_user() {
        assert!(matches!(
            lookup_error(StatusCode::NOT_FOUND, ""),
            IdentityError::Rejected(_)
        ));
        for status in [
            StatusCode::UNAUTHORIZED,
            StatusCode::FORBIDDEN,
            StatusCode::INTERNAL_SERVER_ERROR,
            StatusCode::TOO_MANY_REQUESTS,
        ] {
            assert!(
                matches!(lookup_error(status, "nope"), IdentityError::Unavailable(_)),
                "{status}"
            );
        }
    }

    #[test]
    fn test_display_name_preference() {
        let user = WhopUser {
            username: Some("lifter".into()),
            name: Some("Lee".into()),
        };
        assert_eq!(user.display_name(), "lifter");

        let user = WhopUser {
            username: None,
            name: Some("Lee".into()),
        };
        assert_eq!(user.display_name(), "Lee");

        let user = WhopUser {
            username: Some(" ".into()),
            name: None,
        };
        assert_eq!(user.display_name(), FALLBACK_DISPLAY_NAME);
    }
}
