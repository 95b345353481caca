use crate::error::{Error, Result};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    Authenticated { uid: String },
    Anonymous { uid: String },
}

impl Identity {
    pub fn uid(&self) -> &str {
        match self {
            Self::Authenticated { uid } | Self::Anonymous { uid } => uid,
        }
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, Self::Anonymous { .. })
    }
}

pub trait IdentityProvider: Send + Sync {
    fn sign_in_with_custom_token(&self, token: &str) -> Result<Identity>;
    fn sign_in_anonymously(&self) -> Result<Identity>;
}

/// Exchange the injected credential for an identity, or sign in anonymously
/// when none was supplied. A rejected credential yields `None`: the caller
/// keeps running without a board subscription.
pub fn bootstrap_identity(provider: &dyn IdentityProvider, token: Option<&str>) -> Option<Identity> {
    let attempt = match token.map(str::trim).filter(|t| !t.is_empty()) {
        Some(token) => provider.sign_in_with_custom_token(token),
        None => provider.sign_in_anonymously(),
    };
    match attempt {
        Ok(identity) => {
            log::info!(
                "signed in as {} ({})",
                identity.uid(),
                if identity.is_anonymous() { "anonymous" } else { "custom token" }
            );
            Some(identity)
        }
        Err(e) => {
            log::error!("sign-in failed, boards unavailable: {}", e);
            None
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenClaims {
    uid: Option<String>,
    sub: Option<String>,
}

/// Offline provider: reads the `uid` claim of a JWT-shaped custom token
/// without verifying its signature.
#[derive(Debug, Default)]
pub struct LocalIdentityProvider;

impl IdentityProvider for LocalIdentityProvider {
    fn sign_in_with_custom_token(&self, token: &str) -> Result<Identity> {
        let mut parts = token.split('.');
        let payload = match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(_), Some(payload), Some(_), None) => payload,
            _ => return Err(Error::InvalidCredential("expected header.payload.signature".into())),
        };
        let bytes = URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .map_err(|e| Error::InvalidCredential(e.to_string()))?;
        let claims: TokenClaims =
            serde_json::from_slice(&bytes).map_err(|e| Error::InvalidCredential(e.to_string()))?;
        let uid = claims
            .uid
            .or(claims.sub)
            .filter(|u| !u.is_empty())
            .ok_or_else(|| Error::InvalidCredential("token carries no uid".into()))?;
        Ok(Identity::Authenticated { uid })
    }

    fn sign_in_anonymously(&self) -> Result<Identity> {
        Ok(Identity::Anonymous {
            uid: format!("anon-{}", uuid::Uuid::new_v4()),
        })
    }
}
