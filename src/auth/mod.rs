//! Sign-in bootstrap — tags the session with a display-only identity.
//!
//! The identity is never read back by any flow, so this module absorbs every
//! failure: a custom-token sign-in that fails falls back to anonymous, and an
//! anonymous sign-in that fails falls back to a locally generated id.  The
//! controller and the API flows work identically either way.

use std::sync::Arc;

use rand::Rng;
use serde_json::json;

use crate::config::AuthConfig;
use crate::net::Transport;

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// A resolved session identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Opaque user id, shown in the frontend status line.
    pub uid: String,
    /// How the id was obtained.
    pub kind: IdentityKind,
}

/// Provenance of an [`Identity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityKind {
    /// Signed in with a pre-issued custom token.
    CustomToken,
    /// Signed in anonymously against the auth service.
    Anonymous,
    /// Generated locally after sign-in failed or was disabled.
    Local,
}

impl Identity {
    fn local() -> Self {
        let uid: String = {
            let mut rng = rand::thread_rng();
            (0..16)
                .map(|_| std::char::from_digit(rng.gen_range(0..16u32), 16).unwrap_or('0'))
                .collect()
        };
        Self {
            uid: format!("local-{uid}"),
            kind: IdentityKind::Local,
        }
    }
}

// ---------------------------------------------------------------------------
// sign_in
// ---------------------------------------------------------------------------

/// Resolve a session identity per the auth config.
///
/// Order: custom token (when configured) → anonymous → local fallback.  This
/// function never fails; the worst outcome is a local id.
pub async fn sign_in(transport: &Arc<dyn Transport>, config: &AuthConfig, api_key: &str) -> Identity {
    if !config.enabled {
        return Identity::local();
    }

    if let Some(token) = config.custom_token.as_deref() {
        let url = format!(
            "{}/accounts:signInWithCustomToken?key={}",
            config.base_url, api_key
        );
        let body = json!({ "token": token, "returnSecureToken": true });
        match post_for_uid(transport, &url, &body).await {
            Some(uid) => {
                return Identity {
                    uid,
                    kind: IdentityKind::CustomToken,
                };
            }
            None => {
                log::warn!("auth: custom token sign-in failed, falling back to anonymous");
            }
        }
    }

    let url = format!("{}/accounts:signUp?key={}", config.base_url, api_key);
    let body = json!({ "returnSecureToken": true });
    match post_for_uid(transport, &url, &body).await {
        Some(uid) => Identity {
            uid,
            kind: IdentityKind::Anonymous,
        },
        None => {
            log::warn!("auth: anonymous sign-in failed, using a local id");
            Identity::local()
        }
    }
}

/// One sign-in POST; returns the `localId` field of a 2xx JSON reply.
async fn post_for_uid(
    transport: &Arc<dyn Transport>,
    url: &str,
    body: &serde_json::Value,
) -> Option<String> {
    let reply = transport.post_json(url, body).await.ok()?;
    if !(200..300).contains(&reply.status) {
        log::debug!("auth: sign-in returned HTTP {}", reply.status);
        return None;
    }
    let value: serde_json::Value = serde_json::from_str(&reply.body).ok()?;
    value["localId"].as_str().map(|s| s.to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::{TransportError, WireReply};
    use async_trait::async_trait;

    struct FixedTransport {
        status: u16,
        body: String,
        fail: bool,
    }

    #[async_trait]
    impl Transport for FixedTransport {
        async fn post_json(
            &self,
            _url: &str,
            _body: &serde_json::Value,
        ) -> Result<WireReply, TransportError> {
            if self.fail {
                return Err(TransportError("connection refused".into()));
            }
            Ok(WireReply {
                status: self.status,
                body: self.body.clone(),
            })
        }
    }

    fn transport(status: u16, body: &str, fail: bool) -> Arc<dyn Transport> {
        Arc::new(FixedTransport {
            status,
            body: body.into(),
            fail,
        })
    }

    #[tokio::test]
    async fn anonymous_sign_in_returns_local_id() {
        let t = transport(200, r#"{"localId":"uid-123"}"#, false);
        let config = AuthConfig::default();
        let identity = sign_in(&t, &config, "k").await;
        assert_eq!(identity.uid, "uid-123");
        assert_eq!(identity.kind, IdentityKind::Anonymous);
    }

    #[tokio::test]
    async fn custom_token_sign_in_when_configured() {
        let t = transport(200, r#"{"localId":"uid-tok"}"#, false);
        let config = AuthConfig {
            custom_token: Some("tok".into()),
            ..AuthConfig::default()
        };
        let identity = sign_in(&t, &config, "k").await;
        assert_eq!(identity.uid, "uid-tok");
        assert_eq!(identity.kind, IdentityKind::CustomToken);
    }

    #[tokio::test]
    async fn network_failure_falls_back_to_local_id() {
        let t = transport(0, "", true);
        let config = AuthConfig::default();
        let identity = sign_in(&t, &config, "k").await;
        assert_eq!(identity.kind, IdentityKind::Local);
        assert!(identity.uid.starts_with("local-"));
    }

    #[tokio::test]
    async fn http_error_falls_back_to_local_id() {
        let t = transport(400, r#"{"error":"bad"}"#, false);
        let config = AuthConfig::default();
        let identity = sign_in(&t, &config, "k").await;
        assert_eq!(identity.kind, IdentityKind::Local);
    }

    #[tokio::test]
    async fn disabled_auth_skips_the_network() {
        // A failing transport proves no request is issued.
        let t = transport(0, "", true);
        let config = AuthConfig {
            enabled: false,
            ..AuthConfig::default()
        };
        let identity = sign_in(&t, &config, "k").await;
        assert_eq!(identity.kind, IdentityKind::Local);
    }

    #[tokio::test]
    async fn missing_local_id_in_reply_falls_back() {
        let t = transport(200, r#"{"idToken":"only-a-token"}"#, false);
        let config = AuthConfig::default();
        let identity = sign_in(&t, &config, "k").await;
        assert_eq!(identity.kind, IdentityKind::Local);
    }

    #[test]
    fn local_ids_are_unique_enough() {
        let a = Identity::local();
        let b = Identity::local();
        assert_ne!(a.uid, b.uid);
    }
}
