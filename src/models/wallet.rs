use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

use super::Chain;

/// Placeholder substituted for the credential in every outbound payload.
pub const CREDENTIAL_PLACEHOLDER: &str = "[protected]";

/// Opaque reference to a credential held by the custody collaborator.
///
/// Deliberately not `Serialize`/`Deserialize`: the handle never leaves the
/// process, and the secret it refers to never enters engine state at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CredentialHandle(Uuid);

impl CredentialHandle {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CredentialHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CredentialHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cred-{}", &self.0.to_string()[..8])
    }
}

/// A registered trading wallet. Has no `Serialize` impl; anything that
/// leaves the engine goes through [`Wallet::view`].
#[derive(Debug, Clone)]
pub struct Wallet {
    pub id: Uuid,
    pub chain: Chain,
    pub address: String,
    pub credential: CredentialHandle,
    pub label: Option<String>,
    pub added_at: DateTime<Utc>,
}

impl Wallet {
    /// Redacted representation safe for broadcast.
    pub fn view(&self) -> WalletView {
        WalletView {
            id: self.id,
            chain: self.chain,
            address: self.address.clone(),
            credential: CREDENTIAL_PLACEHOLDER,
            label: self.label.clone(),
            added_at: self.added_at,
        }
    }
}

/// Wire representation of a wallet with the credential redacted.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletView {
    pub id: Uuid,
    pub chain: Chain,
    pub address: String,
    pub credential: &'static str,
    pub label: Option<String>,
    pub added_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_redacts_credential() {
        let wallet = Wallet {
            id: Uuid::new_v4(),
            chain: Chain::Base,
            address: "0xabc".into(),
            credential: CredentialHandle::new(),
            label: Some("main".into()),
            added_at: Utc::now(),
        };

        let json = serde_json::to_value(wallet.view()).unwrap();
        assert_eq!(json["credential"], CREDENTIAL_PLACEHOLDER);
        assert_eq!(json["chain"], "base");
        assert_eq!(json["address"], "0xabc");
    }
}
