//! Wallet credential custody.
//!
//! Raw private keys enter here once, on wallet registration, and never
//! come back out. The engine keeps only the opaque handle plus the
//! derived public address.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::errors::CustodyError;
use crate::models::{Chain, ChainFamily, CredentialHandle};

/// Result of importing a raw credential.
#[derive(Debug, Clone)]
pub struct ImportedCredential {
    pub handle: CredentialHandle,
    /// Public address derived from the key.
    pub address: String,
}

#[async_trait]
pub trait CredentialVault: Send + Sync {
    /// Take ownership of a raw key and hand back an opaque reference.
    async fn import(&self, chain: Chain, raw_key: &str)
        -> Result<ImportedCredential, CustodyError>;

    /// Whether a handle refers to a credential this vault still holds.
    async fn holds(&self, handle: CredentialHandle) -> bool;
}

// ---------------------------------------------------------------------------
// In-memory vault
// ---------------------------------------------------------------------------

/// Process-local vault for simulated trading. Keys live only inside this
/// struct; nothing here implements `Serialize` or `Debug`-prints key
/// material.
#[derive(Default)]
pub struct InMemoryVault {
    keys: Mutex<HashMap<CredentialHandle, String>>,
}

impl InMemoryVault {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deterministic pseudo-address so repeated imports of the same key
    /// produce the same address.
    fn derive_address(chain: Chain, raw_key: &str) -> String {
        let mut hasher = DefaultHasher::new();
        raw_key.hash(&mut hasher);
        chain.as_str().hash(&mut hasher);
        let digest = hasher.finish();
        match chain.family() {
            ChainFamily::Evm => format!("0x{digest:016x}{:016x}", digest.rotate_left(17)),
            ChainFamily::AccountModel => format!("{digest:x}{:x}", digest.rotate_left(29)),
        }
    }
}

#[async_trait]
impl CredentialVault for InMemoryVault {
    async fn import(
        &self,
        chain: Chain,
        raw_key: &str,
    ) -> Result<ImportedCredential, CustodyError> {
        let trimmed = raw_key.trim();
        if trimmed.len() < 16 {
            return Err(CustodyError::Rejected(
                "key material too short".to_string(),
            ));
        }

        let handle = CredentialHandle::new();
        let address = Self::derive_address(chain, trimmed);
        self.keys
            .lock()
            .map_err(|_| CustodyError::Rejected("vault lock poisoned".to_string()))?
            .insert(handle, trimmed.to_string());

        Ok(ImportedCredential { handle, address })
    }

    async fn holds(&self, handle: CredentialHandle) -> bool {
        self.keys
            .lock()
            .map(|keys| keys.contains_key(&handle))
            .unwrap_or(false)
    }
}
