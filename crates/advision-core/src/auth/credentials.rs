use anyhow::{Context, Result};
use keyring::credential::CredentialPersistence;
use keyring::Entry;

const SERVICE_NAME: &str = "advision";

/// Login passwords remembered in the OS keychain, keyed by email.
pub struct CredentialStore;

impl CredentialStore {
    /// Store the password for an account in the OS keychain
    pub fn store(email: &str, password: &str) -> Result<()> {
        Self::entry(email)?
            .set_password(password)
            .context("Failed to store password in keychain")
    }

    /// Retrieve the remembered password for an account
    pub fn get_password(email: &str) -> Result<String> {
        Self::entry(email)?
            .get_password()
            .context("Failed to retrieve password from keychain")
    }

    /// Forget the remembered password. Succeeds when none was stored.
    pub fn delete(email: &str) -> Result<()> {
        match Self::entry(email)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e).context("Failed to delete credential from keychain"),
        }
    }

    pub fn has_credentials(email: &str) -> bool {
        Self::get_password(email).is_ok()
    }

    /// Whether stored passwords outlive the entry that wrote them.
    ///
    /// False only when no platform keychain backend is compiled in and
    /// keyring fell back to its in-entry mock store.
    pub fn is_persistent() -> bool {
        !matches!(
            keyring::default::default_credential_builder().persistence(),
            CredentialPersistence::EntryOnly
        )
    }

    fn entry(email: &str) -> Result<Entry> {
        Entry::new(SERVICE_NAME, email).context("Failed to create keyring entry")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(any(target_os = "linux", target_os = "macos", target_os = "windows"))]
    #[test]
    fn test_platform_keychain_backend_is_compiled_in() {
        assert!(CredentialStore::is_persistent());
    }
}
