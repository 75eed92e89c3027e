//! Local files: organization documents, account key files and join requests

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context as _};
use tracing::{debug, info};

use vaultgate_org::config::load_config_or_default;
use vaultgate_org::{
    Account, AccountKeyFile, AgeContainer, Config, CryptoProvider, Ed25519Provider, JoinRequest,
    Organization, UnlockedOrganization,
};

use crate::cli::Cli;

/// Vaultgate home directory (`~/.vaultgate`)
pub fn home_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".vaultgate"))
}

/// Default account key file (`~/.vaultgate/account.yaml`)
pub fn default_account_file() -> Option<PathBuf> {
    home_dir().map(|dir| dir.join("account.yaml"))
}

/// Read an organization document
pub fn load_org(path: &Path) -> anyhow::Result<Organization> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read organization document {}", path.display()))?;
    let org: Organization = serde_yaml::from_str(&content)
        .with_context(|| format!("Invalid organization document {}", path.display()))?;
    debug!(path = %path.display(), org = %org.id, "loaded organization");
    Ok(org)
}

/// Write an organization document, replacing the previous one atomically
pub fn save_org(path: &Path, org: &Organization) -> anyhow::Result<()> {
    let content = serde_yaml::to_string(org)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let tmp = path.with_extension("yaml.tmp");
    std::fs::write(&tmp, content)?;
    std::fs::rename(&tmp, path)?;
    debug!(path = %path.display(), revision = %org.revision, "saved organization");
    Ok(())
}

/// Read an account key file
pub fn load_account(path: &Path) -> anyhow::Result<Account> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read account key file {}", path.display()))?;
    let file: AccountKeyFile = serde_yaml::from_str(&content)
        .with_context(|| format!("Invalid account key file {}", path.display()))?;
    Ok(Account::from_key_file(&file)?)
}

/// Write an account key file readable only by the current user
pub fn save_account(path: &Path, account: &Account) -> anyhow::Result<()> {
    if path.exists() {
        bail!("Refusing to overwrite existing key file {}", path.display());
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    std::fs::write(path, serde_yaml::to_string(&account.to_key_file())?)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    }
    info!(path = %path.display(), account = %account.id, "saved account key file");
    Ok(())
}

/// Read a join request
pub fn load_request(path: &Path) -> anyhow::Result<JoinRequest> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read join request {}", path.display()))?;
    serde_yaml::from_str(&content)
        .with_context(|| format!("Invalid join request {}", path.display()))
}

/// Write a join request
pub fn save_request(path: &Path, request: &JoinRequest) -> anyhow::Result<()> {
    std::fs::write(path, serde_yaml::to_string(request)?)?;
    Ok(())
}

/// Resolved configuration and file locations for one command
pub struct Context {
    /// Loaded configuration
    pub config: Config,

    /// Organization document path
    pub document: PathBuf,

    account_file: Option<PathBuf>,
}

impl Context {
    /// Resolve configuration from the working directory and CLI overrides
    pub fn from_cli(cli: &Cli) -> anyhow::Result<Self> {
        let cwd = std::env::current_dir()?;
        let (config, config_path) = load_config_or_default(&cwd)?;
        if let Some(path) = &config_path {
            debug!(path = %path.display(), "using config");
        }

        let document = cli
            .org
            .clone()
            .unwrap_or_else(|| config.org.document.clone());
        let account_file = cli
            .account
            .clone()
            .or_else(|| config.account_key_file())
            .or_else(default_account_file);

        Ok(Self {
            config,
            document,
            account_file,
        })
    }

    /// Account key file in use
    pub fn account_file(&self) -> anyhow::Result<&Path> {
        match &self.account_file {
            Some(path) => Ok(path),
            None => bail!(
                "No account key file configured. Pass --account or set VAULTGATE_ACCOUNT_KEY_FILE"
            ),
        }
    }

    /// Load the configured account
    pub fn load_account(&self) -> anyhow::Result<Account> {
        load_account(self.account_file()?)
    }

    /// Load the organization document
    pub fn load_org(&self) -> anyhow::Result<Organization> {
        load_org(&self.document)
    }

    /// Save the organization document
    pub fn save_org(&self, org: &Organization) -> anyhow::Result<()> {
        save_org(&self.document, org)
    }

    /// Crypto provider for signing and verification
    pub fn provider(&self) -> Arc<dyn CryptoProvider> {
        Arc::new(Ed25519Provider::new())
    }

    /// Unlock `org` as `account`, applying configured limits
    pub async fn unlock<'o>(
        &self,
        org: &'o mut Organization,
        account: &Account,
    ) -> anyhow::Result<UnlockedOrganization<'o, AgeContainer>> {
        let unlocked = org
            .unlock(account, self.provider())
            .await
            .with_context(|| format!("Account '{}' cannot unlock the organization", account.id))?;
        Ok(unlocked
            .with_concurrency(self.config.crypto.concurrency)
            .with_invite_ttl(self.config.invite_ttl()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use vaultgate_org::OrgType;

    #[test]
    fn test_account_roundtrip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("keys").join("alice.yaml");
        let account = Account::generate("alice", "Alice", "alice@example.com");

        save_account(&path, &account).unwrap();
        let loaded = load_account(&path).unwrap();
        assert_eq!(loaded.id, "alice");
        assert_eq!(loaded.public_key(), account.public_key());

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }

        assert!(save_account(&path, &account).is_err());
    }

    #[tokio::test]
    async fn test_org_document_roundtrip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("org.yaml");
        let owner = Account::generate("alice", "Alice", "alice@example.com");

        let mut org = Organization::new("Acme", "alice", OrgType::Basic, AgeContainer::new());
        org.initialize(&owner, Arc::new(Ed25519Provider::new()))
            .await
            .unwrap()
            .lock();
        save_org(&path, &org).unwrap();
        assert!(!temp.path().join("org.yaml.tmp").exists());

        let mut loaded = load_org(&path).unwrap();
        assert_eq!(loaded.id, org.id);
        assert_eq!(loaded.revision, org.revision);

        let unlocked = loaded
            .unlock(&owner, Arc::new(Ed25519Provider::new()))
            .await
            .unwrap();
        unlocked.verify_all().await.unwrap();
    }

    #[test]
    fn test_join_request_file_roundtrip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bob.request.yaml");
        let bob = Account::generate("bob", "Bob", "bob@example.com");
        let request = JoinRequest::new(&bob, "org-1", &[3u8; 32]);

        save_request(&path, &request).unwrap();
        let loaded = load_request(&path).unwrap();
        assert_eq!(loaded, request);
        loaded.verify("org-1", &[3u8; 32]).unwrap();
    }

    #[test]
    fn test_missing_document_has_context() {
        let temp = TempDir::new().unwrap();
        let err = load_org(&temp.path().join("missing.yaml")).unwrap_err();
        assert!(err.to_string().contains("missing.yaml"));
    }
}
