//! Default configuration values

/// Default configuration file name (TOML)
pub const DEFAULT_CONFIG_TOML: &str = "vaultgate.toml";

/// Default configuration file name (YAML)
pub const DEFAULT_CONFIG_YAML: &str = "vaultgate.yaml";

/// Default organization document path
pub const DEFAULT_DOCUMENT: &str = "org.yaml";

/// Default number of signatures processed at once
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Default invite lifetime (one week)
pub const DEFAULT_INVITE_TTL_HOURS: u32 = 168;

/// Environment variable overriding the account key file
pub const ACCOUNT_KEY_FILE_ENV: &str = "VAULTGATE_ACCOUNT_KEY_FILE";

/// Get list of config file names to search for, in priority order
pub fn config_file_names() -> Vec<&'static str> {
    vec![
        DEFAULT_CONFIG_TOML,
        DEFAULT_CONFIG_YAML,
        ".vaultgate.toml",
        ".vaultgate.yaml",
    ]
}
