//! Output formatting utilities

use console::{style, StyledObject};
use vaultgate_org::Role;

/// Print a success message
pub fn success(message: &str) {
    println!("{} {}", style("✓").green().bold(), message);
}

/// Print an error message
pub fn error(message: &str) {
    eprintln!("{} {}", style("✗").red().bold(), message);
}

/// Print a warning message
pub fn warning(message: &str) {
    println!("{} {}", style("!").yellow().bold(), message);
}

/// Print an info message
pub fn info(message: &str) {
    println!("{} {}", style("→").blue(), message);
}

/// Create a styled header
pub fn header(text: &str) -> String {
    style(text).bold().to_string()
}

/// Create a styled key-value line
pub fn key_value(key: &str, value: &str) -> String {
    format!("  {}: {}", style(key).dim(), value)
}

/// Role label colored by privilege
pub fn role_style(role: Role) -> StyledObject<String> {
    match role {
        Role::Owner => style(role.to_string()).red().bold(),
        Role::Admin => style(role.to_string()).yellow(),
        Role::Member => style(role.to_string()).green(),
        Role::Suspended => style(role.to_string()).dim(),
    }
}

/// Print a value as pretty JSON
pub fn json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
