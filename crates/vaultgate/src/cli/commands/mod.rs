//! CLI commands

mod access;
mod account;
mod completions;
mod grant;
mod group;
mod invite;
mod member;
mod org;
mod rotate;
mod vault;
mod verify;

pub use access::AccessCommand;
pub use account::AccountCommand;
pub use completions::CompletionsCommand;
pub use grant::GrantCommand;
pub use group::GroupCommand;
pub use invite::InviteCommand;
pub use member::MemberCommand;
pub use org::OrgCommand;
pub use rotate::RotateCommand;
pub use vault::VaultCommand;
pub use verify::VerifyCommand;
