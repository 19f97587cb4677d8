//! Roster CLI - administrative command-line client for the roster service
//!
//! Thin front end over the session and access-control subsystem: it logs
//! in and out, shows the current identity, and answers permission checks.
//! The CRUD screens themselves live in the web front end.

use clap::{Parser, Subcommand};
use roster_auth::{
    require_login, when_permitted, Access, AuthClient, CredentialStorage, Permission, Redirect,
    SessionStore,
};
use roster_core::{init_logging, RosterConfig};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

#[derive(Parser)]
#[command(name = "roster")]
#[command(about = "Administrative client for the roster service")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in against the identity endpoint
    Login {
        /// Account email
        email: String,

        /// Account password
        #[arg(short, long)]
        password: String,
    },

    /// Register a new account (does not log in)
    Register {
        /// Full name
        name: String,

        /// Account email
        email: String,

        /// Account password
        #[arg(short, long)]
        password: String,
    },

    /// Drop the current session
    Logout,

    /// Show the currently authenticated user
    Whoami,

    /// Check whether the current session holds a permission
    Can {
        /// Permission identifier, e.g. EDIT_TAG or ADMIN
        permission: String,
    },
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("roster").join("config.toml"))
}

fn default_session_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("roster")
        .join("session")
}

fn load_config(path: Option<PathBuf>) -> anyhow::Result<RosterConfig> {
    match path.or_else(default_config_path) {
        Some(path) if path.exists() => {
            debug!("Loading config from {}", path.display());
            Ok(RosterConfig::from_file(path)?)
        }
        _ => Ok(RosterConfig::default()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.clone())?;
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    init_logging(&config.logging).map_err(|e| anyhow::anyhow!("logging setup failed: {e}"))?;

    let session_dir = config
        .storage
        .session_dir
        .clone()
        .unwrap_or_else(default_session_dir);

    let store = Arc::new(SessionStore::new(CredentialStorage::new(session_dir)?));
    store.initialize();

    let client = AuthClient::new(config.api.base_url.clone(), store.clone());

    match cli.command {
        Commands::Login { email, password } => {
            let session = client.login(&email, &password).await?;
            if let Some(user) = session.user() {
                println!("Logged in as {} <{}>", user.name, email);
            }
        }

        Commands::Register {
            name,
            email,
            password,
        } => {
            let payload = client.register(&name, &email, &password).await?;
            println!("Registered: {}", serde_json::to_string_pretty(&payload)?);
        }

        Commands::Logout => {
            client.logout();
            println!("Logged out.");
        }

        Commands::Whoami => match require_login(&store, || store.current_user()) {
            Access::Granted(Some(user)) => {
                print_user(&store, &user);
            }
            Access::Granted(None) | Access::Denied(Redirect::Unauthorized) => {
                println!("Not authorized.");
                std::process::exit(1);
            }
            Access::Denied(Redirect::Login) => {
                println!("Not logged in. Run `roster login <email>` first.");
                std::process::exit(1);
            }
        },

        Commands::Can { permission } => {
            if evaluate_permission(&store, &permission) {
                println!("yes: {} is granted", permission.to_uppercase());
            } else {
                println!("no: {} is denied", permission.to_uppercase());
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

/// Evaluate a raw permission identifier against the current session.
/// Identifiers outside the closed vocabulary always evaluate to denied.
fn evaluate_permission(store: &SessionStore, raw: &str) -> bool {
    Permission::from_str(raw)
        .map(|p| store.has_permission(p))
        .unwrap_or(false)
}

fn print_user(store: &SessionStore, user: &roster_auth::User) {
    println!("{} (id {})", user.name, user.id);
    if let Some(email) = &user.email {
        println!("  email: {}", email);
    }
    if !user.roles.is_empty() {
        let mut roles: Vec<_> = user.roles.iter().cloned().collect();
        roles.sort();
        println!("  roles: {}", roles.join(", "));
    }
    let mut permissions: Vec<_> = user.permissions.iter().map(|p| p.to_string()).collect();
    permissions.sort();
    println!("  permissions: {}", permissions.join(", "));

    if let Some(note) = when_permitted(store, Permission::ManageRoles, || "role management") {
        println!("  extra: {} available", note);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roster_auth::User;
    use std::collections::HashSet;

    fn store_with(permissions: &[Permission]) -> (tempfile::TempDir, SessionStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(CredentialStorage::new(dir.path()).unwrap());
        let user = User {
            id: 1,
            name: "An".to_string(),
            email: None,
            roles: HashSet::new(),
            permissions: permissions.iter().copied().collect(),
        };
        store.set_session(user, "tok".to_string()).unwrap();
        (dir, store)
    }

    #[test]
    fn known_identifiers_follow_the_session_grants() {
        let (_dir, store) = store_with(&[Permission::EditTag]);
        assert!(evaluate_permission(&store, "EDIT_TAG"));
        assert!(evaluate_permission(&store, "edit_tag"));
        assert!(!evaluate_permission(&store, "DELETE_TAG"));
    }

    #[test]
    fn unknown_identifiers_always_evaluate_to_denied() {
        // even an admin session cannot satisfy an identifier outside the vocabulary
        let (_dir, store) = store_with(&[Permission::Admin]);
        assert!(!evaluate_permission(&store, "EDIT_TGA"));
        assert!(!evaluate_permission(&store, ""));
        assert!(evaluate_permission(&store, "DELETE_TAG"));
    }
}
