//! Account console navigation model.
//!
//! End users sign in to the account console of a realm and navigate its pages.
//! The model covers what the navigation regression checks need: credential
//! validation against a realm's users, the page hierarchy, and the regions each
//! page renders, addressed by test id.
//!
//! # Example Usage
//!
//! ```rust
//! use realm_profile_admin::account::{AccountConsole, AccountDirectory};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let directory = AccountDirectory::new();
//! directory.add_realm("photoz", true).await;
//! directory.add_user("photoz", "jdoe", "jdoe").await?;
//!
//! let console = AccountConsole::new(directory);
//! let mut session = console.login("photoz", "jdoe", "jdoe").await?;
//! let page = session.click("Account security")?;
//!
//! assert_eq!(
//!     page.region("account-security/linked-accounts"),
//!     Some("Linked accounts")
//! );
//! # Ok(())
//! # }
//! ```

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Utc};
use log::{info, warn};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Pages of the account console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccountPage {
    PersonalInfo,
    AccountSecurity,
    SigningIn,
    DeviceActivity,
    LinkedAccounts,
    Applications,
    Groups,
    Resources,
}

impl AccountPage {
    /// Top-level navigation entries in display order.
    pub const NAVIGATION: [AccountPage; 5] = [
        AccountPage::PersonalInfo,
        AccountPage::AccountSecurity,
        AccountPage::Applications,
        AccountPage::Groups,
        AccountPage::Resources,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            AccountPage::PersonalInfo => "Personal info",
            AccountPage::AccountSecurity => "Account security",
            AccountPage::SigningIn => "Signing in",
            AccountPage::DeviceActivity => "Device activity",
            AccountPage::LinkedAccounts => "Linked accounts",
            AccountPage::Applications => "Applications",
            AccountPage::Groups => "Groups",
            AccountPage::Resources => "Resources",
        }
    }

    /// Test id of the navigation region rendering this page's link.
    pub fn test_id(&self) -> &'static str {
        match self {
            AccountPage::PersonalInfo => "personal-info",
            AccountPage::AccountSecurity => "account-security",
            AccountPage::SigningIn => "account-security/signing-in",
            AccountPage::DeviceActivity => "account-security/device-activity",
            AccountPage::LinkedAccounts => "account-security/linked-accounts",
            AccountPage::Applications => "applications",
            AccountPage::Groups => "groups",
            AccountPage::Resources => "resources",
        }
    }

    pub fn children(&self) -> &'static [AccountPage] {
        match self {
            AccountPage::AccountSecurity => &[
                AccountPage::SigningIn,
                AccountPage::DeviceActivity,
                AccountPage::LinkedAccounts,
            ],
            _ => &[],
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::NAVIGATION
            .into_iter()
            .flat_map(|page| std::iter::once(page).chain(page.children().iter().copied()))
            .find(|page| page.label() == label)
    }
}

/// Account console errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccountError {
    #[error("Realm '{realm}' not found")]
    UnknownRealm { realm: String },

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("No page labelled '{label}'")]
    UnknownPage { label: String },
}

#[derive(Debug, Default)]
struct RealmAccounts {
    linked_accounts_enabled: bool,
    // username -> credential hash
    users: HashMap<String, String>,
}

/// Realms and their users as seen by the account console.
#[derive(Debug, Clone, Default)]
pub struct AccountDirectory {
    realms: Arc<RwLock<HashMap<String, RealmAccounts>>>,
}

impl AccountDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a realm, keeping its users if it already exists.
    pub async fn add_realm(&self, realm: impl Into<String>, linked_accounts_enabled: bool) {
        let mut realms = self.realms.write().await;
        realms.entry(realm.into()).or_default().linked_accounts_enabled = linked_accounts_enabled;
    }

    /// Register a user, replacing the password of an existing one.
    pub async fn add_user(
        &self,
        realm: &str,
        username: &str,
        password: &str,
    ) -> Result<(), AccountError> {
        let mut realms = self.realms.write().await;
        let accounts = realms
            .get_mut(realm)
            .ok_or_else(|| AccountError::UnknownRealm {
                realm: realm.to_string(),
            })?;
        accounts.users.insert(
            username.to_string(),
            credential_hash(realm, username, password),
        );
        Ok(())
    }

    async fn authenticate(
        &self,
        realm: &str,
        username: &str,
        password: &str,
    ) -> Result<bool, AccountError> {
        let realms = self.realms.read().await;
        let accounts = realms.get(realm).ok_or_else(|| AccountError::UnknownRealm {
            realm: realm.to_string(),
        })?;

        match accounts.users.get(username) {
            Some(stored) if *stored == credential_hash(realm, username, password) => {
                Ok(accounts.linked_accounts_enabled)
            }
            _ => Err(AccountError::InvalidCredentials),
        }
    }
}

fn credential_hash(realm: &str, username: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(realm.as_bytes());
    hasher.update(b":");
    hasher.update(username.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Entry point of the account console.
#[derive(Debug, Clone)]
pub struct AccountConsole {
    directory: AccountDirectory,
}

impl AccountConsole {
    pub fn new(directory: AccountDirectory) -> Self {
        Self { directory }
    }

    /// Sign in to the account console of `realm`.
    pub async fn login(
        &self,
        realm: &str,
        username: &str,
        password: &str,
    ) -> Result<AccountSession, AccountError> {
        let linked_accounts_enabled = match self
            .directory
            .authenticate(realm, username, password)
            .await
        {
            Ok(enabled) => enabled,
            Err(err) => {
                warn!("Sign-in of '{}' to realm '{}' failed: {}", username, realm, err);
                return Err(err);
            }
        };

        let session = AccountSession::new(realm, username, linked_accounts_enabled);
        info!(
            "User '{}' signed in to account console of realm '{}' (session: '{}')",
            username, realm, session.id
        );
        Ok(session)
    }
}

/// A signed-in account console session.
#[derive(Debug, Clone)]
pub struct AccountSession {
    pub id: Uuid,
    pub realm: String,
    pub username: String,
    pub started_at: DateTime<Utc>,
    token: String,
    linked_accounts_enabled: bool,
    current: AccountPage,
}

impl AccountSession {
    fn new(realm: &str, username: &str, linked_accounts_enabled: bool) -> Self {
        let id = Uuid::new_v4();
        let mut hasher = Sha256::new();
        hasher.update(id.as_bytes());
        hasher.update(username.as_bytes());
        let token = URL_SAFE_NO_PAD.encode(hasher.finalize());

        Self {
            id,
            realm: realm.to_string(),
            username: username.to_string(),
            started_at: Utc::now(),
            token,
            linked_accounts_enabled,
            current: AccountPage::PersonalInfo,
        }
    }

    /// Bearer token of the session.
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn current_page(&self) -> AccountPage {
        self.current
    }

    /// Labels of the top-level navigation.
    pub fn navigation(&self) -> Vec<&'static str> {
        AccountPage::NAVIGATION.iter().map(|page| page.label()).collect()
    }

    /// Follow the navigation link labelled `label` and render the page.
    pub fn click(&mut self, label: &str) -> Result<PageView, AccountError> {
        let page = AccountPage::from_label(label)
            .filter(|page| self.is_visible(*page))
            .ok_or_else(|| AccountError::UnknownPage {
                label: label.to_string(),
            })?;
        self.current = page;
        Ok(self.render(page))
    }

    fn is_visible(&self, page: AccountPage) -> bool {
        page != AccountPage::LinkedAccounts || self.linked_accounts_enabled
    }

    fn render(&self, page: AccountPage) -> PageView {
        let mut regions = vec![Region {
            test_id: page.test_id(),
            text: page.label().to_string(),
        }];
        regions.extend(
            page.children()
                .iter()
                .filter(|child| self.is_visible(**child))
                .map(|child| Region {
                    test_id: child.test_id(),
                    text: child.label().to_string(),
                }),
        );
        PageView { page, regions }
    }
}

/// A rendered region of a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub test_id: &'static str,
    pub text: String,
}

/// A rendered account console page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageView {
    pub page: AccountPage,
    pub regions: Vec<Region>,
}

impl PageView {
    /// Text of the region with the given test id.
    pub fn region(&self, test_id: &str) -> Option<&str> {
        self.regions
            .iter()
            .find(|region| region.test_id == test_id)
            .map(|region| region.text.as_str())
    }
}
