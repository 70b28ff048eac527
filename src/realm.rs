//! Realm representation and locale-set derivation.
//!
//! Translation cleanup has to visit every locale a realm can show text in. That
//! set is not stored anywhere; it is derived from the realm's default locale and
//! its supported-locales list by [`LocaleSet::for_realm`].

use crate::admin_api::AdminApi;
use crate::error::RealmLoadError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Locale assumed when a realm lists no supported locales.
pub const DEFAULT_LOCALE: &str = "en";

/// The subset of a realm's representation the attribute-group screen needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RealmRepresentation {
    pub realm: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_locale: Option<String>,
    #[serde(default)]
    pub supported_locales: Vec<String>,
    #[serde(default)]
    pub internationalization_enabled: bool,
}

impl RealmRepresentation {
    /// Create a realm with internationalization disabled and no locales.
    pub fn new(realm: impl Into<String>) -> Self {
        Self {
            realm: realm.into(),
            default_locale: None,
            supported_locales: Vec::new(),
            internationalization_enabled: false,
        }
    }

    /// Enable internationalization with the given default and supported locales.
    pub fn with_locales<I, S>(mut self, default_locale: impl Into<String>, supported: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.internationalization_enabled = true;
        self.default_locale = Some(default_locale.into());
        self.supported_locales = supported.into_iter().map(Into::into).collect();
        self
    }
}

/// Look up a realm, turning a missing realm into an error.
pub async fn load_realm<A: AdminApi>(
    api: &A,
    realm: &str,
) -> Result<RealmRepresentation, RealmLoadError> {
    match api.find_realm(realm).await {
        Ok(Some(representation)) => Ok(representation),
        Ok(None) => Err(RealmLoadError::NotFound {
            realm: realm.to_string(),
        }),
        Err(source) => Err(RealmLoadError::Lookup {
            realm: realm.to_string(),
            source,
        }),
    }
}

/// Deduplicated set of locales whose translations must be kept in sync.
///
/// Iteration yields the default locale first, then supported locales in the
/// order the realm lists them. Equality ignores order.
#[derive(Debug, Clone, Default)]
pub struct LocaleSet {
    locales: Vec<String>,
}

impl LocaleSet {
    /// Derive the locale set of a realm.
    ///
    /// The set is the union of the default locale (when non-empty) and the
    /// supported locales, or `fallback` when the realm lists none.
    pub fn for_realm(realm: &RealmRepresentation, fallback: &str) -> Self {
        let defaults = realm
            .default_locale
            .iter()
            .filter(|locale| !locale.is_empty())
            .map(String::as_str);

        let supported: Vec<&str> = if realm.supported_locales.is_empty() {
            vec![fallback]
        } else {
            realm.supported_locales.iter().map(String::as_str).collect()
        };

        defaults.chain(supported).collect()
    }

    /// Number of distinct locales.
    pub fn len(&self) -> usize {
        self.locales.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locales.is_empty()
    }

    pub fn contains(&self, locale: &str) -> bool {
        self.locales.iter().any(|l| l == locale)
    }

    /// Iterate locales in derivation order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.locales.iter().map(String::as_str)
    }

    /// The locales as an ordered set, for order-independent comparison.
    pub fn to_set(&self) -> BTreeSet<String> {
        self.locales.iter().cloned().collect()
    }
}

impl<'a> FromIterator<&'a str> for LocaleSet {
    fn from_iter<T: IntoIterator<Item = &'a str>>(iter: T) -> Self {
        let mut locales: Vec<String> = Vec::new();
        for locale in iter {
            if !locales.iter().any(|l| l == locale) {
                locales.push(locale.to_string());
            }
        }
        Self { locales }
    }
}

impl PartialEq for LocaleSet {
    fn eq(&self, other: &Self) -> bool {
        self.to_set() == other.to_set()
    }
}

impl Eq for LocaleSet {}
