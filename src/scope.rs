//! Permission scopes and named presets.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

use crate::error::AuthError;

/// A single permission scope understood by the authorization server.
///
/// Variant order is the canonical wire order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Scope {
    #[serde(rename = "openid")]
    #[strum(to_string = "openid")]
    OpenId,
    Profile,
    Email,
    ReadRepos,
    WriteRepos,
    ManageRepos,
    InferenceApi,
    WriteDiscussions,
}

/// Named scope bundles.
///
/// ```
/// use hub_auth::scope::{ScopePreset, Scope};
///
/// let scopes = "read-access".parse::<ScopePreset>().unwrap().scopes();
/// assert!(scopes.contains(Scope::ReadRepos));
/// assert_eq!(scopes.to_string(), "openid profile email read-repos");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(serialize_all = "kebab-case")]
pub enum ScopePreset {
    Basic,
    ReadAccess,
    WriteAccess,
    FullAccess,
    InferenceOnly,
    Discussions,
}

impl ScopePreset {
    pub fn scopes(self) -> ScopeSet {
        match self {
            Self::Basic => ScopeSet::basic(),
            Self::ReadAccess => ScopeSet::read_access(),
            Self::WriteAccess => ScopeSet::write_access(),
            Self::FullAccess => ScopeSet::full_access(),
            Self::InferenceOnly => ScopeSet::inference_only(),
            Self::Discussions => ScopeSet::discussions(),
        }
    }
}

/// Deduplicated set of scopes, rendered in canonical order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ScopeSet(BTreeSet<Scope>);

impl ScopeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn basic() -> Self {
        [Scope::OpenId, Scope::Profile, Scope::Email].into_iter().collect()
    }

    pub fn read_access() -> Self {
        Self::basic().with(Scope::ReadRepos)
    }

    pub fn write_access() -> Self {
        Self::read_access().with(Scope::WriteRepos)
    }

    pub fn full_access() -> Self {
        Scope::iter().collect()
    }

    pub fn inference_only() -> Self {
        [Scope::OpenId, Scope::InferenceApi].into_iter().collect()
    }

    pub fn discussions() -> Self {
        [Scope::OpenId, Scope::Profile, Scope::WriteDiscussions]
            .into_iter()
            .collect()
    }

    pub fn with(mut self, scope: Scope) -> Self {
        self.0.insert(scope);
        self
    }

    pub fn insert(&mut self, scope: Scope) -> bool {
        self.0.insert(scope)
    }

    pub fn contains(&self, scope: Scope) -> bool {
        self.0.contains(&scope)
    }

    pub fn union(&self, other: &ScopeSet) -> ScopeSet {
        Self(self.0.union(&other.0).copied().collect())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = Scope> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<Scope> for ScopeSet {
    fn from_iter<I: IntoIterator<Item = Scope>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<ScopePreset> for ScopeSet {
    fn from(preset: ScopePreset) -> Self {
        preset.scopes()
    }
}

impl fmt::Display for ScopeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for scope in &self.0 {
            if !first {
                f.write_str(" ")?;
            }
            f.write_str(scope.as_ref())?;
            first = false;
        }
        Ok(())
    }
}

/// Parses a space-separated scope string (`"openid profile"`).
impl FromStr for ScopeSet {
    type Err = AuthError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        raw.split_whitespace()
            .map(|value| {
                value.parse::<Scope>().map_err(|_| {
                    AuthError::InvalidConfiguration(format!("unknown scope: {value}"))
                })
            })
            .collect()
    }
}
