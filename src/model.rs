use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::sync::LazyLock;

use serde::{Deserialize, Deserializer, Serialize};

/// A named bucket for a family of consumer webmail domains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Gmail,
    Yahoo,
    Hotmail,
    Outlook,
    Others,
}

/// Known domains per provider. `Others` is the catch-all and owns none.
const PROVIDER_DOMAINS: [(Provider, &[&str]); 4] = [
    (Provider::Gmail, &["gmail.com", "googlemail.com"]),
    (Provider::Yahoo, &["yahoo.com", "yahoo.in", "yahoo.co.in", "ymail.com"]),
    (Provider::Hotmail, &["hotmail.com", "hotmail.co.uk", "hotmail.in", "live.com"]),
    (Provider::Outlook, &["outlook.com", "outlook.in", "msn.com"]),
];

static DOMAIN_INDEX: LazyLock<HashMap<&'static str, Provider>> = LazyLock::new(|| {
    PROVIDER_DOMAINS
        .iter()
        .flat_map(|(provider, domains)| domains.iter().map(move |domain| (*domain, *provider)))
        .collect()
});

impl Provider {
    pub const ALL: [Provider; 5] = [
        Provider::Gmail,
        Provider::Yahoo,
        Provider::Hotmail,
        Provider::Outlook,
        Provider::Others,
    ];

    pub fn from_name(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "gmail" => Some(Provider::Gmail),
            "yahoo" => Some(Provider::Yahoo),
            "hotmail" => Some(Provider::Hotmail),
            "outlook" => Some(Provider::Outlook),
            "others" | "other" => Some(Provider::Others),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Gmail => "gmail",
            Provider::Yahoo => "yahoo",
            Provider::Hotmail => "hotmail",
            Provider::Outlook => "outlook",
            Provider::Others => "others",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Provider::Gmail => "Gmail",
            Provider::Yahoo => "Yahoo",
            Provider::Hotmail => "Hotmail",
            Provider::Outlook => "Outlook",
            Provider::Others => "Others",
        }
    }

    pub fn domains(&self) -> &'static [&'static str] {
        PROVIDER_DOMAINS
            .iter()
            .find(|(provider, _)| provider == self)
            .map(|(_, domains)| *domains)
            .unwrap_or(&[])
    }

    /// Bucket an already lowercased address by the domain after its last `@`.
    pub fn categorize(email: &str) -> Provider {
        let domain = email.rsplit_once('@').map(|(_, domain)| domain).unwrap_or(email);
        DOMAIN_INDEX.get(domain).copied().unwrap_or(Provider::Others)
    }
}

impl std::str::FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Provider::from_name(s).ok_or_else(|| format!("Unknown provider '{s}'"))
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Validated, lowercased, deduplicated addresses grouped by provider.
///
/// Every provider key is present, even when its bucket is empty. An address
/// lives in at most one bucket, and each bucket keeps first-seen order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CategoryBuckets {
    buckets: BTreeMap<Provider, Vec<String>>,
}

impl CategoryBuckets {
    pub fn new() -> Self {
        Self { buckets: Provider::ALL.iter().map(|provider| (*provider, Vec::new())).collect() }
    }

    /// Appends without checking for duplicates; callers go through the
    /// scan accumulator, which owns the seen-set.
    pub(crate) fn push(&mut self, provider: Provider, email: String) {
        self.buckets.entry(provider).or_default().push(email);
    }

    pub fn get(&self, provider: Provider) -> &[String] {
        self.buckets.get(&provider).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (Provider, &[String])> {
        self.buckets.iter().map(|(provider, emails)| (*provider, emails.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.values().all(Vec::is_empty)
    }

    /// All addresses, bucket by bucket in provider order.
    pub fn combined(&self) -> Vec<&str> {
        self.buckets.values().flatten().map(String::as_str).collect()
    }

    pub fn subset(&self, providers: &[Provider]) -> Self {
        let mut subset = CategoryBuckets::new();
        for provider in providers {
            if let Some(emails) = self.buckets.get(provider) {
                subset.buckets.insert(*provider, emails.clone());
            }
        }
        subset
    }

    /// Drop every address found in `known`, returning how many were removed.
    pub fn retain_unknown(&mut self, known: &HashSet<String>) -> usize {
        let before = self.len();
        for emails in self.buckets.values_mut() {
            emails.retain(|email| !known.contains(email));
        }
        before - self.len()
    }

    pub fn summary(&self) -> ScanSummary {
        ScanSummary {
            counts: self
                .buckets
                .iter()
                .map(|(provider, emails)| (*provider, emails.len()))
                .collect(),
            total: self.len(),
        }
    }
}

impl<'de> Deserialize<'de> for CategoryBuckets {
    /// Providers missing from the input come back as empty buckets.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let parsed = BTreeMap::<Provider, Vec<String>>::deserialize(deserializer)?;
        let mut buckets = CategoryBuckets::new();
        buckets.buckets.extend(parsed);
        Ok(buckets)
    }
}

impl Default for CategoryBuckets {
    fn default() -> Self {
        CategoryBuckets::new()
    }
}

/// Per-provider counts for a finished scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanSummary {
    pub counts: BTreeMap<Provider, usize>,
    pub total: usize,
}

impl ScanSummary {
    pub fn count(&self, provider: Provider) -> usize {
        self.counts.get(&provider).copied().unwrap_or_default()
    }
}

/// Transient progress of the scan in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanProgress {
    pub percent: u8,
    pub found: usize,
    pub status: String,
}

impl ScanProgress {
    pub fn started(status: impl Into<String>) -> Self {
        Self { percent: 0, found: 0, status: status.into() }
    }
}

/// Clamped integer percentage of `done` over `total`; an empty job is complete.
pub(crate) fn percent(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    let ratio = (done.min(total) as u128 * 100) / total as u128;
    ratio as u8
}
