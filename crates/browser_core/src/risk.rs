use std::collections::{BTreeMap, BTreeSet};

use crate::security::{RiskEntry, RiskLevel, RiskRegistry, Whitelist};

/// Domains shorter than this are not checked for edit-distance look-alikes.
const MIN_FUZZY_LEN: usize = 6;

/// Static risk registry and whitelist.
///
/// Denied hosts, and their subdomains, are `Danger`. A host that is not
/// protected itself but folds to the same skeleton as a protected domain,
/// or sits one edit away from it, is a `Warning`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RiskList {
    protected: BTreeSet<String>,
    denied: BTreeMap<String, String>,
}

impl RiskList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn protect(&mut self, domain: &str) -> &mut Self {
        self.protected.insert(normalize(domain));
        self
    }

    pub fn deny(&mut self, domain: &str, description: impl Into<String>) -> &mut Self {
        self.denied.insert(normalize(domain), description.into());
        self
    }

    pub fn protected_len(&self) -> usize {
        self.protected.len()
    }

    pub fn denied_len(&self) -> usize {
        self.denied.len()
    }

    fn denied_entry(&self, host: &str) -> Option<&String> {
        suffixes(host).find_map(|suffix| self.denied.get(suffix))
    }

    fn lookalike_of(&self, host: &str) -> Option<&str> {
        for suffix in suffixes(host).filter(|suffix| suffix.contains('.')) {
            let folded = skeleton(suffix);
            for domain in &self.protected {
                if domain == suffix {
                    continue;
                }
                if folded == skeleton(domain)
                    || (domain.len() >= MIN_FUZZY_LEN && edit_distance(suffix, domain) == 1)
                {
                    return Some(domain.as_str());
                }
            }
        }
        None
    }
}

impl Whitelist for RiskList {
    fn contains(&self, host: &str) -> bool {
        let host = normalize(host);
        let found = suffixes(&host).any(|suffix| self.protected.contains(suffix));
        found
    }
}

impl RiskRegistry for RiskList {
    fn lookup(&self, host: &str) -> Option<RiskEntry> {
        let host = normalize(host);
        if let Some(description) = self.denied_entry(&host) {
            return Some(RiskEntry {
                level: RiskLevel::Danger,
                description: description.clone(),
            });
        }
        if self.contains(&host) {
            return None;
        }
        let entry = self.lookalike_of(&host).map(|domain| RiskEntry {
            level: RiskLevel::Warning,
            description: format!("{host} looks like {domain}"),
        });
        entry
    }
}

fn normalize(host: &str) -> String {
    let host = host.trim().trim_end_matches('.').to_ascii_lowercase();
    match host.strip_prefix("www.") {
        Some(rest) => rest.to_string(),
        None => host,
    }
}

/// `a.b.c`, `b.c`, `c`.
fn suffixes(host: &str) -> impl Iterator<Item = &str> {
    std::iter::once(host).chain(
        host.char_indices()
            .filter(|(_, c)| *c == '.')
            .map(move |(i, _)| &host[i + 1..]),
    )
}

/// Fold characters commonly swapped in phishing domains.
fn skeleton(domain: &str) -> String {
    let folded: String = domain
        .chars()
        .filter(|c| *c != '-')
        .map(|c| match c {
            '0' => 'o',
            '1' | 'i' | '|' => 'l',
            '3' => 'e',
            '5' => 's',
            '@' => 'a',
            other => other,
        })
        .collect();
    folded.replace("rn", "m").replace("vv", "w")
}

fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != cb);
            current[j + 1] = substitution.min(previous[j + 1] + 1).min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[b.len()]
}
