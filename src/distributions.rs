// Distribution/version lookup table.
//
// The package host identifies an OS release by an opaque numeric id, while
// users name it as `distro/version` (for example `ubuntu/jammy`). The
// built-in table is created once per process; a `Distributions` value can
// add entries on top of it without touching the shared copy.

use once_cell::sync::Lazy;
use std::collections::BTreeMap;

const BUILTIN: &[(&str, &str, &str)] = &[
    ("debian", "wheezy", "24"),
    ("debian", "jessie", "25"),
    ("debian", "stretch", "149"),
    ("debian", "buster", "150"),
    ("debian", "bullseye", "207"),
    ("debian", "bookworm", "215"),
    ("ubuntu", "trusty", "20"),
    ("ubuntu", "xenial", "165"),
    ("ubuntu", "bionic", "190"),
    ("ubuntu", "focal", "210"),
    ("ubuntu", "jammy", "237"),
    ("el", "6", "27"),
    ("el", "7", "140"),
    ("el", "8", "205"),
    ("el", "9", "240"),
    ("fedora", "36", "231"),
    ("fedora", "37", "238"),
    ("fedora", "38", "241"),
];

static BUILTIN_TABLE: Lazy<Distributions> = Lazy::new(|| {
    let mut table = Distributions::empty();
    for (distro, version, id) in BUILTIN {
        table.insert(distro, version, id);
    }
    table
});

/// Map from `distro/version` to the host's distro version id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Distributions {
    ids: BTreeMap<String, String>,
}

impl Distributions {
    fn empty() -> Self {
        Self {
            ids: BTreeMap::new(),
        }
    }

    /// The process-wide built-in table.
    pub fn builtin() -> &'static Distributions {
        &BUILTIN_TABLE
    }

    /// Copy of the built-in table extended with `extra`, where keys are
    /// `distro/version` strings. Extra entries win over built-in ones.
    pub fn with_extra<'a, I>(extra: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        let mut table = Self::builtin().clone();
        for (key, id) in extra {
            table.ids.insert(key.trim_matches('/').to_string(), id.clone());
        }
        table
    }

    fn insert(&mut self, distro: &str, version: &str, id: &str) {
        self.ids.insert(format!("{distro}/{version}"), id.to_string());
    }

    /// Resolve a distribution and version to the host's identifier.
    pub fn distro_version_id(&self, distro: &str, version: &str) -> Option<&str> {
        self.ids
            .get(&format!("{distro}/{version}"))
            .map(String::as_str)
    }

    /// Entries in `distro/version` order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.ids.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl Default for Distributions {
    fn default() -> Self {
        Self::builtin().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn resolves_known_pairs() {
        let table = Distributions::builtin();
        assert_eq!(table.distro_version_id("ubuntu", "xenial"), Some("165"));
        assert_eq!(table.distro_version_id("el", "7"), Some("140"));
    }

    #[test]
    fn unknown_pairs_are_none() {
        let table = Distributions::builtin();
        assert_eq!(table.distro_version_id("ubuntu", "warty"), None);
        assert_eq!(table.distro_version_id("xenial", "ubuntu"), None);
        assert_eq!(table.distro_version_id("", ""), None);
    }

    #[test]
    fn extra_entries_extend_and_override() {
        let extra: HashMap<String, String> = [
            ("ubuntu/noble".to_string(), "300".to_string()),
            ("el/7".to_string(), "999".to_string()),
        ]
        .into_iter()
        .collect();
        let table = Distributions::with_extra(&extra);

        assert_eq!(table.distro_version_id("ubuntu", "noble"), Some("300"));
        assert_eq!(table.distro_version_id("el", "7"), Some("999"));
        // the shared table is untouched
        assert_eq!(Distributions::builtin().distro_version_id("el", "7"), Some("140"));
        assert_eq!(table.len(), Distributions::builtin().len() + 1);
    }

    #[test]
    fn iterates_in_sorted_order() {
        let keys: Vec<&str> = Distributions::builtin().iter().map(|(k, _)| k).collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
    }
}
