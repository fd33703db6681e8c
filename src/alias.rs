//! Static table of organisational mailing lists and the greeting each one receives.
//!
//! Every alias is also a mailbox at the organisation's domain, so the table doubles as an
//! address rule: `token@org-domain`. Keys are stored lower-cased and matched case-insensitively.

use std::collections::HashMap;

/// Mailing lists and aliases known without asking the directory.
const BUILTIN_ALIASES: &[(&str, &str)] = &[
    ("fachschaft", "Liebe Fachschaft"),
    ("flachschaft", "Liebe Fachschaft"),
    ("bernd", "Liebe Fachschaft"),
    ("fsinformatik", "Liebe Fachschaft"),
    ("fsphysik", "Liebe Fachschaft"),
    ("fsmathematik", "Liebe Fachschaft"),
    ("fsmathinf", "Liebe Fachschaft"),
    ("infostudkom", "Liebes Mitglied der Studienkommission Informatik"),
    ("tistudkom", "Liebes Mitglied der Studkom TI"),
    ("mathstudkom", "Liebe MathStudKomLerInnen"),
    ("mathestudkom", "Liebe MathStudKomLerInnen"),
    ("physstudkom", "Liebe Mitglied der Studkom Physik"),
    ("physikstudkom", "Liebe Mitglied der Studkom Physik"),
    ("studkomphysik", "Liebe Mitglied der Studkom Physik"),
    ("scstudkom", "Liebe Mitglied der Studkom SciCom"),
    ("mathfakrat", "Liebes Mitglied des MatheInfo-Fakrats"),
    ("fakratmathinf", "Liebes Mitglied des MatheInfo-Fakrats"),
    ("physfakrat", "Liebes Mitglied des Physik-Fakrats"),
    ("fakratphys", "Liebes Mitglied des Physik-Fakrats"),
    ("fakratphysik", "Liebes Mitglied des Physik-Fakrats"),
    ("akfest", "Liebes Mitglied der AK-Fest Liste"),
    ("vertagt", "Liebe SiMo"),
    ("schluesselinhaber", "Liebe/r Bewohner/in des Fachschaftsraums"),
    (
        "finanzen",
        "Sehr geehrte Menschen mit Ahnung der vielen Goldbarren",
    ),
];

#[derive(Clone, Debug)]
/// Read-only mapping from alias token to greeting, bound to one organisational domain.
pub struct AliasTable {
    greetings: HashMap<String, String>,
    domain: String,
}

impl AliasTable {
    #[must_use]
    /// Builds a table from arbitrary `(token, greeting)` pairs; tokens are lower-cased.
    pub fn new<I, K, V>(entries: I, domain: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let greetings = entries
            .into_iter()
            .map(|(token, greeting)| (token.as_ref().to_lowercase(), greeting.into()))
            .collect();
        Self {
            greetings,
            domain: domain.into(),
        }
    }

    #[must_use]
    /// The student council's own lists, addressed at `domain`.
    pub fn builtin(domain: impl Into<String>) -> Self {
        Self::new(BUILTIN_ALIASES.iter().copied(), domain)
    }

    #[must_use]
    /// Whether `token` names an alias, ignoring case.
    pub fn contains(&self, token: &str) -> bool {
        self.greetings.contains_key(&token.to_lowercase())
    }

    #[must_use]
    /// Greeting phrase for `token`, if it is an alias.
    pub fn greeting_for(&self, token: &str) -> Option<&str> {
        self.greetings
            .get(&token.to_lowercase())
            .map(String::as_str)
    }

    #[must_use]
    /// Mailbox of the alias at the organisation's domain, if `token` is an alias.
    pub fn address_for(&self, token: &str) -> Option<String> {
        let key = token.to_lowercase();
        self.greetings
            .contains_key(&key)
            .then(|| format!("{key}@{}", self.domain))
    }

    #[must_use]
    /// Domain appended to alias tokens.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    #[must_use]
    /// Number of aliases in the table.
    pub fn len(&self) -> usize {
        self.greetings.len()
    }

    #[must_use]
    /// Whether the table has no aliases at all.
    pub fn is_empty(&self) -> bool {
        self.greetings.is_empty()
    }
}

#[cfg(test)]
#[path = "tests/alias.rs"]
mod tests;
