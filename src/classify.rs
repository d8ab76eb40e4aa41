//! Keyword-driven column role classification.
//!
//! Roles are decided from column names alone through a rule table: each
//! [`RoleRule`] lists substrings, and a column qualifies for the rule's role
//! when its lower-cased name contains any of them. Every rule is evaluated the
//! same way, so adding a keyword or a rule needs no code change. A column may
//! qualify for several roles, or for none.

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

use crate::schema::ColumnDescriptor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Activity,
    Location,
    Size,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Activity, Role::Location, Role::Size];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Activity => "activity",
            Role::Location => "location",
            Role::Size => "size",
        }
    }

    /// Wording used when telling the user no column was found.
    pub fn description(&self) -> &'static str {
        match self {
            Role::Activity => "activity-related",
            Role::Location => "location-related",
            Role::Size => "employment/size",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRule {
    pub role: Role,
    pub keywords: Vec<String>,
}

impl RoleRule {
    pub fn new<I, S>(role: Role, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            role,
            keywords: keywords.into_iter().map(Into::into).collect(),
        }
    }

    /// Case-insensitive substring match against any keyword.
    pub fn matches(&self, column_name: &str) -> bool {
        let lowered = column_name.to_lowercase();
        self.keywords
            .iter()
            .any(|keyword| lowered.contains(&keyword.to_lowercase()))
    }
}

/// The rule table, evaluated in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeywordSets {
    rules: Vec<RoleRule>,
}

impl KeywordSets {
    pub fn new(rules: Vec<RoleRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[RoleRule] {
        &self.rules
    }
}

impl Default for KeywordSets {
    fn default() -> Self {
        Self::new(vec![
            RoleRule::new(Role::Activity, ["act", "actividad"]),
            RoleRule::new(
                Role::Location,
                ["municipio", "localidad", "entidad", "calle", "colonia"],
            ),
            RoleRule::new(Role::Size, ["per_ocu", "personal", "estrato", "empleado"]),
        ])
    }
}

/// Candidate columns per role, each list in table column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RoleCandidates {
    roles: BTreeMap<Role, Vec<String>>,
}

impl RoleCandidates {
    pub fn get(&self, role: Role) -> &[String] {
        self.roles.get(&role).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Default pick for a role: its first candidate.
    pub fn first(&self, role: Role) -> Option<&str> {
        self.get(role).first().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Role, &[String])> {
        self.roles.iter().map(|(role, columns)| (*role, columns.as_slice()))
    }

    /// Column names that qualified for no role.
    pub fn unclassified<'a>(&self, descriptors: &'a [ColumnDescriptor]) -> Vec<&'a str> {
        descriptors
            .iter()
            .map(|descriptor| descriptor.name.as_str())
            .filter(|name| !self.roles.values().any(|columns| columns.iter().any(|c| c == name)))
            .collect()
    }
}

pub fn classify(descriptors: &[ColumnDescriptor], keyword_sets: &KeywordSets) -> RoleCandidates {
    let mut roles: BTreeMap<Role, Vec<String>> =
        Role::ALL.iter().map(|role| (*role, Vec::new())).collect();
    for descriptor in descriptors {
        for rule in keyword_sets.rules() {
            if !rule.matches(&descriptor.name) {
                continue;
            }
            let columns = roles.entry(rule.role).or_default();
            if !columns.contains(&descriptor.name) {
                columns.push(descriptor.name.clone());
            }
        }
    }
    RoleCandidates { roles }
}
