//! Glossary terms as the relation engine sees them.
//!
//! The engine never owns term state. It works with stable identifiers
//! and asks the entity store for the few fields it needs: the glossary a
//! term belongs to, its fully qualified name, and a label for display.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of a glossary term.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TermId(String);

impl TermId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TermId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TermId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for TermId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Stable identifier of a glossary (the domain a term belongs to).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GlossaryId(String);

impl GlossaryId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GlossaryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GlossaryId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A lightweight handle to a term: identifier, FQN and display label.
///
/// This is what relation listings and graph nodes carry around.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TermRef {
    pub id: TermId,
    pub fully_qualified_name: String,
    pub display_name: String,
}

/// A glossary as stored by the entity store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlossaryRecord {
    pub id: GlossaryId,
    pub name: String,
    pub display_name: Option<String>,
    pub description: Option<String>,
}

impl GlossaryRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: GlossaryId::new(id),
            name: name.into(),
            display_name: None,
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Label used in exports: display name if set, otherwise the name.
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }
}

/// A term as stored by the entity store.
///
/// Deletion is soft: a deleted term keeps its record so that edges
/// pointing at it can still be explained, but it no longer counts as
/// existing for new relations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TermRecord {
    pub id: TermId,
    pub name: String,
    pub fully_qualified_name: String,
    pub display_name: Option<String>,
    pub glossary: GlossaryId,
    pub parent: Option<TermId>,
    pub description: Option<String>,
    pub synonyms: Vec<String>,
    pub deleted: bool,
}

impl TermRecord {
    /// Creates a top-level term in `glossary`.
    ///
    /// The FQN follows the `glossary.term` convention.
    pub fn new(id: impl Into<String>, glossary: &GlossaryRecord, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: TermId::new(id),
            fully_qualified_name: format!("{}.{}", glossary.name, name),
            name,
            display_name: None,
            glossary: glossary.id.clone(),
            parent: None,
            description: None,
            synonyms: Vec::new(),
            deleted: false,
        }
    }

    /// Nests this term under `parent`, extending the parent's FQN.
    pub fn with_parent(mut self, parent: &TermRecord) -> Self {
        self.fully_qualified_name = format!("{}.{}", parent.fully_qualified_name, self.name);
        self.parent = Some(parent.id.clone());
        self
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_synonyms(mut self, synonyms: Vec<String>) -> Self {
        self.synonyms = synonyms;
        self
    }

    /// Label shown to people: display name, else the name in title case.
    pub fn label(&self) -> String {
        match &self.display_name {
            Some(name) if !name.is_empty() => name.clone(),
            _ => title_case(&self.name),
        }
    }

    pub fn to_ref(&self) -> TermRef {
        TermRef {
            id: self.id.clone(),
            fully_qualified_name: self.fully_qualified_name.clone(),
            display_name: self.label(),
        }
    }
}

/// Turns `camelCase` or `snake_case` names into `Title Case`.
pub fn title_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_lower = false;
    let mut start = true;

    for c in name.chars() {
        if c == '_' || c == '-' || c == ' ' {
            if !out.ends_with(' ') && !out.is_empty() {
                out.push(' ');
            }
            start = true;
            prev_lower = false;
            continue;
        }
        if c.is_uppercase() && prev_lower {
            out.push(' ');
            start = true;
        }
        if start {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        start = false;
        prev_lower = c.is_lowercase() || c.is_ascii_digit();
    }

    out.trim_end().to_string()
}
