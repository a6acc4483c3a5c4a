//! Relation types between glossary terms.
//!
//! A relation type is a named kind of semantic link: `broader`,
//! `synonym`, `calculatedFrom` and so on. Types are data, not code, so
//! deployments can add their own through configuration.

use serde::{Deserialize, Serialize};

/// How a relation type organizes terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RelationCategory {
    /// Parent/child style structure (broader, partOf).
    Hierarchical,

    /// Loose association between peers.
    #[default]
    Associative,

    /// Terms that mean the same (or opposite) thing.
    Equivalence,
}

impl std::fmt::Display for RelationCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Hierarchical => "hierarchical",
            Self::Associative => "associative",
            Self::Equivalence => "equivalence",
        };
        write!(f, "{}", s)
    }
}

fn default_true() -> bool {
    true
}

/// A named kind of relation with its behavioral flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationType {
    /// Unique name, `[a-zA-Z][a-zA-Z0-9]*`.
    pub name: String,

    pub display_name: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub category: RelationCategory,

    /// A→B implies B→A of the same type.
    #[serde(default)]
    pub is_symmetric: bool,

    #[serde(default)]
    pub is_transitive: bool,

    /// Name of the paired type: A→B of this type implies B→A of the inverse.
    #[serde(default, rename = "inverseRelation")]
    pub inverse: Option<String>,

    /// Whether endpoints may belong to different glossaries.
    #[serde(default = "default_true", rename = "isCrossGlossaryAllowed")]
    pub cross_domain_allowed: bool,

    #[serde(default)]
    pub is_system_defined: bool,

    /// Display color, `#rrggbb`.
    pub color: String,

    /// Predicate used in semantic exports, as a full IRI or `prefix:local`.
    #[serde(default)]
    pub rdf_predicate: Option<String>,
}

impl RelationType {
    /// Creates an associative, non-symmetric, cross-glossary type.
    pub fn new(name: impl Into<String>, display_name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display_name: display_name.into(),
            description: None,
            category: RelationCategory::Associative,
            is_symmetric: false,
            is_transitive: false,
            inverse: None,
            cross_domain_allowed: true,
            is_system_defined: false,
            color: color.into(),
            rdf_predicate: None,
        }
    }

    pub fn with_category(mut self, category: RelationCategory) -> Self {
        self.category = category;
        self
    }

    pub fn symmetric(mut self) -> Self {
        self.is_symmetric = true;
        self
    }

    pub fn transitive(mut self) -> Self {
        self.is_transitive = true;
        self
    }

    pub fn with_inverse(mut self, inverse: impl Into<String>) -> Self {
        self.inverse = Some(inverse.into());
        self
    }

    pub fn within_glossary(mut self) -> Self {
        self.cross_domain_allowed = false;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_rdf_predicate(mut self, predicate: impl Into<String>) -> Self {
        self.rdf_predicate = Some(predicate.into());
        self
    }

    fn system(mut self) -> Self {
        self.is_system_defined = true;
        self
    }
}

/// The ten system-defined relation types every deployment starts with.
pub fn builtin_types() -> Vec<RelationType> {
    use RelationCategory::*;

    vec![
        RelationType::new("relatedTo", "Related To", "#1570ef")
            .symmetric()
            .with_description("General association between two terms")
            .with_rdf_predicate("skos:related")
            .system(),
        RelationType::new("synonym", "Synonym", "#b42318")
            .with_category(Equivalence)
            .symmetric()
            .with_description("Terms with the same meaning")
            .with_rdf_predicate("skos:exactMatch")
            .system(),
        RelationType::new("antonym", "Antonym", "#f79009")
            .with_category(Equivalence)
            .symmetric()
            .with_description("Terms with opposite meanings")
            .system(),
        RelationType::new("broader", "Broader", "#067647")
            .with_category(Hierarchical)
            .transitive()
            .with_inverse("narrower")
            .within_glossary()
            .with_description("The target is a more general concept")
            .with_rdf_predicate("skos:broader")
            .system(),
        RelationType::new("narrower", "Narrower", "#079455")
            .with_category(Hierarchical)
            .transitive()
            .with_inverse("broader")
            .within_glossary()
            .with_description("The target is a more specific concept")
            .with_rdf_predicate("skos:narrower")
            .system(),
        RelationType::new("partOf", "Part Of", "#6938ef")
            .with_category(Hierarchical)
            .transitive()
            .with_inverse("hasPart")
            .within_glossary()
            .with_description("The source is a component of the target")
            .system(),
        RelationType::new("hasPart", "Has Part", "#7a5af8")
            .with_category(Hierarchical)
            .transitive()
            .with_inverse("partOf")
            .within_glossary()
            .with_description("The target is a component of the source")
            .system(),
        RelationType::new("calculatedFrom", "Calculated From", "#dd2590")
            .with_inverse("usedToCalculate")
            .with_description("The source metric is derived from the target")
            .system(),
        RelationType::new("usedToCalculate", "Used To Calculate", "#ee46bc")
            .with_inverse("calculatedFrom")
            .with_description("The source is an input to the target metric")
            .system(),
        RelationType::new("seeAlso", "See Also", "#667085")
            .with_description("The target is worth reading alongside the source")
            .with_rdf_predicate("rdfs:seeAlso")
            .system(),
    ]
}
