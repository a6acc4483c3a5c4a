//! The relation type registry.
//!
//! The registry is the single source of truth for which relation types
//! exist. It is validated once when built and never mutated afterwards;
//! a changed configuration produces a new registry.
//!
//! A process-wide instance lives behind a `OnceLock`. Readers never
//! lock: `global()` hands out a shared `Arc`.

use crate::error::RegistryError;
use crate::relation_type::{builtin_types, RelationType};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, OnceLock};
use tracing::{debug, info};

/// Name of the type used when none is given.
pub const DEFAULT_RELATION_TYPE: &str = "relatedTo";

static GLOBAL: OnceLock<Arc<RelationTypeRegistry>> = OnceLock::new();

/// A validated, immutable set of relation types.
#[derive(Debug, Clone)]
pub struct RelationTypeRegistry {
    types: Vec<RelationType>,
    by_name: HashMap<String, usize>,
    default_type: String,
}

impl Default for RelationTypeRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl RelationTypeRegistry {
    /// Builds a registry from a list of types and the name of the default.
    ///
    /// Fails when a name is malformed or duplicated, an inverse does not
    /// point back, a symmetric type declares an inverse, a color is not
    /// `#rrggbb`, or the default is not among the types.
    pub fn new(types: Vec<RelationType>, default_type: impl Into<String>) -> Result<Self, RegistryError> {
        let default_type = default_type.into();
        let mut by_name = HashMap::with_capacity(types.len());

        for (index, ty) in types.iter().enumerate() {
            if !is_valid_type_name(&ty.name) {
                return Err(RegistryError::InvalidName(ty.name.clone()));
            }
            if !is_valid_color(&ty.color) {
                return Err(RegistryError::InvalidColor {
                    name: ty.name.clone(),
                    color: ty.color.clone(),
                });
            }
            if by_name.insert(ty.name.clone(), index).is_some() {
                return Err(RegistryError::DuplicateName(ty.name.clone()));
            }
        }

        for ty in &types {
            let Some(inverse) = &ty.inverse else {
                continue;
            };
            if ty.is_symmetric {
                return Err(RegistryError::SymmetricWithInverse(ty.name.clone()));
            }
            let points_back = by_name
                .get(inverse)
                .map(|&i| types[i].inverse.as_deref() == Some(ty.name.as_str()))
                .unwrap_or(false);
            if !points_back {
                return Err(RegistryError::InverseMismatch {
                    name: ty.name.clone(),
                    inverse: inverse.clone(),
                });
            }
        }

        if !by_name.contains_key(&default_type) {
            return Err(RegistryError::UnknownDefault(default_type));
        }

        debug!("Built relation type registry with {} types", types.len());

        Ok(Self {
            types,
            by_name,
            default_type,
        })
    }

    /// The ten system-defined types with `relatedTo` as the default.
    pub fn builtin() -> Self {
        let types = builtin_types();
        let by_name = types
            .iter()
            .enumerate()
            .map(|(i, ty)| (ty.name.clone(), i))
            .collect();

        Self {
            types,
            by_name,
            default_type: DEFAULT_RELATION_TYPE.to_string(),
        }
    }

    /// Looks up a type by exact name.
    pub fn get(&self, name: &str) -> Option<&RelationType> {
        self.by_name.get(name).map(|&i| &self.types[i])
    }

    /// Looks up a type by exact name, failing if it is not registered.
    pub fn resolve(&self, name: &str) -> Result<&RelationType, RegistryError> {
        self.get(name)
            .ok_or_else(|| RegistryError::UnknownType(name.to_string()))
    }

    pub fn is_valid(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// All types in registration order.
    pub fn all(&self) -> &[RelationType] {
        &self.types
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn default_type(&self) -> &RelationType {
        // The default is checked against `by_name` at construction.
        &self.types[self.by_name[&self.default_type]]
    }

    /// Name of the type implied in the reverse direction.
    ///
    /// Symmetric types imply themselves; paired types imply their
    /// inverse; everything else implies nothing.
    pub fn inverse_name(&self, name: &str) -> Option<&str> {
        let ty = self.get(name)?;
        if ty.is_symmetric {
            Some(ty.name.as_str())
        } else {
            ty.inverse.as_deref()
        }
    }

    /// Builds a replacement registry, refusing to drop any type still in use.
    ///
    /// `usage` maps type names to the number of stored edges of that type.
    pub fn replace_checked(
        &self,
        types: Vec<RelationType>,
        default_type: impl Into<String>,
        usage: &HashMap<String, usize>,
    ) -> Result<Self, RegistryError> {
        let kept: HashSet<&str> = types.iter().map(|t| t.name.as_str()).collect();

        for existing in &self.types {
            if kept.contains(existing.name.as_str()) {
                continue;
            }
            let count = usage.get(&existing.name).copied().unwrap_or(0);
            if count > 0 {
                return Err(RegistryError::InUse {
                    name: existing.name.clone(),
                    count,
                });
            }
        }

        Self::new(types, default_type)
    }
}

/// Returns true if `name` matches `[a-zA-Z][a-zA-Z0-9]*`.
pub fn is_valid_type_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => chars.all(|c| c.is_ascii_alphanumeric()),
        _ => false,
    }
}

fn is_valid_color(color: &str) -> bool {
    color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit())
}

/// Installs the process-wide registry. Succeeds at most once.
pub fn install(registry: RelationTypeRegistry) -> Result<Arc<RelationTypeRegistry>, RegistryError> {
    let registry = Arc::new(registry);
    GLOBAL
        .set(registry.clone())
        .map_err(|_| RegistryError::AlreadyInstalled)?;
    info!("Installed relation type registry ({} types)", registry.len());
    Ok(registry)
}

/// The process-wide registry, falling back to the built-in types.
pub fn global() -> Arc<RelationTypeRegistry> {
    GLOBAL
        .get_or_init(|| Arc::new(RelationTypeRegistry::builtin()))
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relation_type::RelationCategory;

    #[test]
    fn test_builtin_registry_is_valid() {
        let builtin = RelationTypeRegistry::builtin();
        let rebuilt = RelationTypeRegistry::new(builtin.all().to_vec(), DEFAULT_RELATION_TYPE);
        assert!(rebuilt.is_ok());
    }

    #[test]
    fn test_install_once() {
        let installed = install(RelationTypeRegistry::builtin()).unwrap();
        assert!(Arc::ptr_eq(&installed, &global()));
        assert_eq!(
            install(RelationTypeRegistry::builtin()).unwrap_err(),
            RegistryError::AlreadyInstalled
        );
    }

    #[test]
    fn test_inverse_name() {
        let registry = RelationTypeRegistry::builtin();

        assert_eq!(registry.inverse_name("broader"), Some("narrower"));
        assert_eq!(registry.inverse_name("narrower"), Some("broader"));
        assert_eq!(registry.inverse_name("synonym"), Some("synonym"));
        assert_eq!(registry.inverse_name("seeAlso"), None);
        assert_eq!(registry.inverse_name("nope"), None);
    }

    #[test]
    fn test_resolve_unknown() {
        let registry = RelationTypeRegistry::builtin();
        assert_eq!(
            registry.resolve("invalidType").unwrap_err(),
            RegistryError::UnknownType("invalidType".into())
        );
        assert!(registry.resolve("partOf").is_ok());
    }

    #[test]
    fn test_type_name_pattern() {
        assert!(is_valid_type_name("relatedTo"));
        assert!(is_valid_type_name("a1"));
        assert!(!is_valid_type_name("1a"));
        assert!(!is_valid_type_name("has part"));
        assert!(!is_valid_type_name("has-part"));
        assert!(!is_valid_type_name(""));
    }

    #[test]
    fn test_rejects_one_sided_inverse() {
        let types = vec![
            RelationType::new("dependsOn", "Depends On", "#000000").with_inverse("dependencyOf"),
            RelationType::new("dependencyOf", "Dependency Of", "#000000"),
        ];

        let err = RelationTypeRegistry::new(types, "dependsOn").unwrap_err();
        assert!(matches!(err, RegistryError::InverseMismatch { .. }));
    }

    #[test]
    fn test_rejects_symmetric_with_inverse() {
        let types = vec![
            RelationType::new("twin", "Twin", "#000000").symmetric().with_inverse("other"),
            RelationType::new("other", "Other", "#000000").with_inverse("twin"),
        ];

        let err = RelationTypeRegistry::new(types, "twin").unwrap_err();
        assert_eq!(err, RegistryError::SymmetricWithInverse("twin".into()));
    }

    #[test]
    fn test_rejects_bad_color_and_duplicates() {
        let bad_color = vec![RelationType::new("x", "X", "red")];
        assert!(matches!(
            RelationTypeRegistry::new(bad_color, "x"),
            Err(RegistryError::InvalidColor { .. })
        ));

        let dupes = vec![
            RelationType::new("x", "X", "#000000"),
            RelationType::new("x", "X again", "#000000"),
        ];
        assert_eq!(
            RelationTypeRegistry::new(dupes, "x").unwrap_err(),
            RegistryError::DuplicateName("x".into())
        );
    }

    #[test]
    fn test_rejects_unknown_default() {
        let types = vec![RelationType::new("x", "X", "#000000")];
        assert_eq!(
            RelationTypeRegistry::new(types, "y").unwrap_err(),
            RegistryError::UnknownDefault("y".into())
        );
    }

    #[test]
    fn test_replace_checked_protects_used_types() {
        let registry = RelationTypeRegistry::builtin();
        let without_antonym: Vec<_> = registry
            .all()
            .iter()
            .filter(|t| t.name != "antonym")
            .cloned()
            .collect();

        let mut usage = HashMap::new();
        usage.insert("antonym".to_string(), 3);
        let err = registry
            .replace_checked(without_antonym.clone(), "relatedTo", &usage)
            .unwrap_err();
        assert_eq!(
            err,
            RegistryError::InUse {
                name: "antonym".into(),
                count: 3
            }
        );

        usage.insert("antonym".to_string(), 0);
        let replaced = registry
            .replace_checked(without_antonym, "relatedTo", &usage)
            .unwrap();
        assert!(!replaced.is_valid("antonym"));
        assert_eq!(replaced.len(), 9);
    }

    #[test]
    fn test_custom_type_added() {
        let mut types = builtin_types();
        types.push(
            RelationType::new("measuredBy", "Measured By", "#101010")
                .with_category(RelationCategory::Associative),
        );

        let registry = RelationTypeRegistry::new(types, "relatedTo").unwrap();
        assert!(registry.is_valid("measuredBy"));
        assert_eq!(registry.inverse_name("measuredBy"), None);
    }
}
