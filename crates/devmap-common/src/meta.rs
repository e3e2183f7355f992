//! Kubernetes object metadata shared by every generated resource

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::Error;

// =============================================================================
// ObjectMeta - Canonical metadata for all generated resources
// =============================================================================

/// Standard Kubernetes ObjectMeta for generated resources.
///
/// Every resource in a bundle is built from the same name, namespace, labels,
/// and annotations, so this type is deliberately small.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    /// Resource name
    pub name: String,
    /// Resource namespace
    pub namespace: String,
    /// Labels
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    /// Annotations
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
}

impl ObjectMeta {
    /// Create metadata with no labels or annotations
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            labels: BTreeMap::new(),
            annotations: BTreeMap::new(),
        }
    }

    /// Add a label
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    /// Replace all labels
    pub fn with_labels(mut self, labels: BTreeMap<String, String>) -> Self {
        self.labels = labels;
        self
    }

    /// Add an annotation
    pub fn with_annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.annotations.insert(key.into(), value.into());
        self
    }

    /// Replace all annotations
    pub fn with_annotations(mut self, annotations: BTreeMap<String, String>) -> Self {
        self.annotations = annotations;
        self
    }
}

// =============================================================================
// HasApiResource Trait
// =============================================================================

/// Trait for types that have a known API version and kind.
///
/// Implement this for resource types so that `apiVersion`/`kind` come from one
/// place instead of string literals scattered through constructors.
///
/// # Example
/// ```ignore
/// impl HasApiResource for Route {
///     const API_VERSION: &'static str = "route.openshift.io/v1";
///     const KIND: &'static str = "Route";
/// }
/// ```
pub trait HasApiResource {
    /// Full API version (e.g., "route.openshift.io/v1", "v1")
    const API_VERSION: &'static str;
    /// Resource kind (e.g., "Route")
    const KIND: &'static str;

    /// API group, empty for the core group
    fn api_group() -> &'static str {
        match Self::API_VERSION.rsplit_once('/') {
            Some((group, _)) => group,
            None => "",
        }
    }
}

// =============================================================================
// Name validation
// =============================================================================

/// Maximum length of a DNS-1123 label
pub const MAX_DNS_LABEL_LEN: usize = 63;

/// Validate that `name` is a DNS-1123 label: `[a-z0-9]([-a-z0-9]*[a-z0-9])?`, max 63 chars.
///
/// Every generated resource shares one name, and Service/Route names are the
/// strictest of the kinds involved, so the label rules apply to all of them.
pub fn validate_dns_label(field: &str, name: &str) -> Result<(), Error> {
    if name.is_empty() {
        return Err(Error::validation_for_field(field, "must not be empty"));
    }
    if name.len() > MAX_DNS_LABEL_LEN {
        return Err(Error::validation_for_field(
            field,
            format!(
                "'{}' is {} characters, must be at most {}",
                name,
                name.len(),
                MAX_DNS_LABEL_LEN
            ),
        ));
    }
    let valid_chars = name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if !valid_chars || name.starts_with('-') || name.ends_with('-') {
        return Err(Error::validation_for_field(
            field,
            format!(
                "'{}' must consist of lowercase alphanumerics or '-', and start and end with an alphanumeric",
                name
            ),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CoreThing;
    impl HasApiResource for CoreThing {
        const API_VERSION: &'static str = "v1";
        const KIND: &'static str = "Thing";
    }

    struct GroupedThing;
    impl HasApiResource for GroupedThing {
        const API_VERSION: &'static str = "route.openshift.io/v1";
        const KIND: &'static str = "Route";
    }

    #[test]
    fn api_group_is_empty_for_core_resources() {
        assert_eq!(CoreThing::api_group(), "");
        assert_eq!(GroupedThing::api_group(), "route.openshift.io");
    }

    #[test]
    fn builder_methods_set_labels_and_annotations() {
        let meta = ObjectMeta::new("web", "dev")
            .with_label("app", "web")
            .with_annotation("note", "x");
        assert_eq!(meta.name, "web");
        assert_eq!(meta.namespace, "dev");
        assert_eq!(meta.labels.get("app"), Some(&"web".to_string()));
        assert_eq!(meta.annotations.get("note"), Some(&"x".to_string()));
    }

    #[test]
    fn empty_maps_are_not_serialized() {
        let json = serde_json::to_value(ObjectMeta::new("web", "dev")).unwrap();
        assert!(json.get("labels").is_none());
        assert!(json.get("annotations").is_none());
    }

    #[test]
    fn accepts_valid_dns_labels() {
        for name in ["foo", "node-bulletin-board", "a1", "9lives"] {
            assert!(validate_dns_label("name", name).is_ok(), "{name}");
        }
    }

    #[test]
    fn rejects_invalid_dns_labels() {
        let too_long = "a".repeat(64);
        for name in ["", "Foo", "-foo", "foo-", "foo_bar", "foo.bar", too_long.as_str()] {
            assert!(validate_dns_label("name", name).is_err(), "{name}");
        }
    }
}
