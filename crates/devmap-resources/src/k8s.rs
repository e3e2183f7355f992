//! Kubernetes building blocks shared by the workload resources

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// =============================================================================
// Container
// =============================================================================

/// Container spec
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Container {
    /// Container name
    pub name: String,
    /// Image
    pub image: String,
    /// Image pull policy (Always, IfNotPresent, Never)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_pull_policy: Option<String>,
    /// Command
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<Vec<String>>,
    /// Args
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<String>>,
    /// Environment variables
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub env: Vec<EnvVar>,
    /// Ports
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<ContainerPort>,
    /// Resource requirements
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<ResourceRequirements>,
}

/// Environment variable with a literal value
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EnvVar {
    /// Variable name
    pub name: String,
    /// Literal value
    #[serde(default)]
    pub value: String,
}

impl EnvVar {
    /// Create an env var with a literal value
    pub fn literal(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Container port
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ContainerPort {
    /// Port name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Port number
    pub container_port: u16,
    /// Protocol
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
}

// =============================================================================
// Resource requirements
// =============================================================================

/// Resource requirements
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ResourceRequirements {
    /// Requests
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requests: Option<ResourceQuantity>,
    /// Limits
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limits: Option<ResourceQuantity>,
}

impl ResourceRequirements {
    /// Requirements with only a memory limit
    pub fn memory_limit(memory: impl Into<String>) -> Self {
        Self {
            requests: None,
            limits: Some(ResourceQuantity {
                cpu: None,
                memory: Some(memory.into()),
            }),
        }
    }
}

/// Resource quantity
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResourceQuantity {
    /// CPU quantity (e.g. "500m")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<String>,
    /// Memory quantity (e.g. "1Gi")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<String>,
}

/// Check that `value` is a Kubernetes resource quantity such as `512Mi`,
/// `1.5Gi`, `500m`, or `1e3`.
pub fn is_valid_quantity(value: &str) -> bool {
    const SUFFIXES: [&str; 15] = [
        "Ki", "Mi", "Gi", "Ti", "Pi", "Ei", "n", "u", "m", "k", "M", "G", "T", "P", "E",
    ];

    let unsigned = value.strip_prefix(['+', '-']).unwrap_or(value);
    let digits_end = unsigned
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(unsigned.len());
    let (number, suffix) = unsigned.split_at(digits_end);

    let valid_number = !number.is_empty()
        && number != "."
        && number.matches('.').count() <= 1;
    if !valid_number {
        return false;
    }

    if suffix.is_empty() || SUFFIXES.contains(&suffix) {
        return true;
    }

    // Decimal exponent form: 1e3, 2E-2
    match suffix.strip_prefix(['e', 'E']) {
        Some(exp) => {
            let exp = exp.strip_prefix(['+', '-']).unwrap_or(exp);
            !exp.is_empty() && exp.chars().all(|c| c.is_ascii_digit())
        }
        None => false,
    }
}

// =============================================================================
// Selectors
// =============================================================================

/// Label selector
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LabelSelector {
    /// Match labels
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub match_labels: BTreeMap<String, String>,
}

impl LabelSelector {
    /// Whether every selector entry is present, with the same value, in `labels`.
    ///
    /// An empty selector matches nothing, which for a Service or Deployment
    /// is never what the caller intended.
    pub fn selects(&self, labels: &BTreeMap<String, String>) -> bool {
        selects(&self.match_labels, labels)
    }
}

/// Whether the non-empty `selector` is a subset of `labels`.
pub fn selects(selector: &BTreeMap<String, String>, labels: &BTreeMap<String, String>) -> bool {
    !selector.is_empty()
        && selector
            .iter()
            .all(|(k, v)| labels.get(k).is_some_and(|actual| actual == v))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn selector_matches_superset() {
        let selector = LabelSelector {
            match_labels: labels(&[("app", "web")]),
        };
        assert!(selector.selects(&labels(&[("app", "web"), ("tier", "front")])));
    }

    #[test]
    fn selector_rejects_value_mismatch_and_missing_key() {
        let selector = labels(&[("app", "web")]);
        assert!(!selects(&selector, &labels(&[("app", "api")])));
        assert!(!selects(&selector, &labels(&[("tier", "front")])));
    }

    #[test]
    fn empty_selector_selects_nothing() {
        assert!(!selects(&BTreeMap::new(), &labels(&[("app", "web")])));
    }

    #[test]
    fn quantities() {
        for ok in ["1Gi", "512Mi", "500m", "1", "1.5Gi", "1e3", "2E-2", "+1k", "0.5"] {
            assert!(is_valid_quantity(ok), "{ok} should be valid");
        }
        for bad in ["", "Gi", "1GB", "one", "1..2", ".", "1e", "1Gi2"] {
            assert!(!is_valid_quantity(bad), "{bad} should be invalid");
        }
    }

    #[test]
    fn memory_limit_only_sets_limits() {
        let reqs = ResourceRequirements::memory_limit("1Gi");
        assert!(reqs.requests.is_none());
        assert_eq!(reqs.limits.unwrap().memory.as_deref(), Some("1Gi"));
    }

    #[test]
    fn container_omits_empty_fields() {
        let json = serde_json::to_value(Container {
            name: "runtime".to_string(),
            image: "node:18".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"name": "runtime", "image": "node:18"}));
    }
}
