use crate::model::VmessEndpoint;

/// Keep endpoints whose label contains at least one keyword.
///
/// Matching is a case-sensitive substring test. Order is preserved and an
/// empty keyword list returns the input untouched.
pub fn retain_matching(endpoints: Vec<VmessEndpoint>, keywords: &[String]) -> Vec<VmessEndpoint> {
    if keywords.is_empty() {
        return endpoints;
    }
    endpoints
        .into_iter()
        .filter(|v| label_matches(v.label(), keywords))
        .collect()
}

pub fn label_matches(label: &str, keywords: &[String]) -> bool {
    keywords.iter().any(|k| label.contains(k.as_str()))
}
