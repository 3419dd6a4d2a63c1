// PromQL / LogQL query templating

use std::collections::BTreeMap;

pub const LABELS_PLACEHOLDER: &str = "{{labels}}";
pub const INTERVAL_PLACEHOLDER: &str = "{{interval}}";

/// Render a label matcher set, e.g. `{cluster="tj",instance="10.0.0.1:9104"}`.
/// An empty map renders as an empty string so `metric{{labels}}` stays valid.
pub fn render_labels(labels: &BTreeMap<String, String>) -> String {
    if labels.is_empty() {
        return String::new();
    }

    let parts: Vec<String> = labels
        .iter()
        .map(|(k, v)| format!("{}=\"{}\"", k, escape_label_value(v)))
        .collect();
    format!("{{{}}}", parts.join(","))
}

/// Substitute `{{labels}}` and `{{interval}}` in a query template.
pub fn render_query(template: &str, labels: &BTreeMap<String, String>, interval: &str) -> String {
    template
        .replace(LABELS_PLACEHOLDER, &render_labels(labels))
        .replace(INTERVAL_PLACEHOLDER, interval)
}

fn escape_label_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
