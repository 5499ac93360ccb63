//! Placeholder interpolation for template bodies.
//!
//! Replaces `{{name}}` tokens with caller-supplied values. This is literal
//! substring substitution, not a templating language: values are inserted
//! as-is with no escaping, and a placeholder whose key was not supplied is
//! left untouched in the output.

use std::collections::HashMap;

/// Fill `{{key}}` placeholders in `body` with values from `variables`.
///
/// All occurrences of each supplied key are replaced. Keys are matched as
/// exact literal substrings, so characters that are special to pattern
/// languages carry no meaning here. Keys are applied in sorted order to
/// keep the output deterministic.
pub fn interpolate(body: &str, variables: &HashMap<String, String>) -> String {
    let mut keys: Vec<&String> = variables.keys().collect();
    keys.sort();

    let mut rendered = body.to_string();
    for key in keys {
        let placeholder = format!("{{{{{key}}}}}");
        if rendered.contains(placeholder.as_str()) {
            rendered = rendered.replace(placeholder.as_str(), &variables[key]);
        }
    }
    rendered
}
