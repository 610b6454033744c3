//! Collection of requested claim values.

use ostiary_identity::ClaimValue;
use serde_json::Map;

/// Resolve every requested claim through `resolve(name, language_tag)`.
///
/// A name of the form `name#tag` is resolved for that tag only. An untagged
/// name is tried with each requested locale in order and then with no tag.
/// Values are keyed by the requested claim name as written; claims that do
/// not resolve are left out.
pub fn collect_claims<F>(
    claim_names: &[String],
    claim_locales: &[String],
    resolve: F,
) -> Map<String, ClaimValue>
where
    F: Fn(&str, &str) -> Option<ClaimValue>,
{
    let mut collected = Map::new();

    for requested in claim_names {
        let value = match requested.split_once('#') {
            Some((name, tag)) => resolve(name, tag),
            None => claim_locales
                .iter()
                .find_map(|locale| resolve(requested, locale))
                .or_else(|| resolve(requested, "")),
        };

        if let Some(value) = value {
            collected.insert(requested.clone(), value);
        }
    }

    collected
}
