//! Query parameter transformation and destination URL assembly.
//!
//! Three passes, in order: rename keys named by the target's
//! `param_mapping` (the old key is dropped when renamed), pass every
//! unmapped incoming key through unchanged, then apply `static_params`,
//! which win any collision. The result is merged over the query string
//! already present on the target URL, transformed values winning there too.

use std::collections::{BTreeMap, HashMap};
use tracing::warn;
use url::Url;

/// Applies mapping and static parameters to the incoming query.
///
/// Duplicate incoming keys collapse to the last value, matching what a
/// single-valued downstream query expects. The result is ordered for
/// deterministic serialization.
pub fn transform(
    incoming: &[(String, String)],
    mapping: &HashMap<String, String>,
    statics: &HashMap<String, String>,
) -> BTreeMap<String, String> {
    let mut result: BTreeMap<String, String> = incoming
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    for (old_key, new_key) in mapping {
        if let Some(value) = result.get(old_key).cloned() {
            result.insert(new_key.clone(), value);
            if old_key != new_key {
                result.remove(old_key);
            }
        }
    }

    for (key, value) in statics {
        result.insert(key.clone(), value.clone());
    }

    result
}

/// Converts the incoming query into the ordered form without transformation.
///
/// Used for the backup fallback, which passes parameters through untouched.
pub fn passthrough(incoming: &[(String, String)]) -> BTreeMap<String, String> {
    incoming
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// Builds the final destination URL from a base URL and the transformed
/// parameters, merging with any query string already present on the base.
///
/// An unparseable base URL degrades to a naive encoded append so the
/// redirect still goes out; the condition is logged as a configuration
/// problem.
pub fn build_destination_url(base: &str, params: &BTreeMap<String, String>) -> String {
    match Url::parse(base) {
        Ok(mut url) => {
            let mut merged: BTreeMap<String, String> = url
                .query_pairs()
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect();

            for (key, value) in params {
                merged.insert(key.clone(), value.clone());
            }

            if merged.is_empty() {
                url.set_query(None);
            } else {
                let mut serializer = url.query_pairs_mut();
                serializer.clear();
                serializer.extend_pairs(merged.iter());
            }

            url.to_string()
        }
        Err(e) => {
            warn!("Destination URL '{}' does not parse ({}), appending query as-is", base, e);

            let encoded = url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(params.iter())
                .finish();

            if encoded.is_empty() {
                base.to_string()
            } else if base.contains('?') {
                format!("{}&{}", base, encoded)
            } else {
                format!("{}?{}", base, encoded)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn map(items: &[(&str, &str)]) -> HashMap<String, String> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_mapping_renames_and_static_overrides() {
        let incoming = pairs(&[("src", "google"), ("campaign", "ignored")]);
        let mapping = map(&[("src", "referrer")]);
        let statics = map(&[("campaign", "summer")]);

        let result = transform(&incoming, &mapping, &statics);

        assert_eq!(result.get("referrer").map(String::as_str), Some("google"));
        assert_eq!(result.get("campaign").map(String::as_str), Some("summer"));
        assert!(!result.contains_key("src"));
    }

    #[test]
    fn test_unmapped_keys_pass_through() {
        let incoming = pairs(&[("utm_source", "mail"), ("page", "2")]);

        let result = transform(&incoming, &HashMap::new(), &HashMap::new());

        assert_eq!(result.get("utm_source").map(String::as_str), Some("mail"));
        assert_eq!(result.get("page").map(String::as_str), Some("2"));
    }

    #[test]
    fn test_identity_mapping_keeps_key() {
        let incoming = pairs(&[("src", "google")]);
        let mapping = map(&[("src", "src")]);

        let result = transform(&incoming, &mapping, &HashMap::new());

        assert_eq!(result.get("src").map(String::as_str), Some("google"));
    }

    #[test]
    fn test_mapping_without_incoming_value_is_inert() {
        let incoming = pairs(&[("page", "2")]);
        let mapping = map(&[("src", "referrer")]);

        let result = transform(&incoming, &mapping, &HashMap::new());

        assert!(!result.contains_key("referrer"));
        assert_eq!(result.get("page").map(String::as_str), Some("2"));
    }

    #[test]
    fn test_static_params_apply_without_incoming() {
        let statics = map(&[("campaign", "summer")]);

        let result = transform(&[], &HashMap::new(), &statics);

        assert_eq!(result.get("campaign").map(String::as_str), Some("summer"));
    }

    #[test]
    fn test_build_url_merges_existing_query() {
        let params = transform(
            &pairs(&[("page", "2")]),
            &HashMap::new(),
            &HashMap::new(),
        );

        let built = build_destination_url("https://example.com/landing?kept=1&page=old", &params);
        let url = Url::parse(&built).unwrap();
        let query: BTreeMap<String, String> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        assert_eq!(query.get("kept").map(String::as_str), Some("1"));
        // Transformed values win over the URL's own query
        assert_eq!(query.get("page").map(String::as_str), Some("2"));
    }

    #[test]
    fn test_build_url_without_params() {
        let built = build_destination_url("https://example.com/landing", &BTreeMap::new());
        assert_eq!(built, "https://example.com/landing");
    }

    #[test]
    fn test_build_url_encodes_values() {
        let params = passthrough(&pairs(&[("q", "a b&c")]));

        let built = build_destination_url("https://example.com/", &params);

        assert!(built.contains("q=a+b%26c") || built.contains("q=a%20b%26c"));
    }

    #[test]
    fn test_unparseable_base_degrades_to_append() {
        let params = passthrough(&pairs(&[("src", "google")]));

        let built = build_destination_url("not a url", &params);

        assert_eq!(built, "not a url?src=google");
    }
}
