//! Duplicate-key detection and single-directory merging.

use serde_json::{Map, Value};

use crate::engine::MergeEngine;
use crate::error::StrataError;
use crate::fragment::Fragment;

/// Overlapping key lists longer than this are truncated in diagnostics.
const KEY_DISPLAY_LIMIT: usize = 100;

/// Fails when any two fragments define the same top-level key.
///
/// Every offending pair is reported, naming both file paths and the sorted
/// overlapping keys. This runs before any merge so no file's data is silently
/// dropped.
pub(crate) fn check_duplicate_keys(fragments: &[Fragment]) -> Result<(), StrataError> {
    if fragments.len() < 2 {
        return Ok(());
    }
    let mut duplicates = Vec::new();
    for (index, first) in fragments.iter().enumerate() {
        let first_keys = first.top_level_keys();
        for second in fragments.iter().skip(index + 1) {
            let second_keys = second.top_level_keys();
            let overlap: Vec<&str> = first_keys.intersection(&second_keys).copied().collect();
            if overlap.is_empty() {
                continue;
            }
            duplicates.push(format!(
                "Duplicate keys found in {} and {}: {}",
                first.path,
                second.path,
                truncate_keys(&overlap.join(", ")),
            ));
        }
    }
    if duplicates.is_empty() {
        Ok(())
    } else {
        Err(StrataError::DuplicateKeys {
            details: duplicates.join("\n"),
        })
    }
}

fn truncate_keys(joined: &str) -> String {
    if joined.chars().count() > KEY_DISPLAY_LIMIT {
        let mut truncated: String = joined.chars().take(KEY_DISPLAY_LIMIT).collect();
        truncated.push_str("...");
        truncated
    } else {
        joined.to_owned()
    }
}

/// Merges all fragments of one directory into a single tree.
///
/// Zero fragments produce an empty tree, a single fragment is taken verbatim,
/// and two or more are deep-merged through the engine in the (sorted)
/// discovery order. Duplicate detection must have cleared beforehand; nested
/// key collisions are allowed and resolve rightmost-wins.
pub(crate) fn merge_directory(
    engine: &MergeEngine,
    fragments: Vec<Fragment>,
) -> Result<Map<String, Value>, StrataError> {
    check_duplicate_keys(&fragments)?;
    let mut trees: Vec<Map<String, Value>> =
        fragments.into_iter().map(|fragment| fragment.tree).collect();
    match trees.len() {
        0 => Ok(Map::new()),
        1 => Ok(trees.remove(0)),
        _ => engine.merge(trees),
    }
}

#[cfg(test)]
mod tests {
    use camino::Utf8PathBuf;
    use serde_json::{Value, json};

    use super::{check_duplicate_keys, merge_directory};
    use crate::engine::MergeEngine;
    use crate::error::StrataError;
    use crate::fragment::Fragment;

    fn fragment(path: &str, document: Value) -> Fragment {
        let Value::Object(tree) = document else {
            panic!("test fragments must be mappings");
        };
        Fragment {
            path: Utf8PathBuf::from(path),
            tree,
        }
    }

    #[test]
    fn disjoint_fragments_pass_duplicate_detection() {
        let fragments = vec![
            fragment("a.yml", json!({"cars": 1})),
            fragment("b.yml", json!({"boats": 2})),
        ];
        check_duplicate_keys(&fragments).expect("disjoint fragments must pass");
    }

    #[test]
    fn overlapping_fragments_name_both_files_and_sorted_keys() {
        let fragments = vec![
            fragment("a.yml", json!({"cars": 1, "boats": 2})),
            fragment("b.yml", json!({"boats": 3, "cars": 4})),
        ];
        let err = check_duplicate_keys(&fragments).expect_err("expected duplicates");
        let text = err.to_string();
        assert!(text.contains("Duplicate keys found in a.yml and b.yml"));
        assert!(text.contains("boats, cars"));
    }

    #[test]
    fn every_offending_pair_is_reported() {
        let fragments = vec![
            fragment("a.yml", json!({"cars": 1})),
            fragment("b.yml", json!({"cars": 2})),
            fragment("c.yml", json!({"cars": 3})),
        ];
        let err = check_duplicate_keys(&fragments).expect_err("expected duplicates");
        let text = err.to_string();
        assert_eq!(text.lines().count(), 3);
        assert!(text.contains("a.yml and b.yml"));
        assert!(text.contains("a.yml and c.yml"));
        assert!(text.contains("b.yml and c.yml"));
    }

    #[test]
    fn long_key_lists_are_truncated_with_an_ellipsis() {
        let keys: Vec<String> = (0..30).map(|i| format!("duplicate_key_{i:02}")).collect();
        let doc: Value = Value::Object(
            keys.iter().map(|k| (k.clone(), json!(1))).collect(),
        );
        let fragments = vec![fragment("a.yml", doc.clone()), fragment("b.yml", doc)];
        let err = check_duplicate_keys(&fragments).expect_err("expected duplicates");
        let text = err.to_string();
        assert!(text.ends_with("..."));
    }

    #[test]
    fn zero_fragments_merge_to_an_empty_tree() {
        let engine = MergeEngine::new();
        let merged = merge_directory(&engine, Vec::new()).expect("merge nothing");
        assert!(merged.is_empty());
    }

    #[test]
    fn a_single_fragment_is_taken_verbatim() {
        let engine = MergeEngine::new();
        let merged = merge_directory(
            &engine,
            vec![fragment("a.yml", json!({"cars": {"type": "csv"}}))],
        )
        .expect("merge one fragment");
        assert_eq!(Value::Object(merged), json!({"cars": {"type": "csv"}}));
    }

    #[test]
    fn merged_key_set_is_the_union_of_disjoint_fragments() {
        let engine = MergeEngine::new();
        let merged = merge_directory(
            &engine,
            vec![
                fragment("a.yml", json!({"cars": 1})),
                fragment("b.yml", json!({"boats": 2})),
                fragment("c.yml", json!({"planes": 3})),
            ],
        )
        .expect("merge disjoint fragments");
        assert_eq!(
            Value::Object(merged),
            json!({"cars": 1, "boats": 2, "planes": 3}),
        );
    }

    #[test]
    fn duplicate_detection_precedes_merging() {
        let engine = MergeEngine::new();
        let err = merge_directory(
            &engine,
            vec![
                fragment("a.yml", json!({"cars": 1})),
                fragment("b.yml", json!({"cars": 2})),
            ],
        )
        .expect_err("expected duplicates to block the merge");
        assert!(matches!(err, StrataError::DuplicateKeys { .. }));
    }
}
