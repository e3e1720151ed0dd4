//! Property-based tests for the artifact locator.
//!
//! These tests use proptest to generate artifact keys and verify that the
//! locator's invariants hold for all of them.

#[cfg(test)]
mod proptest_tests {
    use crate::artifact::{candidate_paths, locate, parse_templates, ArtifactKey, Located};
    use crate::defaults::DEFAULT_TEMPLATES;
    use proptest::prelude::*;
    use std::fs;
    use tempfile::TempDir;

    fn arb_key() -> impl Strategy<Value = ArtifactKey> {
        (
            "[a-z]{1,6}(\\.[a-z]{1,6}){0,2}",
            "[a-z][a-z0-9-]{0,12}",
            "[0-9]{1,2}\\.[0-9]{1,2}\\.[0-9]{1,2}(-SNAPSHOT)?",
            "cuda[0-9]{2}",
            proptest::option::of("[a-z0-9_-]{1,10}"),
        )
            .prop_map(|(group, name, version, variant, classifier)| {
                ArtifactKey::new(group, name, version, variant, classifier)
            })
    }

    proptest! {
        /// Property: with an empty repository, every applicable candidate is
        /// reported as tried, in template order, and nothing is found.
        #[test]
        fn not_found_lists_every_candidate(key in arb_key()) {
            let temp = TempDir::new().unwrap();
            let templates = parse_templates(DEFAULT_TEMPLATES).unwrap();

            let expected = candidate_paths(temp.path(), &key, &templates);
            match locate(temp.path(), &key, &templates) {
                Located::NotFound(tried) => {
                    prop_assert!(!tried.is_empty());
                    prop_assert_eq!(tried, expected);
                }
                Located::Found(path) => prop_assert!(false, "unexpected hit: {}", path.display()),
            }
        }

        /// Property: candidates never contain an unrendered placeholder.
        #[test]
        fn candidates_are_fully_rendered(key in arb_key()) {
            let templates = parse_templates(DEFAULT_TEMPLATES).unwrap();
            for path in candidate_paths(std::path::Path::new("/repo"), &key, &templates) {
                let s = path.to_string_lossy();
                prop_assert!(!s.contains('{') && !s.contains('}'), "unrendered: {}", s);
            }
        }

        /// Property: a key with a classifier yields one more candidate than
        /// the same key without one.
        #[test]
        fn classifier_adds_exactly_one_candidate(key in arb_key()) {
            let templates = parse_templates(DEFAULT_TEMPLATES).unwrap();
            let root = std::path::Path::new("/repo");
            let without = ArtifactKey::new(key.group(), key.name(), key.version(), key.variant(), None);
            let with = ArtifactKey::new(
                key.group(),
                key.name(),
                key.version(),
                key.variant(),
                Some("x86_64".to_string()),
            );
            prop_assert_eq!(
                candidate_paths(root, &with, &templates).len(),
                candidate_paths(root, &without, &templates).len() + 1
            );
        }

        /// Property: whichever single candidate exists is the one found.
        #[test]
        fn single_existing_candidate_is_found(key in arb_key(), pick in 0usize..3) {
            let temp = TempDir::new().unwrap();
            let templates = parse_templates(DEFAULT_TEMPLATES).unwrap();
            let candidates = candidate_paths(temp.path(), &key, &templates);
            let chosen = &candidates[pick % candidates.len()];
            fs::create_dir_all(chosen.parent().unwrap()).unwrap();
            fs::write(chosen, b"jar").unwrap();

            prop_assert_eq!(locate(temp.path(), &key, &templates), Located::Found(chosen.clone()));
        }
    }
}
