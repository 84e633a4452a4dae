// Tests for tree construction, naming, simplification and TOML loading

use super::*;
use crate::error::ConfigError;
use std::io::Write;
use tempfile::NamedTempFile;

fn all_variants() -> Vec<TreeVariant> {
    let mut variants = Vec::new();
    for simplified in [false, true] {
        for memory in [MemoryGranularity::CacheLevel, MemoryGranularity::WithNeighbors] {
            for sync in [SyncGranularity::Detailed, SyncGranularity::Flat] {
                variants.push(TreeVariant {
                    simplified,
                    memory,
                    sync,
                });
            }
        }
    }
    variants
}

#[test]
fn test_builtin_trees_are_valid() {
    for variant in all_variants() {
        let tree = variant.build();
        assert!(
            CategoryTree::new(tree.roots().to_vec()).is_ok(),
            "{:?} builds an invalid tree",
            variant
        );
    }
}

#[test]
fn test_default_tree_top_level_order() {
    let tree = TreeVariant::default().build();
    let names: Vec<&str> = tree.roots().iter().map(|n| n.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "base",
            "dispatch_width",
            "depend",
            "issue",
            "contend",
            "serial",
            "smt",
            "branch",
            "itlb",
            "dtlb",
            "ifetch",
            "mem",
            "sync",
            "dvfs-transition",
            "imbalance",
        ]
    );
}

#[test]
fn test_memory_granularity_changes_mem_subtree() {
    let coarse = default_tree(MemoryGranularity::CacheLevel, SyncGranularity::Detailed);
    let fine = default_tree(MemoryGranularity::WithNeighbors, SyncGranularity::Detailed);

    assert!(coarse.names().contains(&"mem-remote".to_string()));
    assert!(!coarse.names().contains(&"mem-l1_neighbor".to_string()));
    assert!(fine.names().contains(&"mem-l1_neighbor".to_string()));
    assert!(fine.names().contains(&"mem-off_socket".to_string()));
}

#[test]
fn test_sync_granularity() {
    let detailed = default_tree(MemoryGranularity::CacheLevel, SyncGranularity::Detailed);
    let flat = default_tree(MemoryGranularity::CacheLevel, SyncGranularity::Flat);

    let sync = |tree: &CategoryTree| {
        tree.roots()
            .iter()
            .find(|n| n.name == "sync")
            .cloned()
            .unwrap()
    };
    match sync(&detailed).payload {
        Payload::Children(children) => assert_eq!(children.len(), 10),
        other => panic!("expected children, got {:?}", other),
    }
    match sync(&flat).payload {
        Payload::KeySet(keys) => {
            assert_eq!(keys.len(), 10);
            assert!(keys.contains(&"Recv".to_string()));
        }
        other => panic!("expected key set, got {:?}", other),
    }
}

#[test]
fn test_names_flatten_paths() {
    let tree = CategoryTree::new(vec![
        CategoryNode::leaf("base", 0.01, "Base"),
        CategoryNode::node(
            "mem",
            0.01,
            vec![
                CategoryNode::group("l1d", 0.01, &["DataCacheL1", "PathStore"]),
                CategoryNode::leaf("l2", 0.01, "DataCacheL2"),
            ],
        ),
    ])
    .unwrap();

    assert_eq!(
        tree.names(),
        vec!["base", "mem-l1d", "mem-l2", "mem-other", "other"]
    );
    let mut keys: Vec<&str> = tree.keys().into_iter().collect();
    keys.sort_unstable();
    assert_eq!(keys, vec!["Base", "DataCacheL1", "DataCacheL2", "PathStore"]);
}

#[test]
fn test_duplicate_sibling_is_config_error() {
    let err = CategoryTree::new(vec![CategoryNode::node(
        "mem",
        0.01,
        vec![
            CategoryNode::leaf("l2", 0.01, "DataCacheL2"),
            CategoryNode::leaf("l2", 0.01, "DataCacheL2_S"),
        ],
    )])
    .unwrap_err();
    assert_eq!(
        err,
        ConfigError::DuplicateName {
            parent: "mem".to_string(),
            name: "l2".to_string()
        }
    );
}

#[test]
fn test_same_name_at_different_levels_is_allowed() {
    let tree = CategoryTree::new(vec![
        CategoryNode::leaf("branch", 0.01, "BranchPredictor"),
        CategoryNode::node(
            "depend",
            0.01,
            vec![CategoryNode::leaf("branch", 0.01, "PathBranch")],
        ),
    ]);
    assert!(tree.is_ok());
}

#[test]
fn test_flattened_name_clash_is_config_error() {
    let err = CategoryTree::new(vec![
        CategoryNode::leaf("mem-l1d", 0.01, "DataCacheL1_S"),
        CategoryNode::node(
            "mem",
            0.01,
            vec![CategoryNode::leaf("l1d", 0.01, "DataCacheL1")],
        ),
    ])
    .unwrap_err();
    assert_eq!(
        err,
        ConfigError::DuplicateName {
            parent: "<root>".to_string(),
            name: "mem-l1d".to_string()
        }
    );
}

#[test]
fn test_leaf_clashing_with_remainder_is_config_error() {
    let err = CategoryTree::new(vec![
        CategoryNode::node(
            "sync",
            0.01,
            vec![CategoryNode::leaf("futex", 0.01, "SyncFutex")],
        ),
        CategoryNode::leaf("sync-other", 0.01, "SyncSleep"),
    ])
    .unwrap_err();
    assert!(matches!(
        err,
        ConfigError::DuplicateName { ref name, .. } if name == "sync-other"
    ));
}

#[test]
fn test_other_is_reserved() {
    let err = CategoryTree::new(vec![CategoryNode::leaf("other", 0.0, "Base")]).unwrap_err();
    assert!(matches!(err, ConfigError::ReservedName { .. }));
}

#[test]
fn test_threshold_out_of_range() {
    let err = CategoryTree::new(vec![CategoryNode::leaf("base", 1.5, "Base")]).unwrap_err();
    assert_eq!(
        err,
        ConfigError::ThresholdOutOfRange {
            name: "base".to_string(),
            threshold: 1.5
        }
    );
}

#[test]
fn test_simplify_produces_three_groups() {
    let detailed = TreeVariant::default().build();
    let simple = detailed.simplify(&CategoryGroups::default());

    let names: Vec<&str> = simple.roots().iter().map(|n| n.name.as_str()).collect();
    assert_eq!(names, vec!["compute", "communicate", "synchronize"]);
    for root in simple.roots() {
        assert_eq!(root.threshold, 0.0);
        assert!(matches!(root.payload, Payload::KeySet(_)));
    }

    // no key lost
    assert_eq!(simple.keys(), detailed.keys());
    // the receiver is untouched
    assert_eq!(detailed, TreeVariant::default().build());
}

#[test]
fn test_simplify_is_idempotent() {
    let groups = CategoryGroups::default();
    for variant in all_variants() {
        let once = variant.build().simplify(&groups);
        let twice = once.simplify(&groups);
        assert_eq!(once, twice, "{:?}", variant);
    }
}

#[test]
fn test_simplify_keeps_unclaimed_entries() {
    let tree = CategoryTree::new(vec![
        CategoryNode::leaf("base", 0.01, "Base"),
        CategoryNode::leaf("gpu", 0.05, "GpuWait"),
    ])
    .unwrap();
    let simple = tree.simplify(&CategoryGroups::default());

    let names: Vec<&str> = simple.roots().iter().map(|n| n.name.as_str()).collect();
    assert_eq!(names, vec!["compute", "communicate", "synchronize", "gpu"]);
    assert_eq!(simple.roots()[3], CategoryNode::leaf("gpu", 0.05, "GpuWait"));
}

#[test]
fn test_groups_reject_duplicates() {
    let err = CategoryGroups::new(vec![
        CategoryGroup::new("compute", &["base"]),
        CategoryGroup::new("compute", &["issue"]),
    ])
    .unwrap_err();
    assert!(matches!(err, ConfigError::DuplicateName { .. }));
    assert_eq!(CategoryGroups::default().group_of("mem"), Some("communicate"));
    assert_eq!(CategoryGroups::default().group_of("compute"), Some("compute"));
    assert_eq!(CategoryGroups::default().group_of("gpu"), None);
}

#[test]
fn test_tree_from_toml_str() {
    let tree = CategoryTree::from_toml_str(
        r#"
[[category]]
name = "compute"
threshold = 0.0

  [[category.children]]
  name = "base"
  threshold = 0.0
  key = "Base"

  [[category.children]]
  name = "issue"
  key = "Issue"

[[category]]
name = "serial"
keys = ["Serialization", "LongLatency"]
"#,
    )
    .unwrap();

    assert_eq!(
        tree.roots()[0],
        CategoryNode::node(
            "compute",
            0.0,
            vec![
                CategoryNode::leaf("base", 0.0, "Base"),
                CategoryNode::leaf("issue", 0.01, "Issue"),
            ]
        )
    );
    assert_eq!(
        tree.roots()[1],
        CategoryNode::group("serial", 0.01, &["Serialization", "LongLatency"])
    );
}

#[test]
fn test_tree_from_toml_rejects_ambiguous_payload() {
    let err = CategoryTree::from_toml_str(
        r#"
[[category]]
name = "base"
key = "Base"
keys = ["Issue"]
"#,
    )
    .unwrap_err();
    assert!(format!("{:#}", err).contains("exactly one of"));
}

#[test]
fn test_tree_from_toml_rejects_duplicates() {
    let err = CategoryTree::from_toml_str(
        r#"
[[category]]
name = "base"
key = "Base"

[[category]]
name = "base"
key = "Issue"
"#,
    )
    .unwrap_err();
    assert!(format!("{:#}", err).contains("duplicate category name 'base'"));
}

#[test]
fn test_tree_from_toml_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "[[category]]\nname = \"base\"\nkey = \"Base\"").unwrap();

    let tree = CategoryTree::from_toml(file.path()).unwrap();
    assert_eq!(tree.names(), vec!["base", "other"]);
    assert!(CategoryTree::from_toml("/nonexistent/tree.toml").is_err());
}
