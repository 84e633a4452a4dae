// Built-in category trees for the interval core model
//
// One factory per subtree; `TreeVariant::build` composes them according to
// the caller's granularity flags.

use crate::tree::groups::CategoryGroups;
use crate::tree::node::{CategoryNode, CategoryTree};
use serde::{Deserialize, Serialize};

const THRESHOLD: f64 = 0.01;

/// Resolution of the "mem" subtree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MemoryGranularity {
    /// One entry per cache level, neighbor traffic folded in
    #[default]
    CacheLevel,
    /// Separate entries for traffic served by a neighboring cache
    WithNeighbors,
}

/// Resolution of the "sync" category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncGranularity {
    /// One entry per synchronization primitive
    #[default]
    Detailed,
    /// All synchronization in a single entry
    Flat,
}

/// Caller-selected shape of the built-in tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TreeVariant {
    pub simplified: bool,
    pub memory: MemoryGranularity,
    pub sync: SyncGranularity,
}

impl TreeVariant {
    pub fn build(&self) -> CategoryTree {
        let tree = default_tree(self.memory, self.sync);
        if self.simplified {
            tree.simplify(&CategoryGroups::default())
        } else {
            tree
        }
    }
}

/// The full interval-model tree at the given granularity
pub fn default_tree(memory: MemoryGranularity, sync: SyncGranularity) -> CategoryTree {
    let mut roots = compute_items();
    roots.push(memory_item(memory));
    roots.push(sync_item(sync));
    roots.extend(tail_items());
    CategoryTree::from_validated(roots)
}

fn compute_items() -> Vec<CategoryNode> {
    vec![
        CategoryNode::leaf("base", THRESHOLD, "Base"),
        CategoryNode::leaf("dispatch_width", THRESHOLD, "Issue"),
        CategoryNode::node(
            "depend",
            THRESHOLD,
            vec![
                CategoryNode::leaf("int", THRESHOLD, "PathInt"),
                CategoryNode::leaf("fp", THRESHOLD, "PathFP"),
                CategoryNode::leaf("branch", THRESHOLD, "PathBranch"),
            ],
        ),
        CategoryNode::node(
            "issue",
            THRESHOLD,
            vec![
                CategoryNode::leaf("port0", THRESHOLD, "PathP0"),
                CategoryNode::leaf("port1", THRESHOLD, "PathP1"),
                CategoryNode::leaf("port2", THRESHOLD, "PathP2"),
                CategoryNode::leaf("port34", THRESHOLD, "PathP34"),
                CategoryNode::leaf("port5", THRESHOLD, "PathP5"),
                CategoryNode::leaf("port05", THRESHOLD, "PathP05"),
                CategoryNode::leaf("port015", THRESHOLD, "PathP015"),
            ],
        ),
        CategoryNode::node(
            "contend",
            THRESHOLD,
            vec![
                CategoryNode::leaf("fp_addsub", THRESHOLD, "FU_FpAddSub"),
                CategoryNode::leaf("fp_muldiv", THRESHOLD, "FU_FpMulDiv"),
                CategoryNode::leaf("load", THRESHOLD, "FU_Load"),
                CategoryNode::leaf("store", THRESHOLD, "FU_Store"),
                CategoryNode::leaf("branch", THRESHOLD, "FU_Branch"),
                CategoryNode::leaf("generic", THRESHOLD, "FU_Generic"),
            ],
        ),
        // LongLatency is in practice only MFENCE
        CategoryNode::group("serial", THRESHOLD, &["Serialization", "LongLatency"]),
        CategoryNode::leaf("smt", THRESHOLD, "SMT"),
        CategoryNode::leaf("branch", THRESHOLD, "BranchPredictor"),
        CategoryNode::leaf("itlb", THRESHOLD, "ITLBMiss"),
        CategoryNode::leaf("dtlb", THRESHOLD, "DTLBMiss"),
        CategoryNode::group(
            "ifetch",
            THRESHOLD,
            &[
                "DataCacheL1I",
                "InstructionCacheL1I",
                "InstructionCacheL1",
                "InstructionCacheL1_S",
                "InstructionCacheL2",
                "InstructionCacheL2_S",
                "InstructionCacheL3",
                "InstructionCacheL3_S",
                "InstructionCacheL4",
                "InstructionCacheL4_S",
                "InstructionCachemiss",
                "InstructionCache????",
                "InstructionCachedram-cache",
                "InstructionCachedram",
                "InstructionCachedram-remote",
                "InstructionCachecache-remote",
                "InstructionCachedram-local",
                "InstructionCachepredicate-false",
                "InstructionCacheunknown",
            ],
        ),
    ]
}

fn memory_item(granularity: MemoryGranularity) -> CategoryNode {
    let children = match granularity {
        MemoryGranularity::CacheLevel => vec![
            CategoryNode::group(
                "l1d",
                THRESHOLD,
                &["DataCacheL1", "DataCacheL1_S", "PathLoadX", "PathStore"],
            ),
            CategoryNode::group("l2", THRESHOLD, &["DataCacheL2", "DataCacheL2_S"]),
            CategoryNode::group("l3", THRESHOLD, &["DataCacheL3", "DataCacheL3_S"]),
            CategoryNode::group("l4", THRESHOLD, &["DataCacheL4", "DataCacheL4_S"]),
            CategoryNode::leaf("remote", THRESHOLD, "DataCachecache-remote"),
            CategoryNode::leaf("dram-cache", THRESHOLD, "DataCachedram-cache"),
            CategoryNode::group(
                "dram",
                THRESHOLD,
                &[
                    "DataCachedram",
                    "DataCachedram-local",
                    "DataCachedram-remote",
                    "DataCachemiss",
                    "DataCache????",
                    "DataCachepredicate-false",
                    "DataCacheunknown",
                ],
            ),
        ],
        MemoryGranularity::WithNeighbors => vec![
            CategoryNode::leaf("l0d_neighbor", THRESHOLD, "DataCacheL1_S"),
            CategoryNode::group("l1d", THRESHOLD, &["DataCacheL1", "PathLoadX", "PathStore"]),
            CategoryNode::leaf("l1_neighbor", THRESHOLD, "DataCacheL2_S"),
            CategoryNode::leaf("l2", THRESHOLD, "DataCacheL2"),
            CategoryNode::leaf("l2_neighbor", THRESHOLD, "DataCacheL3_S"),
            CategoryNode::leaf("l3", THRESHOLD, "DataCacheL3"),
            CategoryNode::leaf("l3_neighbor", THRESHOLD, "DataCacheL4_S"),
            CategoryNode::leaf("l4", THRESHOLD, "DataCacheL4"),
            CategoryNode::leaf("off_socket", THRESHOLD, "DataCachecache-remote"),
            CategoryNode::group(
                "dram",
                THRESHOLD,
                &[
                    "DataCachedram-cache",
                    "DataCachedram",
                    "DataCachedram-local",
                    "DataCachedram-remote",
                    "DataCachemiss",
                    "DataCache????",
                    "DataCachepredicate-false",
                    "DataCacheunknown",
                ],
            ),
        ],
    };
    CategoryNode::node("mem", THRESHOLD, children)
}

const SYNC_KEYS: [(&str, &str); 10] = [
    ("futex", "SyncFutex"),
    ("mutex", "SyncPthreadMutex"),
    ("cond", "SyncPthreadCond"),
    ("barrier", "SyncPthreadBarrier"),
    ("join", "SyncJoin"),
    ("pause", "SyncPause"),
    ("sleep", "SyncSleep"),
    ("unscheduled", "SyncUnscheduled"),
    ("memaccess", "SyncMemAccess"),
    ("recv", "Recv"),
];

fn sync_item(granularity: SyncGranularity) -> CategoryNode {
    match granularity {
        SyncGranularity::Detailed => CategoryNode::node(
            "sync",
            THRESHOLD,
            SYNC_KEYS
                .iter()
                .map(|(name, key)| CategoryNode::leaf(name, THRESHOLD, key))
                .collect(),
        ),
        SyncGranularity::Flat => {
            let keys: Vec<&str> = SYNC_KEYS.iter().map(|(_, key)| *key).collect();
            CategoryNode::group("sync", THRESHOLD, &keys)
        }
    }
}

fn tail_items() -> Vec<CategoryNode> {
    vec![
        CategoryNode::leaf("dvfs-transition", THRESHOLD, "SyncDvfsTransition"),
        CategoryNode::node(
            "imbalance",
            THRESHOLD,
            vec![
                CategoryNode::leaf("start", THRESHOLD, "StartTime"),
                CategoryNode::leaf("end", THRESHOLD, "Imbalance"),
            ],
        ),
    ]
}
