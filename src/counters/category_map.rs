use std::collections::{BTreeMap, BTreeSet};

/// Disjoint per-core map of reconciled category → cycles
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryMap {
    cores: Vec<BTreeMap<String, f64>>,
}

impl CategoryMap {
    pub fn from_cores(cores: Vec<BTreeMap<String, f64>>) -> Self {
        Self { cores }
    }

    pub fn ncores(&self) -> usize {
        self.cores.len()
    }

    pub fn core(&self, core: usize) -> Option<&BTreeMap<String, f64>> {
        self.cores.get(core)
    }

    /// Cycles of one category; absent categories read as 0
    pub fn get(&self, core: usize, category: &str) -> f64 {
        self.cores
            .get(core)
            .and_then(|data| data.get(category))
            .copied()
            .unwrap_or(0.0)
    }

    /// Sum over all categories of one core
    pub fn total(&self, core: usize) -> f64 {
        self.cores
            .get(core)
            .map(|data| data.values().sum())
            .unwrap_or(0.0)
    }

    /// Union of category names over all cores
    pub fn keys(&self) -> BTreeSet<&str> {
        self.cores
            .iter()
            .flat_map(|data| data.keys().map(String::as_str))
            .collect()
    }

    /// One synthetic core holding the per-category mean over `cores`
    ///
    /// An empty subset yields a single core with no categories.
    pub fn mean_over(&self, cores: &[usize]) -> CategoryMap {
        let mut sums: BTreeMap<String, f64> = BTreeMap::new();
        for &core in cores {
            if let Some(data) = self.cores.get(core) {
                for (category, value) in data {
                    *sums.entry(category.clone()).or_default() += value;
                }
            }
        }

        if !cores.is_empty() {
            let n = cores.len() as f64;
            for value in sums.values_mut() {
                *value /= n;
            }
        }

        CategoryMap { cores: vec![sums] }
    }
}
