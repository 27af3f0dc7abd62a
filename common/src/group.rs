use std::collections::HashMap;

use crate::bench::BenchmarkRow;

/// All rows sharing one `benchmark_name`, in input order
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkGroup {
    pub name: String,
    pub rows: Vec<BenchmarkRow>,
}

/// Groups are returned in order of first appearance of their name.
pub fn group_rows(rows: Vec<BenchmarkRow>) -> Vec<BenchmarkGroup> {
    let mut index = HashMap::new();
    let mut groups: Vec<BenchmarkGroup> = Vec::new();
    for row in rows {
        let idx = *index.entry(row.benchmark_name.clone()).or_insert_with(|| {
            groups.push(BenchmarkGroup {
                name: row.benchmark_name.clone(),
                rows: Vec::new(),
            });
            groups.len() - 1
        });
        groups[idx].rows.push(row);
    }
    groups
}
