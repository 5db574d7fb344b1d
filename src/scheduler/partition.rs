use crate::error::{Result, SplitterError};
use crate::scheduler::timing::FileTiming;

/// Order in which files are fed to the greedy assignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PartitionOrder {
    /// Ascending file identifier. Reproducible across runs with equal input.
    #[default]
    ByName,
    /// Descending duration, ties by ascending file identifier (LPT).
    LongestFirst,
}

impl std::fmt::Display for PartitionOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PartitionOrder::ByName => write!(f, "by-name"),
            PartitionOrder::LongestFirst => write!(f, "longest-first"),
        }
    }
}

/// Files assigned to one CI node
#[derive(Debug, Clone, PartialEq)]
pub struct Bucket {
    pub index: usize,
    pub files: Vec<String>,
    /// Expected duration in seconds
    pub total_time: f64,
}

impl Bucket {
    fn new(index: usize) -> Self {
        Self {
            index,
            files: Vec::new(),
            total_time: 0.0,
        }
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Result of splitting files over a fixed number of nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct Partition {
    buckets: Vec<Bucket>,
}

impl Partition {
    pub fn buckets(&self) -> &[Bucket] {
        &self.buckets
    }

    pub fn node_count(&self) -> usize {
        self.buckets.len()
    }

    /// Total expected duration of every bucket, by node index
    pub fn totals(&self) -> Vec<f64> {
        self.buckets.iter().map(|b| b.total_time).collect()
    }

    /// Largest bucket total, i.e. the expected wall time of the whole run
    pub fn max_total(&self) -> f64 {
        self.buckets
            .iter()
            .map(|b| b.total_time)
            .fold(0.0, f64::max)
    }

    /// Bucket for the given node. Fails if the index is not in `[0, node_count)`.
    pub fn bucket(&self, node_index: usize) -> Result<&Bucket> {
        self.buckets
            .get(node_index)
            .ok_or_else(|| SplitterError::NodeIndexOutOfRange {
                index: i64::try_from(node_index).unwrap_or(i64::MAX),
                node_count: self.buckets.len(),
            })
    }
}

/// Greedily assign every file to the least loaded of `node_count` buckets.
///
/// Each file goes to the bucket with the strictly smallest running total.
/// Buckets with equal totals are told apart by file count (fewer wins), then
/// by lowest index, so zero-duration files are spread round-robin. Files are
/// visited in the order given by `order`, so the same input always yields the
/// same assignment.
pub fn partition(
    timing: &FileTiming,
    node_count: usize,
    order: PartitionOrder,
) -> Result<Partition> {
    if node_count == 0 {
        return Err(SplitterError::InvalidNodeCount(0));
    }

    let mut items: Vec<(&str, f64)> = timing.iter().collect();
    if order == PartitionOrder::LongestFirst {
        items.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    }

    let mut buckets: Vec<Bucket> = (0..node_count).map(Bucket::new).collect();
    for (filename, duration) in items {
        let target = least_loaded(&buckets);
        let bucket = &mut buckets[target];
        bucket.files.push(filename.to_string());
        bucket.total_time += duration;
    }

    for bucket in &buckets {
        tracing::debug!(
            index = bucket.index,
            count = bucket.files.len(),
            time = bucket.total_time,
            "Chunk"
        );
    }

    Ok(Partition { buckets })
}

fn least_loaded(buckets: &[Bucket]) -> usize {
    let mut best = 0;
    for (index, bucket) in buckets.iter().enumerate().skip(1) {
        let current = &buckets[best];
        if bucket.total_time < current.total_time
            || (bucket.total_time == current.total_time && bucket.len() < current.len())
        {
            best = index;
        }
    }
    best
}
