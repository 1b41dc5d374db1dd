use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;

use serde::{Serialize, Serializer};

use crate::config::Config;
use crate::download::DownloadConfig;
use crate::metadata::{split_paths, SplitConfig};
use crate::pairs::pair_paths;

use super::PipelineError;

/// Partition of the metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Split {
    /// Training partition
    Train,
    /// Validation partition
    Val,
    /// Test partition
    Test,
}

impl Split {
    /// All partitions, in file order.
    pub const ALL: [Split; 3] = [Split::Train, Split::Val, Split::Test];

    /// Suffix used in file and task names.
    pub fn as_str(self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Val => "val",
            Split::Test => "test",
        }
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier of a pipeline task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TaskId {
    /// Raw library TSV to metadata CSV
    ConvertMetadata,
    /// Metadata CSV to train/val/test partitions
    SplitMetadata,
    /// Fetch the peak files
    DownloadPeaks,
    /// Peak files to feature tables (external)
    EncodeFeatures,
    /// Positive pairs of one partition
    PairsPositive(Split),
    /// Negative pairs of one partition
    PairsNegative(Split),
    /// Train the embedding model (external)
    TrainModel,
}

impl TaskId {
    /// Every task, in declaration order.
    pub fn all() -> Vec<TaskId> {
        let mut tasks = vec![
            TaskId::ConvertMetadata,
            TaskId::SplitMetadata,
            TaskId::DownloadPeaks,
            TaskId::EncodeFeatures,
        ];
        for split in Split::ALL {
            tasks.push(TaskId::PairsPositive(split));
            tasks.push(TaskId::PairsNegative(split));
        }
        tasks.push(TaskId::TrainModel);
        tasks
    }

    /// Tasks that must finish before this one starts.
    pub fn dependencies(self) -> Vec<TaskId> {
        match self {
            TaskId::ConvertMetadata | TaskId::DownloadPeaks => Vec::new(),
            TaskId::SplitMetadata => vec![TaskId::ConvertMetadata],
            TaskId::EncodeFeatures => vec![TaskId::DownloadPeaks],
            TaskId::PairsPositive(_) | TaskId::PairsNegative(_) => {
                vec![TaskId::SplitMetadata, TaskId::EncodeFeatures]
            }
            TaskId::TrainModel => vec![
                TaskId::PairsPositive(Split::Train),
                TaskId::PairsNegative(Split::Train),
                TaskId::PairsPositive(Split::Val),
                TaskId::PairsNegative(Split::Val),
            ],
        }
    }

    /// Whether the task is run outside this crate through an
    /// [`ExternalStep`](super::ExternalStep).
    pub fn is_external(self) -> bool {
        matches!(self, TaskId::EncodeFeatures | TaskId::TrainModel)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskId::ConvertMetadata => f.write_str("convert_metadata"),
            TaskId::SplitMetadata => f.write_str("split_metadata"),
            TaskId::DownloadPeaks => f.write_str("download_peaks"),
            TaskId::EncodeFeatures => f.write_str("encode_features"),
            TaskId::PairsPositive(split) => write!(f, "generate_pairs_positive_{}", split),
            TaskId::PairsNegative(split) => write!(f, "generate_pairs_negative_{}", split),
            TaskId::TrainModel => f.write_str("train_model"),
        }
    }
}

impl Serialize for TaskId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Files a model training run reads for one partition.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingInputs {
    /// Partition metadata
    pub metadata: PathBuf,
    /// Positive pair file
    pub pairs_positive: PathBuf,
    /// Negative pair file
    pub pairs_negative: PathBuf,
}

impl TrainingInputs {
    fn for_metadata(metadata: PathBuf) -> Self {
        let (pairs_positive, pairs_negative) = pair_paths(&metadata);
        Self {
            metadata,
            pairs_positive,
            pairs_negative,
        }
    }
}

/// A task together with its resolved inputs and outputs.
#[derive(Debug, Clone, PartialEq)]
pub enum Task {
    /// Convert the raw library TSV
    ConvertMetadata {
        /// Raw library TSV
        raw: PathBuf,
        /// Metadata CSV to write
        metadata: PathBuf,
    },
    /// Split the metadata by dataset
    SplitMetadata {
        /// Metadata CSV to split
        metadata: PathBuf,
        /// Split settings
        config: SplitConfig,
    },
    /// Download the peak files listed in the raw library TSV
    DownloadPeaks {
        /// Raw library TSV
        raw: PathBuf,
        /// Download directory
        peak_dir: PathBuf,
        /// Download settings
        config: DownloadConfig,
    },
    /// Encode the downloaded peak files
    EncodeFeatures {
        /// Metadata CSV
        metadata: PathBuf,
        /// Downloaded peak files
        peak_dir: PathBuf,
        /// Directory for the feature tables
        feature_dir: PathBuf,
        /// Reference spectra for the reference encoder
        reference_spectra: Option<PathBuf>,
    },
    /// Generate the positive pairs of a partition
    PairsPositive {
        /// Partition metadata
        metadata: PathBuf,
        /// Pair file to write
        pairs: PathBuf,
    },
    /// Generate the negative pairs of a partition
    PairsNegative {
        /// Partition metadata
        metadata: PathBuf,
        /// Pair file to write
        pairs: PathBuf,
        /// Maximum precursor m/z difference
        mz_tolerance: f64,
    },
    /// Train the embedding model
    TrainModel {
        /// Training partition inputs
        train: TrainingInputs,
        /// Validation partition inputs
        val: TrainingInputs,
        /// Directory for the feature tables
        feature_dir: PathBuf,
    },
}

impl Task {
    /// Resolve the task `id` against the configuration.
    pub fn resolve(id: TaskId, config: &Config) -> Task {
        let paths = &config.paths;
        let metadata = paths.metadata_path();
        let partitions = split_paths(&metadata);
        let partition = |split: Split| match split {
            Split::Train => partitions.train.clone(),
            Split::Val => partitions.val.clone(),
            Split::Test => partitions.test.clone(),
        };

        match id {
            TaskId::ConvertMetadata => Task::ConvertMetadata {
                raw: paths.raw_metadata_path(),
                metadata,
            },
            TaskId::SplitMetadata => Task::SplitMetadata {
                metadata,
                config: config.split.clone(),
            },
            TaskId::DownloadPeaks => Task::DownloadPeaks {
                raw: paths.raw_metadata_path(),
                peak_dir: paths.peak_dir(),
                config: config.download.clone(),
            },
            TaskId::EncodeFeatures => Task::EncodeFeatures {
                metadata,
                peak_dir: paths.peak_dir(),
                feature_dir: paths.feature_dir(),
                reference_spectra: paths.reference_spectra.clone(),
            },
            TaskId::PairsPositive(split) => {
                let metadata = partition(split);
                let (pairs, _) = pair_paths(&metadata);
                Task::PairsPositive { metadata, pairs }
            }
            TaskId::PairsNegative(split) => {
                let metadata = partition(split);
                let (_, pairs) = pair_paths(&metadata);
                Task::PairsNegative {
                    metadata,
                    pairs,
                    mz_tolerance: config.pairs.mz_tolerance,
                }
            }
            TaskId::TrainModel => Task::TrainModel {
                train: TrainingInputs::for_metadata(partition(Split::Train)),
                val: TrainingInputs::for_metadata(partition(Split::Val)),
                feature_dir: paths.feature_dir(),
            },
        }
    }
}

/// A node of the task graph.
#[derive(Debug, Clone)]
pub struct Node {
    /// Task identifier
    pub id: TaskId,
    /// Resolved task
    pub task: Task,
    /// Tasks this one waits for
    pub dependencies: Vec<TaskId>,
}

/// The pipeline's tasks in a valid execution order.
#[derive(Debug, Clone)]
pub struct TaskGraph {
    nodes: Vec<Node>,
}

impl TaskGraph {
    /// Build the full pipeline graph for a configuration.
    pub fn from_config(config: &Config) -> Result<Self, PipelineError> {
        let nodes = TaskId::all()
            .into_iter()
            .map(|id| Node {
                id,
                task: Task::resolve(id, config),
                dependencies: id.dependencies(),
            })
            .collect();
        Self::new(nodes)
    }

    /// Order the nodes so that every node follows its dependencies.
    ///
    /// Among the nodes that are ready, declaration order is kept. Fails on
    /// duplicate nodes, unknown dependencies and cycles.
    pub fn new(nodes: Vec<Node>) -> Result<Self, PipelineError> {
        let mut known = HashSet::new();
        for node in &nodes {
            if !known.insert(node.id) {
                return Err(PipelineError::Graph(format!("duplicate task {}", node.id)));
            }
        }
        for node in &nodes {
            if let Some(missing) = node.dependencies.iter().find(|d| !known.contains(d)) {
                return Err(PipelineError::Graph(format!(
                    "task {} depends on unknown task {}",
                    node.id, missing
                )));
            }
        }

        let mut pending = nodes;
        let mut ordered = Vec::with_capacity(pending.len());
        let mut placed = HashSet::new();
        while !pending.is_empty() {
            let ready = pending
                .iter()
                .position(|node| node.dependencies.iter().all(|d| placed.contains(d)))
                .ok_or_else(|| {
                    let stuck: Vec<String> = pending.iter().map(|n| n.id.to_string()).collect();
                    PipelineError::Graph(format!("dependency cycle among {}", stuck.join(", ")))
                })?;
            let node = pending.remove(ready);
            placed.insert(node.id);
            ordered.push(node);
        }

        Ok(Self { nodes: ordered })
    }

    /// Nodes in execution order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Task identifiers in execution order.
    pub fn order(&self) -> Vec<TaskId> {
        self.nodes.iter().map(|n| n.id).collect()
    }

    /// Look up a node.
    pub fn node(&self, id: TaskId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }
}
