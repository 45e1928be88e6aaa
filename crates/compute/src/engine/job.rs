use std::path::{Path, PathBuf};
use std::sync::Arc;

use tunegraph_core::{Dataset, ParamBundle};

/// Everything a worker needs to run one unit. Consumed once by the dispatcher.
#[derive(Debug, Clone)]
pub struct JobDescriptor {
    pub unit_id: String,
    pub dataset: Arc<Dataset>,
    pub params: Arc<ParamBundle>,
    /// `<output_dir>/<unit_id>`, no extension. The unit picks its own.
    pub output_prefix: PathBuf,
}

/// Build one descriptor per unit id, in input order.
///
/// Every descriptor shares the same dataset and parameter bundle. No I/O.
pub fn build(
    unit_ids: &[String],
    dataset: &Arc<Dataset>,
    params: &Arc<ParamBundle>,
    output_dir: &Path,
) -> Vec<JobDescriptor> {
    unit_ids
        .iter()
        .map(|unit_id| JobDescriptor {
            unit_id: unit_id.clone(),
            dataset: Arc::clone(dataset),
            params: Arc::clone(params),
            output_prefix: output_dir.join(unit_id),
        })
        .collect()
}
