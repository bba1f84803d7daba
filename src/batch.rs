//! Many independent sessions on a rayon pool.

use rayon::prelude::*;

use crate::foundation::error::{ReplayError, ReplayResult};
use crate::session::{Job, JobReport};

fn build_thread_pool(threads: Option<usize>) -> ReplayResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(ReplayError::validation(
            "batch 'threads' must be >= 1 when set",
        ));
    }
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| ReplayError::Other(anyhow::anyhow!("failed to build rayon thread pool: {e}")))
}

/// Apply `f` to every item on a dedicated pool. Results keep input order.
pub fn run_batch_with<T, R, F>(items: &[T], threads: Option<usize>, f: F) -> ReplayResult<Vec<R>>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync + Send,
{
    let pool = build_thread_pool(threads)?;
    Ok(pool.install(|| items.par_iter().map(&f).collect()))
}

/// Run every job with its own engine, surface and sink. One failing job does not stop the others.
#[tracing::instrument(skip(jobs), fields(count = jobs.len()))]
pub fn run_batch(jobs: &[Job], threads: Option<usize>) -> ReplayResult<Vec<ReplayResult<JobReport>>> {
    let results = run_batch_with(jobs, threads, |job| {
        let label = job.label();
        let res = job.run();
        match &res {
            Ok(_) => tracing::info!(job = %label, "job finished"),
            Err(err) => tracing::warn!(job = %label, %err, "job failed"),
        }
        res
    })?;
    let failed = results.iter().filter(|r| r.is_err()).count();
    tracing::info!(total = results.len(), failed, "batch done");
    Ok(results)
}

#[cfg(test)]
#[path = "../tests/unit/batch.rs"]
mod tests;
