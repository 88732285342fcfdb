//! Bounded fan-out over a dedicated rayon pool.
//!
//! Results come back in submission order whatever order the workers finish
//! in. A job that panics yields `None` in its slot instead of unwinding into
//! the caller, whatever the pool size.

use std::num::NonZeroUsize;
use std::panic::{self, AssertUnwindSafe};

use rayon::ThreadPoolBuilder;
use rayon::prelude::*;

/// Run `work` over every job with at most `workers` threads.
///
/// The returned vector is parallel to `jobs`. A slot is `None` only when its
/// job panicked. If the pool cannot be built the jobs run one after another
/// on the calling thread.
pub(crate) fn run_bounded<J, R, F>(jobs: &[J], workers: NonZeroUsize, work: F) -> Vec<Option<R>>
where
    J: Sync,
    R: Send,
    F: Fn(&J) -> R + Sync,
{
    let guarded = |job: &J| {
        panic::catch_unwind(AssertUnwindSafe(|| work(job)))
            .map_err(|_| log::error!("discovery job panicked; its answer is lost"))
            .ok()
    };

    match ThreadPoolBuilder::new()
        .num_threads(workers.get())
        .thread_name(|index| format!("locality-discovery-{index}"))
        .build()
    {
        Ok(pool) => pool.install(|| jobs.par_iter().map(guarded).collect()),
        Err(err) => {
            log::warn!("failed to build discovery pool, running queries inline: {err}");
            jobs.iter().map(guarded).collect()
        }
    }
}
