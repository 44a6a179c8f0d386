use rayon::ThreadPoolBuilder;
use std::sync::OnceLock;

static POOL_INIT: OnceLock<Result<(), String>> = OnceLock::new();

/// Initialize the global Rayon thread pool used by the CPU-parallel routines.
///
/// Thread count is taken from `num_threads`, then the `SIRDS_CPU_THREADS`
/// environment variable, then the Rayon default. Repeated calls are
/// idempotent and return the first initialization result.
pub fn init_global_thread_pool(num_threads: Option<usize>) -> Result<(), String> {
    POOL_INIT
        .get_or_init(|| {
            let threads = match num_threads.or_else(env_thread_count) {
                Some(0) => return Err("thread count must be >= 1".to_string()),
                other => other,
            };

            let mut builder = ThreadPoolBuilder::new();
            if let Some(n) = threads {
                builder = builder.num_threads(n);
            }
            builder.build_global().map_err(|e| e.to_string())
        })
        .clone()
}

pub fn current_cpu_threads() -> usize {
    rayon::current_num_threads()
}

fn env_thread_count() -> Option<usize> {
    std::env::var("SIRDS_CPU_THREADS").ok()?.parse().ok()
}
