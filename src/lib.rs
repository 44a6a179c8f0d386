pub use sirds_codec as codec;
pub use sirds_core as core;
pub use sirds_imgproc as imgproc;

/// Initialize a single global Rayon thread pool for all CPU-parallel
/// routines.
///
/// Call this once at application startup before heavy encode/decode work.
/// Repeated calls are idempotent and return the first initialization result.
///
/// Priority order:
/// 1. explicit `num_threads`
/// 2. `SIRDS_CPU_THREADS` env var
/// 3. Rayon default
pub fn init_thread_pool(num_threads: Option<usize>) -> Result<(), String> {
    sirds_core::init_global_thread_pool(num_threads)
}
