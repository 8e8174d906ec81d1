use std::sync::Mutex;

use crate::{
    collection::store::PanoramaCollection,
    foundation::error::{OdsError, OdsResult},
    synth::{
        backend::{BackendKind, CompositorBackend, create_backend, execute_synthesis, detect_backend},
        output::SynthesizedPanorama,
        plan::{SynthesisRequest, plan_synthesis},
    },
};

/// Options for a [`Synthesizer`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SynthesisOpts {
    /// Override the number of rayon worker threads. `None` uses rayon defaults.
    pub threads: Option<usize>,
    /// Force a compositor backend. `None` detects one from the thread pool.
    pub backend: Option<BackendKind>,
}

/// Long-lived synthesis context: a dedicated thread pool and one reusable compositor buffer.
///
/// `synthesize` takes `&self`; concurrent callers are serialized on the compositor, and every call
/// returns an owned panorama.
pub struct Synthesizer {
    pool: rayon::ThreadPool,
    backend: Mutex<Box<dyn CompositorBackend>>,
}

impl std::fmt::Debug for Synthesizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Synthesizer")
            .field("threads", &self.pool.current_num_threads())
            .field("backend", &self.backend_kind())
            .finish()
    }
}

impl Synthesizer {
    /// Build the thread pool and compositor.
    pub fn new(opts: SynthesisOpts) -> OdsResult<Self> {
        let pool = build_thread_pool(opts.threads)?;
        let kind = opts.backend.unwrap_or_else(|| pool.install(detect_backend));
        let backend = create_backend(kind)?;
        tracing::debug!(
            backend = kind.name(),
            threads = pool.current_num_threads(),
            "synthesizer ready"
        );
        Ok(Self {
            pool,
            backend: Mutex::new(backend),
        })
    }

    /// Compositor in use. `None` only if a previous call panicked mid-synthesis.
    pub fn backend_kind(&self) -> Option<BackendKind> {
        self.backend.lock().ok().map(|b| b.kind())
    }

    /// Synthesize a stereo panorama for `request`.
    #[tracing::instrument(skip_all, fields(nodes = collection.len(), max_views = request.max_views))]
    pub fn synthesize(
        &self,
        collection: &PanoramaCollection,
        request: &SynthesisRequest,
    ) -> OdsResult<SynthesizedPanorama> {
        let plan = plan_synthesis(collection, request)?;
        let mut backend = self
            .backend
            .lock()
            .map_err(|_| OdsError::synthesis("compositor poisoned by an earlier panic"))?;
        let backend: &mut dyn CompositorBackend = backend.as_mut();
        self.pool
            .install(move || execute_synthesis(backend, collection, &plan))
    }
}

/// One-shot synthesis on the global rayon pool with a detected backend.
pub fn synthesize(
    collection: &PanoramaCollection,
    request: &SynthesisRequest,
) -> OdsResult<SynthesizedPanorama> {
    let plan = plan_synthesis(collection, request)?;
    let mut backend = create_backend(detect_backend())?;
    execute_synthesis(backend.as_mut(), collection, &plan)
}

fn build_thread_pool(threads: Option<usize>) -> OdsResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(OdsError::validation(
            "synthesis 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| OdsError::synthesis(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/synth/session.rs"]
mod tests;
