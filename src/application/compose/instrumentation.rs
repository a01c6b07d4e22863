use tracing::trace;

/// A template region about to be written: either literal markup copied from
/// the template source or the output of an evaluated expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionEvent {
    pub path: String,
    pub position: usize,
    pub length: usize,
    pub is_literal: bool,
}

/// Optional collaborator receiving begin/end region events.
pub trait RegionTracer: Send + Sync {
    fn begin_region(&self, event: &RegionEvent);
    fn end_region(&self, path: &str);
}

/// Emits region events as `trace`-level tracing events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingRegionTracer;

impl RegionTracer for TracingRegionTracer {
    fn begin_region(&self, event: &RegionEvent) {
        trace!(
            target: "trellis::regions",
            path = %event.path,
            position = event.position,
            length = event.length,
            is_literal = event.is_literal,
            "region begin"
        );
    }

    fn end_region(&self, path: &str) {
        trace!(target: "trellis::regions", path, "region end");
    }
}
