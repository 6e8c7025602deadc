//! Prometheus metric names and recording helpers.

use std::time::Duration;

use metrics::{
    counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram, Unit,
};
use projection::MapProjection;

pub const RENDERS_TOTAL: &str = "map_renders_total";
pub const RENDER_ERRORS_TOTAL: &str = "map_render_errors_total";
pub const RENDER_DURATION_SECONDS: &str = "map_render_duration_seconds";
pub const LUT_CACHE_HITS_TOTAL: &str = "map_lut_cache_hits_total";
pub const LUT_CACHE_MISSES_TOTAL: &str = "map_lut_cache_misses_total";
pub const LUT_CACHE_BYTES: &str = "map_lut_cache_bytes";

/// Register metric descriptions with the installed recorder.
pub fn describe() {
    describe_counter!(RENDERS_TOTAL, "Map views rendered");
    describe_counter!(RENDER_ERRORS_TOTAL, "Map render requests that failed");
    describe_histogram!(
        RENDER_DURATION_SECONDS,
        Unit::Seconds,
        "Time to render and encode one map view"
    );
    describe_counter!(LUT_CACHE_HITS_TOTAL, "View LUT cache hits");
    describe_counter!(LUT_CACHE_MISSES_TOTAL, "View LUT cache misses");
    describe_gauge!(LUT_CACHE_BYTES, Unit::Bytes, "Memory held by cached view LUTs");
}

/// Record the outcome of one render request.
pub fn record_render(projection: MapProjection, elapsed: Duration, success: bool) {
    let label = projection.name();
    if success {
        counter!(RENDERS_TOTAL, "projection" => label).increment(1);
        histogram!(RENDER_DURATION_SECONDS, "projection" => label).record(elapsed.as_secs_f64());
    } else {
        counter!(RENDER_ERRORS_TOTAL, "projection" => label).increment(1);
    }
}

pub fn record_lut_cache(hit: bool) {
    if hit {
        counter!(LUT_CACHE_HITS_TOTAL).increment(1);
    } else {
        counter!(LUT_CACHE_MISSES_TOTAL).increment(1);
    }
}

pub fn record_lut_cache_bytes(bytes: usize) {
    gauge!(LUT_CACHE_BYTES).set(bytes as f64);
}
