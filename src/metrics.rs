use std::sync::LazyLock;

use prometheus::*;

use crate::ranking::SearchMode;

static METRIC_SEARCH_COUNT: LazyLock<IntCounterVec> = LazyLock::new(|| {
    register_int_counter_vec!("fs_search_count", "count of search requests", &["mode"]).unwrap()
});

static METRIC_SEARCH_DURATION: LazyLock<HistogramVec> = LazyLock::new(|| {
    register_histogram_vec!(
        "fs_search_duration",
        "duration of the search request in seconds, including record loading",
        &["mode"]
    )
    .unwrap()
});

static METRIC_HYBRID_FALLBACK: LazyLock<IntCounter> = LazyLock::new(|| {
    register_int_counter!(
        "fs_hybrid_fallback_count",
        "count of hybrid searches without text match that fell back to semantic search"
    )
    .unwrap()
});

static METRIC_EMBED_FAILURE: LazyLock<IntCounterVec> = LazyLock::new(|| {
    register_int_counter_vec!(
        "fs_embed_failure_count",
        "count of failed query embedding requests",
        &["mode"]
    )
    .unwrap()
});

static METRIC_SKIPPED_RECORD: LazyLock<IntCounter> = LazyLock::new(|| {
    register_int_counter!(
        "fs_skipped_record_count",
        "count of records skipped from semantic scoring due to a dimension mismatch"
    )
    .unwrap()
});

pub fn inc_search_count(mode: SearchMode) {
    METRIC_SEARCH_COUNT.with_label_values(&[mode.as_str()]).inc();
}

pub fn observe_search_duration(mode: SearchMode, seconds: f64) {
    METRIC_SEARCH_DURATION.with_label_values(&[mode.as_str()]).observe(seconds);
}

pub fn inc_hybrid_fallback() {
    METRIC_HYBRID_FALLBACK.inc();
}

pub fn inc_embed_failure(mode: SearchMode) {
    METRIC_EMBED_FAILURE.with_label_values(&[mode.as_str()]).inc();
}

pub fn inc_skipped_record() {
    METRIC_SKIPPED_RECORD.inc();
}

/// 以 prometheus 文本格式导出所有指标
pub fn gather_text() -> anyhow::Result<String> {
    let metric_families = prometheus::gather();
    Ok(TextEncoder::new().encode_to_string(&metric_families)?)
}
