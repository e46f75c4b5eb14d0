#![no_main]

use std::collections::HashMap;

use detection::{BoundaryDetector, DetectorConfig, NullObserver};
use libfuzzer_sys::fuzz_target;
use once_cell::sync::Lazy;

static DETECTOR: Lazy<BoundaryDetector> = Lazy::new(|| {
    BoundaryDetector::with_observer(DetectorConfig::default(), Box::new(NullObserver))
});

fn bounded_text(data: &[u8], offset: usize, len: usize) -> String {
    let start = offset.min(data.len());
    let end = (start + len).min(data.len());
    String::from_utf8_lossy(&data[start..end]).to_string()
}

fn method(tag: u8) -> &'static str {
    match tag % 4 {
        0 => "GET",
        1 => "POST",
        2 => "PUT",
        _ => "DELETE",
    }
}

fuzz_target!(|data: &[u8]| {
    let tag = data.first().copied().unwrap_or_default();
    let path = bounded_text(data, 1, 64);
    let remote_addr = bounded_text(data, 65, 24);

    let mut headers = HashMap::new();
    if tag & 1 == 1 {
        headers.insert("service-worker".to_string(), bounded_text(data, 89, 16));
    }
    headers.insert(bounded_text(data, 105, 16), bounded_text(data, 121, 16));

    DETECTOR.on_request(&path, method(tag), &remote_addr, &headers);
    let _ = DETECTOR.alerts();
    let _ = DETECTOR.summary();
});
