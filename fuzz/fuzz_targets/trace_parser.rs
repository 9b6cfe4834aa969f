#![no_main]

use libfuzzer_sys::fuzz_target;
use syscov::coverage::CoverageStats;
use syscov::Trace;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        // Any accepted trace must also yield coverage or a clean error
        if let Ok(trace) = Trace::parse("fuzz", input) {
            let _ = CoverageStats::compute(&trace);
        }
    }
});
