#![no_main]

use libfuzzer_sys::fuzz_target;
use lighting_savings::core::schedule::{duration_hours, parse_clock_time};
use lighting_savings::core::validation::validate_named_input;

fuzz_target!(|data: (&str, &str)| {
    let (first, second) = data;
    let _validated = validate_named_input(first, second);

    if let (Ok(start), Ok(end)) = (parse_clock_time(first), parse_clock_time(second)) {
        let hours = duration_hours(start, end);
        assert!((0. ..24.).contains(&hours));
    }
});
