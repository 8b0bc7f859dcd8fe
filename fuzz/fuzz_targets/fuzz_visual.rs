//! Fuzz target for command-name escaping.
//!
//! Escaped names go straight to the terminal, so no control byte may
//! survive.

#![no_main]

use libfuzzer_sys::fuzz_target;
use ptree_core::visual::{take_columns, visual, width};

fuzz_target!(|data: &[u8]| {
    let escaped = visual(data);
    assert!(!escaped.chars().any(|c| c.is_control()));
    let columns = width(&escaped);
    assert!(columns <= 2 * escaped.chars().count());

    let half = columns / 2;
    let (head, head_width) = take_columns(&escaped, half);
    assert!(head_width <= half);
    assert!(escaped.starts_with(head));

});
