#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use once_cell::sync::Lazy;

static TEST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

/// Builds an injected environment from key/value pairs.
pub fn env(vars: &[(&str, &str)]) -> HashMap<String, String> {
    vars.iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

// NOTE: this is a helper function that runs a test with a given array of env vars to set and
// cleanup. Only tests that read the real process environment need it; everything else injects a
// map built with `env`.
//
// WARNING: SAFETY: There can be no more than a SINGLE test running with this wrapper
// at a time. This is achieved by grabbing the static lock at the beginning of each test and
// dropping it at the end of it's execution. We catch any unwinds to avoid poisoning the lock
// (which would fail subsequent tests)
// See https://doc.rust-lang.org/std/env/fn.set_var.html#safety for details
pub unsafe fn with_env_vars<U, F: FnOnce() -> U + std::panic::UnwindSafe>(
    vars: &[(&str, &str)],
    test: F,
) -> U {
    // aquire lock
    let _guard = TEST_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    // set all vars
    for (key, value) in vars {
        unsafe { std::env::set_var(key, value) };
    }

    // run the test
    let result = std::panic::catch_unwind(test);

    // clean up
    for (key, _) in vars {
        unsafe { std::env::remove_var(key) };
    }
    // lock drops
    drop(_guard);
    match result {
        Ok(val) => val,
        Err(err) => std::panic::resume_unwind(err),
    }
}
