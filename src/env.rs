use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use tracing::warn;

/// Read access to a set of environment variables.
pub trait Environment {
    /// Looks up a single variable.
    fn var(&self, name: &str) -> Option<String>;

    /// Reads every variable at once, ordered by name.
    fn snapshot(&self) -> BTreeMap<String, String>;
}

/// The environment of the current process.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl Environment for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        match std::env::var(name) {
            Ok(value) => Some(value),
            Err(std::env::VarError::NotPresent) => None,
            Err(std::env::VarError::NotUnicode(_)) => {
                warn!(name, "ignoring environment variable with non-unicode value");
                None
            }
        }
    }

    fn snapshot(&self) -> BTreeMap<String, String> {
        std::env::vars_os()
            .filter_map(|(key, value)| match (key.into_string(), value.into_string()) {
                (Ok(key), Ok(value)) => Some((key, value)),
                (key, _) => {
                    warn!(key = ?key, "ignoring non-unicode environment entry");
                    None
                }
            })
            .collect()
    }
}

impl<S: BuildHasher> Environment for HashMap<String, String, S> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }

    fn snapshot(&self) -> BTreeMap<String, String> {
        self.iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}

impl Environment for BTreeMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }

    fn snapshot(&self) -> BTreeMap<String, String> {
        self.clone()
    }
}
