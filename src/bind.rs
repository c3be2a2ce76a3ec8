use std::fmt;
use std::rc::Rc;

use regex::Regex;
use tracing::{debug, trace};

use crate::env::Environment;
use crate::format::Fragment;
use crate::walker::{Setter, Walker};
use crate::{EnvBind, EnvBindError, Options};

/// A derived name (or pattern) together with the setter it triggers.
pub struct Variable<P, T> {
    pattern: P,
    setter: Setter<T>,
}

impl<P, T> Variable<P, T> {
    pub fn pattern(&self) -> &P {
        &self.pattern
    }
}

impl<P: fmt::Display, T> fmt::Display for Variable<P, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.pattern.fmt(f)
    }
}

impl<P: fmt::Debug, T> fmt::Debug for Variable<P, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Variable")
            .field("pattern", &self.pattern)
            .finish_non_exhaustive()
    }
}

/// Every variable a type can be populated from, for one set of options.
///
/// Literal variables are looked up by exact name; pattern variables are matched
/// against every entry of the environment.
#[derive(Debug)]
pub struct Bindings<T> {
    literals: Vec<Variable<String, T>>,
    patterns: Vec<Variable<Regex, T>>,
}

impl<T: EnvBind> Bindings<T> {
    /// Walks `T` and derives one variable per leaf and formatter.
    pub fn collect(options: &Options) -> Result<Self, EnvBindError> {
        let walker = Walker::new(options.clone());
        let prefix = options
            .prefix
            .as_deref()
            .or(T::default_prefix())
            .filter(|prefix| !prefix.is_empty());

        let mut literals = Vec::new();
        let mut patterns = Vec::new();

        for mut leaf in walker.analyze::<T>() {
            if let Some(prefix) = prefix {
                leaf = leaf.within(Fragment::literal(prefix));
            }
            let groups = leaf.fragments().iter().filter(|f| f.is_dynamic()).count();

            let mut seen: Vec<String> = Vec::with_capacity(options.formatters.len());
            for formatter in &options.formatters {
                let (name, dynamic) = formatter.format(leaf.fragments());
                if seen.contains(&name) {
                    continue;
                }
                seen.push(name.clone());

                let setter = Rc::clone(leaf.setter());
                if dynamic {
                    let pattern = compile(&name, groups, options.match_case)?;
                    patterns.push(Variable { pattern, setter });
                } else {
                    literals.push(Variable {
                        pattern: name,
                        setter,
                    });
                }
            }
        }

        debug!(
            literals = literals.len(),
            patterns = patterns.len(),
            "collected environment bindings"
        );
        Ok(Bindings { literals, patterns })
    }

    pub fn literals(&self) -> impl Iterator<Item = &str> {
        self.literals.iter().map(|variable| variable.pattern.as_str())
    }

    pub fn patterns(&self) -> impl Iterator<Item = &Regex> {
        self.patterns.iter().map(|variable| &variable.pattern)
    }

    /// Applies matching environment variables to `target`.
    ///
    /// Literal variables run first, in derivation order; empty values count as
    /// unset. Pattern variables then run against one ordered snapshot of `env`.
    /// The first setter error stops the load; writes already applied stay.
    pub fn apply<E>(&self, target: &mut T, env: &E) -> Result<(), EnvBindError>
    where
        E: Environment + ?Sized,
    {
        for variable in &self.literals {
            let name = variable.pattern.as_str();
            let Some(value) = env.var(name).filter(|value| !value.is_empty()) else {
                trace!(name, "variable not set");
                continue;
            };
            trace!(name, "applying variable");
            (variable.setter)(target, &[value.as_str()]).map_err(|e| e.in_variable(name))?;
        }

        if self.patterns.is_empty() {
            return Ok(());
        }

        let snapshot = env.snapshot();
        for (key, value) in &snapshot {
            for variable in &self.patterns {
                let Some(captures) = variable.pattern.captures(key) else {
                    continue;
                };
                let mut tokens: Vec<&str> = captures
                    .iter()
                    .skip(1)
                    .map(|group| group.map_or("", |m| m.as_str()))
                    .collect();
                tokens.push(value);

                debug!(key, pattern = %variable.pattern, "applying pattern variable");
                (variable.setter)(target, &tokens).map_err(|e| e.in_variable(key))?;
            }
        }
        Ok(())
    }
}

fn compile(name: &str, groups: usize, match_case: bool) -> Result<Regex, EnvBindError> {
    let pattern = if match_case {
        format!("^{name}$")
    } else {
        format!("(?i)^{name}$")
    };
    let regex = Regex::new(&pattern).map_err(|e| EnvBindError::InvalidPattern {
        pattern: pattern.clone(),
        reason: e.to_string(),
    })?;

    let found = regex.captures_len() - 1;
    if found != groups {
        return Err(EnvBindError::InvalidPattern {
            pattern,
            reason: format!("expected {groups} capture groups, found {found}"),
        });
    }
    Ok(regex)
}
