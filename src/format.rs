use std::fmt;
use std::sync::Arc;

use heck::ToSnakeCase;

/// One segment of a derived variable name.
///
/// Literal fragments carry a structural name (a field name or the prefix). Dynamic
/// fragments carry a regex sub-pattern with exactly one capture group, standing in
/// for a map key or a sequence index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    text: String,
    dynamic: bool,
}

impl Fragment {
    pub fn literal(text: impl Into<String>) -> Self {
        Fragment {
            text: text.into(),
            dynamic: false,
        }
    }

    pub fn dynamic(pattern: impl Into<String>) -> Self {
        Fragment {
            text: pattern.into(),
            dynamic: true,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_dynamic(&self) -> bool {
        self.dynamic
    }
}

type SplitFn = dyn Fn(&str) -> Vec<String> + Send + Sync;
type JoinFn = dyn Fn(Vec<String>) -> String + Send + Sync;
type EachFn = dyn Fn(String) -> String + Send + Sync;

/// A `split`/`join` pair turning name fragments into one variable name.
///
/// Several formatters may be registered at once; each one yields its own
/// spelling for every leaf.
#[derive(Clone)]
pub struct Formatter {
    split: Arc<SplitFn>,
    join: Arc<JoinFn>,
}

impl Formatter {
    pub fn new(
        split: impl Fn(&str) -> Vec<String> + Send + Sync + 'static,
        join: impl Fn(Vec<String>) -> String + Send + Sync + 'static,
    ) -> Self {
        Formatter {
            split: Arc::new(split),
            join: Arc::new(join),
        }
    }

    /// Upper-cased words joined with `_`: `child_field` -> `CHILD_FIELD`.
    pub fn screaming_snake() -> Self {
        FormatBuilder::words().upper_case().join_with("_")
    }

    pub fn split(&self, value: &str) -> Vec<String> {
        (self.split)(value)
    }

    pub fn join(&self, tokens: Vec<String>) -> String {
        (self.join)(tokens)
    }

    /// Formats `fragments` given in accumulation order (innermost first).
    ///
    /// Returns the name and whether it is a pattern. Literal fragments are split
    /// into sub-tokens; dynamic fragments are kept whole. When the result is a
    /// pattern, literal sub-tokens are regex-escaped so they match verbatim.
    pub fn format(&self, fragments: &[Fragment]) -> (String, bool) {
        let dynamic = fragments.iter().any(Fragment::is_dynamic);
        let mut tokens = Vec::with_capacity(fragments.len());

        for fragment in fragments.iter().rev() {
            if fragment.dynamic {
                tokens.push(fragment.text.clone());
            } else if dynamic {
                tokens.extend(self.split(&fragment.text).iter().map(|t| regex::escape(t)));
            } else {
                tokens.extend(self.split(&fragment.text));
            }
        }

        (self.join(tokens), dynamic)
    }
}

impl Default for Formatter {
    fn default() -> Self {
        Formatter::screaming_snake()
    }
}

impl fmt::Debug for Formatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Formatter").finish_non_exhaustive()
    }
}

/// Composes a [`Formatter`] as split -> per-token transforms -> join.
///
/// Transforms run on the sub-tokens of literal fragments only, never on the regex
/// sub-patterns of dynamic fragments.
pub struct FormatBuilder {
    split: Arc<SplitFn>,
    each: Vec<Arc<EachFn>>,
}

impl FormatBuilder {
    pub fn new(split: impl Fn(&str) -> Vec<String> + Send + Sync + 'static) -> Self {
        FormatBuilder {
            split: Arc::new(split),
            each: Vec::new(),
        }
    }

    /// Keeps each name as a single token.
    pub fn original_names() -> Self {
        FormatBuilder::new(|value| vec![value.to_string()])
    }

    /// Splits snake_case and camelCase identifiers into lower-case words.
    pub fn words() -> Self {
        FormatBuilder::new(|value| {
            value
                .to_snake_case()
                .split('_')
                .filter(|word| !word.is_empty())
                .map(str::to_string)
                .collect()
        })
    }

    pub fn each(
        mut self,
        format: impl Fn(String) -> String + Send + Sync + 'static,
    ) -> Self {
        self.each.push(Arc::new(format));
        self
    }

    pub fn upper_case(self) -> Self {
        self.each(|value| value.to_uppercase())
    }

    pub fn lower_case(self) -> Self {
        self.each(|value| value.to_lowercase())
    }

    pub fn trim_space(self) -> Self {
        self.each(|value| value.trim().to_string())
    }

    pub fn join(
        self,
        join: impl Fn(Vec<String>) -> String + Send + Sync + 'static,
    ) -> Formatter {
        let FormatBuilder { split, each } = self;
        Formatter {
            split: Arc::new(move |value: &str| {
                split(value)
                    .into_iter()
                    .map(|token| each.iter().fold(token, |token, format| format(token)))
                    .collect()
            }),
            join: Arc::new(join),
        }
    }

    pub fn join_with(self, separator: impl Into<String>) -> Formatter {
        let separator = separator.into();
        self.join(move |tokens| tokens.join(&separator))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(fragments: &[Fragment]) -> Vec<Fragment> {
        // accumulation order is innermost first
        fragments.iter().rev().cloned().collect()
    }

    #[test]
    fn literal_fragments_form_a_plain_name() {
        let fragments = path(&[Fragment::literal("child_field"), Fragment::literal("testField")]);
        let (name, dynamic) = Formatter::default().format(&fragments);
        assert_eq!(name, "CHILD_FIELD_TEST_FIELD");
        assert!(!dynamic);
    }

    #[test]
    fn dynamic_fragments_are_kept_whole() {
        let fragments = path(&[
            Fragment::literal("map_field"),
            Fragment::dynamic(r"(\w+)"),
            Fragment::literal("value"),
        ]);
        let (name, dynamic) = Formatter::default().format(&fragments);
        assert_eq!(name, r"MAP_FIELD_(\w+)_VALUE");
        assert!(dynamic);
    }

    #[test]
    fn lower_case_does_not_touch_patterns() {
        let formatter = FormatBuilder::words().lower_case().join_with(".");
        let fragments = path(&[Fragment::literal("Servers"), Fragment::dynamic(r"(\D+)")]);
        let (name, _) = formatter.format(&fragments);
        assert_eq!(name, r"servers.(\D+)");
    }

    #[test]
    fn literal_tokens_are_escaped_in_patterns() {
        let formatter = FormatBuilder::original_names().join_with("_");
        let fragments = path(&[Fragment::literal("app.v1"), Fragment::dynamic("([0-9]+)")]);
        let (name, _) = formatter.format(&fragments);
        assert_eq!(name, r"app\.v1_([0-9]+)");
    }

    #[test]
    fn original_names_preserve_spelling() {
        let formatter = FormatBuilder::original_names().join_with("_");
        let fragments = path(&[Fragment::literal("Outer"), Fragment::literal("innerField")]);
        assert_eq!(formatter.format(&fragments).0, "Outer_innerField");
    }

    #[test]
    fn transforms_apply_in_registration_order() {
        let formatter = FormatBuilder::original_names()
            .trim_space()
            .each(|value| format!("<{value}>"))
            .upper_case()
            .join(|tokens| tokens.concat());
        let fragments = path(&[Fragment::literal(" a "), Fragment::literal("b")]);
        assert_eq!(formatter.format(&fragments).0, "<A><B>");
    }

    #[test]
    fn words_split_camel_and_snake_case() {
        let split = FormatBuilder::words().join_with("_");
        assert_eq!(split.split("HTTPServerPort"), vec!["http", "server", "port"]);
        assert_eq!(split.split("max_open_files"), vec!["max", "open", "files"]);
    }
}
