use crate::EnvBindError;
use crate::format::Formatter;

/// Settings for keyed collections (maps).
#[derive(Debug, Clone)]
pub struct MapOptions {
    /// Regex sub-pattern capturing a map key. Must contain exactly one group.
    pub key_pattern: String,
    /// Separates entries in the single-string form (`a:1,b:2`).
    pub entry_separator: String,
    /// Separates key from value in the single-string form.
    pub key_value_separator: String,
}

impl Default for MapOptions {
    fn default() -> Self {
        MapOptions {
            key_pattern: "(.+)".to_string(),
            entry_separator: ",".to_string(),
            key_value_separator: ":".to_string(),
        }
    }
}

/// Settings for sequences (`Vec`).
#[derive(Debug, Clone)]
pub struct SequenceOptions {
    /// Regex sub-pattern capturing an index. Must contain exactly one group.
    pub index_pattern: String,
    /// Separates elements in the single-string form (`a,b,c`).
    pub element_separator: String,
    /// Index advertised for the first element.
    pub first_index: usize,
    /// Capacity allocated on first growth; doubled as needed.
    pub base_capacity: usize,
    /// Longest sequence an indexed variable may create.
    pub max_length: usize,
}

impl SequenceOptions {
    /// Maps a captured index token to a position in the backing storage.
    pub fn position(&self, index: &str) -> Result<usize, EnvBindError> {
        let index = index
            .parse::<usize>()
            .map_err(|e| EnvBindError::parse("sequence index", index, e))?;
        let position = index.checked_sub(self.first_index).ok_or_else(|| {
            EnvBindError::parse(
                "sequence index",
                index.to_string(),
                format!("below first index {}", self.first_index),
            )
        })?;
        if position >= self.max_length {
            return Err(EnvBindError::parse(
                "sequence index",
                index.to_string(),
                format!("exceeds maximum length {}", self.max_length),
            ));
        }
        Ok(position)
    }
}

impl Default for SequenceOptions {
    fn default() -> Self {
        SequenceOptions {
            index_pattern: "([0-9]+)".to_string(),
            element_separator: ",".to_string(),
            first_index: 0,
            base_capacity: 16,
            max_length: 1 << 16,
        }
    }
}

/// Options controlling name derivation and decoding.
///
/// ```rust
/// use env_bind::{FormatBuilder, Options};
///
/// let options = Options::default()
///     .with_prefix("app")
///     .with_match_case(true)
///     .with_formatter(FormatBuilder::original_names().join_with("__"));
/// assert_eq!(options.formatters.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct Options {
    /// Literal fragment placed ahead of every derived name. Falls back to the
    /// root type's declared prefix when `None`.
    pub prefix: Option<String>,
    /// Match pattern variables case-sensitively. Literal lookups are always exact.
    pub match_case: bool,
    pub map: MapOptions,
    pub sequence: SequenceOptions,
    /// Each formatter yields one spelling per leaf.
    pub formatters: Vec<Formatter>,
}

impl Options {
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn with_match_case(mut self, match_case: bool) -> Self {
        self.match_case = match_case;
        self
    }

    /// Registers an additional formatter after the existing ones.
    pub fn with_formatter(mut self, formatter: Formatter) -> Self {
        self.formatters.push(formatter);
        self
    }
}

impl Default for Options {
    fn default() -> Self {
        Options {
            prefix: None,
            match_case: false,
            map: MapOptions::default(),
            sequence: SequenceOptions::default(),
            formatters: vec![Formatter::default()],
        }
    }
}
