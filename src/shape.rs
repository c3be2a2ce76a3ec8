use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::{BuildHasher, Hash};

use crate::grow::Keyed;
use crate::scalar::Kind;
use crate::walker::{Leaf, Walker};
use crate::{EnvBindError, Options};

/// Structural description of a bindable type.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Primitive(Kind),
    Optional(Box<Shape>),
    Sequence(Box<Shape>),
    KeyedCollection { key: Box<Shape>, value: Box<Shape> },
    Struct {
        name: &'static str,
        fields: Vec<FieldShape>,
    },
}

/// One bound field of a [`Shape::Struct`]. Skipped fields are not listed.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldShape {
    pub name: &'static str,
    pub shape: Shape,
    /// Embedded fields are addressable with and without their own name.
    pub flatten: bool,
}

impl FieldShape {
    pub fn new(name: &'static str, shape: Shape, flatten: bool) -> Self {
        FieldShape {
            name,
            shape,
            flatten,
        }
    }
}

impl Shape {
    /// Looks through optional wrappers.
    pub fn indirect(&self) -> &Shape {
        match self {
            Shape::Optional(inner) => inner.indirect(),
            other => other,
        }
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self.indirect(), Shape::Primitive(_))
    }

    pub fn is_primitive_sequence(&self) -> bool {
        matches!(self.indirect(), Shape::Sequence(element) if element.is_primitive())
    }

    pub fn is_primitive_map(&self) -> bool {
        matches!(
            self.indirect(),
            Shape::KeyedCollection { key, value } if key.is_primitive() && value.is_primitive()
        )
    }

    /// Whether the whole value can be decoded from one string.
    pub fn is_textual(&self) -> bool {
        self.is_primitive() || self.is_primitive_sequence() || self.is_primitive_map()
    }

    /// Whether a value of this shape can be the root of a load.
    pub fn is_root(&self) -> bool {
        matches!(
            self.indirect(),
            Shape::Struct { .. } | Shape::KeyedCollection { .. }
        )
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Primitive(kind) => write!(f, "{kind}"),
            Shape::Optional(inner) => write!(f, "Option<{inner}>"),
            Shape::Sequence(element) => write!(f, "Vec<{element}>"),
            Shape::KeyedCollection { key, value } => write!(f, "Map<{key}, {value}>"),
            Shape::Struct { name, .. } => write!(f, "struct {name}"),
        }
    }
}

/// Types whose values can be populated from environment variables.
///
/// Implemented for scalars, `Option`, `Box`, `Vec`, `HashMap` and `BTreeMap`, and
/// derived for structs with `#[derive(EnvBind)]`.
///
/// # Manual Implementation Example
///
/// ```rust
/// use env_bind::{EnvBind, FieldShape, Leaf, Shape, Walker};
///
/// #[derive(Debug, Default)]
/// struct Server {
///     host: String,
///     port: u16,
/// }
///
/// impl EnvBind for Server {
///     fn shape() -> Shape {
///         Shape::Struct {
///             name: "Server",
///             fields: vec![
///                 FieldShape::new("host", String::shape(), false),
///                 FieldShape::new("port", u16::shape(), false),
///             ],
///         }
///     }
///
///     fn analyze(walker: &Walker, emit: &mut dyn FnMut(Leaf<Self>)) {
///         walker.field("host", false, |s: &mut Server| &mut s.host, emit);
///         walker.field("port", false, |s: &mut Server| &mut s.port, emit);
///     }
/// }
/// ```
pub trait EnvBind: Default + 'static {
    /// The structural description of `Self`.
    fn shape() -> Shape;

    /// Emits every leaf reachable below `Self`.
    fn analyze(walker: &Walker, emit: &mut dyn FnMut(Leaf<Self>));

    /// Decodes the whole value from a single string.
    fn assign(target: &mut Self, text: &str, options: &Options) -> Result<(), EnvBindError> {
        let _ = (target, text, options);
        Err(EnvBindError::UnsupportedType(Self::shape().to_string()))
    }

    /// Prefix applied when the caller's options do not set one.
    fn default_prefix() -> Option<&'static str> {
        None
    }
}

impl<T: EnvBind> EnvBind for Option<T> {
    fn shape() -> Shape {
        Shape::Optional(Box::new(T::shape()))
    }

    fn analyze(walker: &Walker, emit: &mut dyn FnMut(Leaf<Self>)) {
        walker.optional(emit);
    }

    fn assign(target: &mut Self, text: &str, options: &Options) -> Result<(), EnvBindError> {
        let mut value = T::default();
        T::assign(&mut value, text, options)?;
        *target = Some(value);
        Ok(())
    }
}

impl<T: EnvBind> EnvBind for Box<T> {
    fn shape() -> Shape {
        T::shape()
    }

    fn analyze(walker: &Walker, emit: &mut dyn FnMut(Leaf<Self>)) {
        walker.boxed(emit);
    }

    fn assign(target: &mut Self, text: &str, options: &Options) -> Result<(), EnvBindError> {
        T::assign(target, text, options)
    }
}

impl<T: EnvBind> EnvBind for Vec<T> {
    fn shape() -> Shape {
        Shape::Sequence(Box::new(T::shape()))
    }

    fn analyze(walker: &Walker, emit: &mut dyn FnMut(Leaf<Self>)) {
        walker.sequence(emit);
    }

    fn assign(target: &mut Self, text: &str, options: &Options) -> Result<(), EnvBindError> {
        if !Self::shape().is_primitive_sequence() {
            return Err(EnvBindError::UnsupportedType(Self::shape().to_string()));
        }
        let elements = text
            .split(options.sequence.element_separator.as_str())
            .map(|token| {
                let mut element = T::default();
                T::assign(&mut element, token.trim(), options)?;
                Ok(element)
            })
            .collect::<Result<Vec<_>, EnvBindError>>()?;
        *target = elements;
        Ok(())
    }
}

fn assign_entries<M: Keyed>(text: &str, options: &Options) -> Result<M, EnvBindError> {
    let mut map = M::default();
    for pair in text.split(options.map.entry_separator.as_str()) {
        let Some((key, value)) = pair.split_once(options.map.key_value_separator.as_str()) else {
            return Err(EnvBindError::parse(
                "map entry",
                pair,
                format!(
                    "missing key-value separator `{}`",
                    options.map.key_value_separator
                ),
            ));
        };

        let mut parsed_key = M::Key::default();
        M::Key::assign(&mut parsed_key, key.trim(), options)?;
        let mut parsed_value = M::Value::default();
        M::Value::assign(&mut parsed_value, value.trim(), options)?;
        map.insert(parsed_key, parsed_value);
    }
    Ok(map)
}

impl<K, V, S> EnvBind for HashMap<K, V, S>
where
    K: EnvBind + Eq + Hash,
    V: EnvBind,
    S: BuildHasher + Default + 'static,
{
    fn shape() -> Shape {
        Shape::KeyedCollection {
            key: Box::new(K::shape()),
            value: Box::new(V::shape()),
        }
    }

    fn analyze(walker: &Walker, emit: &mut dyn FnMut(Leaf<Self>)) {
        walker.keyed(emit);
    }

    fn assign(target: &mut Self, text: &str, options: &Options) -> Result<(), EnvBindError> {
        if !Self::shape().is_primitive_map() {
            return Err(EnvBindError::UnsupportedType(Self::shape().to_string()));
        }
        *target = assign_entries(text, options)?;
        Ok(())
    }
}

impl<K, V> EnvBind for BTreeMap<K, V>
where
    K: EnvBind + Ord,
    V: EnvBind,
{
    fn shape() -> Shape {
        Shape::KeyedCollection {
            key: Box::new(K::shape()),
            value: Box::new(V::shape()),
        }
    }

    fn analyze(walker: &Walker, emit: &mut dyn FnMut(Leaf<Self>)) {
        walker.keyed(emit);
    }

    fn assign(target: &mut Self, text: &str, options: &Options) -> Result<(), EnvBindError> {
        if !Self::shape().is_primitive_map() {
            return Err(EnvBindError::UnsupportedType(Self::shape().to_string()));
        }
        *target = assign_entries(text, options)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Debug, Default)]
    struct Opaque;

    impl EnvBind for Opaque {
        fn shape() -> Shape {
            Shape::Struct {
                name: "Opaque",
                fields: Vec::new(),
            }
        }

        fn analyze(_walker: &Walker, _emit: &mut dyn FnMut(Leaf<Self>)) {}
    }

    #[test]
    fn container_shapes_nest() {
        assert_eq!(
            <Option<Vec<HashMap<String, u8>>>>::shape().to_string(),
            "Option<Vec<Map<string, u8>>>"
        );
        assert_eq!(<Box<u16>>::shape(), Shape::Primitive(Kind::U16));
    }

    #[test]
    fn textual_shapes() {
        assert!(<Option<bool>>::shape().is_textual());
        assert!(<Vec<Option<String>>>::shape().is_primitive_sequence());
        assert!(<Option<BTreeMap<String, f64>>>::shape().is_primitive_map());
        assert!(!<Vec<Opaque>>::shape().is_textual());
        assert!(!<HashMap<String, Vec<String>>>::shape().is_textual());
    }

    #[test]
    fn roots_are_structs_or_maps() {
        assert!(Opaque::shape().is_root());
        assert!(<HashMap<String, String>>::shape().is_root());
        assert!(!<Vec<String>>::shape().is_root());
        assert!(!String::shape().is_root());
    }

    #[test]
    fn sequence_single_string_form_trims_elements() {
        let mut items: Vec<u32> = vec![9];
        Vec::assign(&mut items, "1, 2,3 ", &Options::default()).unwrap();
        assert_eq!(items, vec![1, 2, 3]);
    }

    #[test]
    fn map_single_string_form() {
        let mut map: BTreeMap<String, String> = BTreeMap::new();
        BTreeMap::assign(&mut map, "first:a, second: b", &Options::default()).unwrap();
        assert_eq!(
            map,
            BTreeMap::from([
                ("first".to_string(), "a".to_string()),
                ("second".to_string(), "b".to_string()),
            ])
        );
    }

    #[test]
    fn map_entry_without_separator_fails_and_keeps_target() {
        let mut map = HashMap::from([("kept".to_string(), 1_i32)]);
        let err = HashMap::assign(&mut map, "a:1,b", &Options::default()).unwrap_err();
        assert!(matches!(err, EnvBindError::Parse { kind, text, .. } if kind == "map entry" && text == "b"));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn structs_have_no_single_string_form() {
        let err = Opaque::assign(&mut Opaque, "x", &Options::default()).unwrap_err();
        assert!(matches!(err, EnvBindError::UnsupportedType(shape) if shape == "struct Opaque"));
    }
}
