//! Recursive traversal of a type's shape into leaves.
//!
//! Each leaf pairs the name fragments leading to it with a setter able to write a
//! parsed value there from the root. Fragments are pushed innermost first; the
//! formatter reverses them.

use std::rc::Rc;

use tracing::debug;

use crate::format::Fragment;
use crate::grow::{self, Keyed};
use crate::{EnvBind, EnvBindError, Options};

/// Writes into a leaf of `T`.
///
/// Arguments are the tokens captured by dynamic fragments, left to right, followed
/// by the variable's value. Each container on the path consumes its token and
/// hands the rest down.
pub type Setter<T> = Rc<dyn Fn(&mut T, &[&str]) -> Result<(), EnvBindError>>;

/// A bindable location below `T`.
pub struct Leaf<T> {
    fragments: Vec<Fragment>,
    setter: Setter<T>,
}

impl<T> Clone for Leaf<T> {
    fn clone(&self) -> Self {
        Leaf {
            fragments: self.fragments.clone(),
            setter: Rc::clone(&self.setter),
        }
    }
}

impl<T> Leaf<T> {
    pub fn new(fragments: Vec<Fragment>, setter: Setter<T>) -> Self {
        Leaf { fragments, setter }
    }

    /// Fragments in accumulation order, innermost first.
    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    pub fn setter(&self) -> &Setter<T> {
        &self.setter
    }

    pub fn set(&self, target: &mut T, tokens: &[&str]) -> Result<(), EnvBindError> {
        (self.setter)(target, tokens)
    }

    /// Adds `fragment` as the new outermost segment.
    pub(crate) fn within(mut self, fragment: Fragment) -> Self {
        self.fragments.push(fragment);
        self
    }
}

impl<T: 'static> Leaf<T> {
    /// Re-roots the leaf at a parent `P`, keeping the fragments.
    fn lift<P: 'static>(
        self,
        wrap: impl Fn(&Setter<T>, &mut P, &[&str]) -> Result<(), EnvBindError> + 'static,
    ) -> Leaf<P> {
        let inner = self.setter;
        Leaf {
            fragments: self.fragments,
            setter: Rc::new(move |parent: &mut P, tokens: &[&str]| wrap(&inner, parent, tokens)),
        }
    }
}

fn split_first<'a, 't>(tokens: &'a [&'t str]) -> Result<(&'t str, &'a [&'t str]), EnvBindError> {
    match tokens.split_first() {
        Some((first, rest)) => Ok((*first, rest)),
        None => Err(EnvBindError::ShapeMismatch {
            expected: "a captured token or value".to_string(),
            found: "no arguments".to_string(),
        }),
    }
}

/// Drives [`EnvBind::analyze`] implementations.
///
/// Every shape contributes only name fragments and setter closures, so the walker
/// never needs to know the concrete type of the root.
pub struct Walker {
    options: Rc<Options>,
}

impl Walker {
    pub fn new(options: Options) -> Self {
        Walker {
            options: Rc::new(options),
        }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Collects all leaves of `T` in declaration order.
    pub fn analyze<T: EnvBind>(&self) -> Vec<Leaf<T>> {
        let mut leaves = Vec::new();
        T::analyze(self, &mut |leaf: Leaf<T>| leaves.push(leaf));
        leaves
    }

    /// Binds the field `name` of a struct `T`, reached through `access`.
    ///
    /// Fields whose whole value decodes from one string (scalars, sequences and maps
    /// of scalars) get a leaf named after the field. The field's own shape is then
    /// walked and each sub-leaf is prefixed with `name`; a `flatten` field also
    /// emits every sub-leaf without the prefix.
    pub fn field<T: 'static, F: EnvBind>(
        &self,
        name: &'static str,
        flatten: bool,
        access: fn(&mut T) -> &mut F,
        emit: &mut dyn FnMut(Leaf<T>),
    ) {
        if F::shape().is_textual() {
            let options = Rc::clone(&self.options);
            let setter: Setter<T> = Rc::new(move |target: &mut T, tokens: &[&str]| {
                let (value, _) = split_first(tokens)?;
                F::assign(access(target), value, &options)
            });
            emit(Leaf::new(vec![Fragment::literal(name)], setter));
        }

        F::analyze(self, &mut |leaf: Leaf<F>| {
            let leaf = leaf.lift(move |set, target: &mut T, tokens| set(access(target), tokens));
            if flatten {
                emit(leaf.clone());
            }
            emit(leaf.within(Fragment::literal(name)));
        });
    }

    /// Walks `T` behind an `Option`, allocating it on first write.
    pub fn optional<T: EnvBind>(&self, emit: &mut dyn FnMut(Leaf<Option<T>>)) {
        T::analyze(self, &mut |leaf: Leaf<T>| {
            emit(leaf.lift(|set, target: &mut Option<T>, tokens| {
                grow::write_optional(target, |inner| set(inner, tokens))
            }));
        });
    }

    pub fn boxed<T: EnvBind>(&self, emit: &mut dyn FnMut(Leaf<Box<T>>)) {
        T::analyze(self, &mut |leaf: Leaf<T>| {
            emit(leaf.lift(|set, target: &mut Box<T>, tokens| set(&mut **target, tokens)));
        });
    }

    /// Walks the elements of a `Vec<T>` behind an index pattern.
    pub fn sequence<T: EnvBind>(&self, emit: &mut dyn FnMut(Leaf<Vec<T>>)) {
        let index = Fragment::dynamic(self.options.sequence.index_pattern.clone());
        for leaf in self.elements::<T>() {
            let options = Rc::clone(&self.options);
            let leaf = leaf.lift(move |set, target: &mut Vec<T>, tokens| {
                let (index, rest) = split_first(tokens)?;
                let position = options.sequence.position(index)?;
                grow::write_element(target, position, options.sequence.base_capacity, |element| {
                    set(element, rest)
                })
            });
            emit(leaf.within(index.clone()));
        }
    }

    /// Walks the values of a keyed collection behind a key pattern.
    ///
    /// Collections with non-primitive keys yield no leaves.
    pub fn keyed<M: Keyed>(&self, emit: &mut dyn FnMut(Leaf<M>)) {
        let key_shape = M::Key::shape();
        if !key_shape.is_primitive() {
            debug!(key = %key_shape, "skipping map with non-primitive keys");
            return;
        }

        let key = Fragment::dynamic(self.options.map.key_pattern.clone());
        for leaf in self.elements::<M::Value>() {
            let options = Rc::clone(&self.options);
            let leaf = leaf.lift(move |set, target: &mut M, tokens| {
                let (token, rest) = split_first(tokens)?;
                let mut key = M::Key::default();
                <M::Key as EnvBind>::assign(&mut key, token, &options)?;
                grow::write_entry(target, key, |value| set(value, rest))
            });
            emit(leaf.within(key.clone()));
        }
    }

    // Primitive elements are a single terminal leaf; structured ones are walked.
    fn elements<T: EnvBind>(&self) -> Vec<Leaf<T>> {
        if T::shape().is_primitive() {
            let options = Rc::clone(&self.options);
            let setter: Setter<T> = Rc::new(move |target: &mut T, tokens: &[&str]| {
                let (value, _) = split_first(tokens)?;
                T::assign(target, value, &options)
            });
            return vec![Leaf::new(Vec::new(), setter)];
        }
        self.analyze::<T>()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, HashMap};

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{FieldShape, Formatter, Shape};

    #[derive(Debug, Default, PartialEq)]
    struct Child {
        test_field: String,
    }

    impl EnvBind for Child {
        fn shape() -> Shape {
            Shape::Struct {
                name: "Child",
                fields: vec![FieldShape::new("test_field", String::shape(), false)],
            }
        }

        fn analyze(walker: &Walker, emit: &mut dyn FnMut(Leaf<Self>)) {
            walker.field("test_field", false, |c: &mut Child| &mut c.test_field, emit);
        }
    }

    #[derive(Debug, Default, PartialEq)]
    struct Parent {
        child: Child,
        embedded: Child,
        slice_field: Vec<Child>,
        map_field: HashMap<String, String>,
        ids: BTreeMap<Vec<u8>, String>,
    }

    impl EnvBind for Parent {
        fn shape() -> Shape {
            Shape::Struct {
                name: "Parent",
                fields: Vec::new(),
            }
        }

        fn analyze(walker: &Walker, emit: &mut dyn FnMut(Leaf<Self>)) {
            walker.field("child", false, |p: &mut Parent| &mut p.child, emit);
            walker.field("embedded", true, |p: &mut Parent| &mut p.embedded, emit);
            walker.field("slice_field", false, |p: &mut Parent| &mut p.slice_field, emit);
            walker.field("map_field", false, |p: &mut Parent| &mut p.map_field, emit);
            walker.field("ids", false, |p: &mut Parent| &mut p.ids, emit);
        }
    }

    fn names<T: EnvBind>() -> Vec<String> {
        let formatter = Formatter::default();
        Walker::new(Options::default())
            .analyze::<T>()
            .iter()
            .map(|leaf| formatter.format(leaf.fragments()).0)
            .collect()
    }

    #[test]
    fn leaves_follow_declaration_order() {
        assert_eq!(
            names::<Parent>(),
            vec![
                "CHILD_TEST_FIELD",
                "TEST_FIELD",
                "EMBEDDED_TEST_FIELD",
                "SLICE_FIELD_([0-9]+)_TEST_FIELD",
                "MAP_FIELD",
                "MAP_FIELD_(.+)",
            ]
        );
    }

    #[test]
    fn setters_consume_tokens_outermost_first() {
        let leaves = Walker::new(Options::default()).analyze::<Parent>();
        let mut parent = Parent::default();

        leaves[3].set(&mut parent, &["2", "deep"]).unwrap();
        leaves[5].set(&mut parent, &["MAP_KEY", "value"]).unwrap();
        leaves[1].set(&mut parent, &["flat"]).unwrap();

        assert_eq!(parent.slice_field.len(), 3);
        assert_eq!(parent.slice_field[2].test_field, "deep");
        assert_eq!(parent.map_field["MAP_KEY"], "value");
        assert_eq!(parent.embedded.test_field, "flat");
    }

    #[test]
    fn optional_struct_is_allocated_on_write() {
        let leaves = Walker::new(Options::default()).analyze::<Option<Child>>();
        let mut target: Option<Child> = None;
        leaves[0].set(&mut target, &["value"]).unwrap();
        assert_eq!(
            target,
            Some(Child {
                test_field: "value".into()
            })
        );
    }

    #[test]
    fn missing_tokens_are_a_shape_mismatch() {
        let leaves = Walker::new(Options::default()).analyze::<Parent>();
        let err = leaves[3].set(&mut Parent::default(), &[]).unwrap_err();
        assert!(matches!(err, EnvBindError::ShapeMismatch { .. }));
    }

    #[test]
    fn bad_index_leaves_sequence_untouched() {
        let leaves = Walker::new(Options::default()).analyze::<Parent>();
        let mut parent = Parent::default();
        assert!(leaves[3].set(&mut parent, &["x", "deep"]).is_err());
        assert!(parent.slice_field.is_empty());
    }
}
