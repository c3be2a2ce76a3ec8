use std::fmt;
use std::str::FromStr;

use num_complex::{Complex32, Complex64};

use crate::walker::{Leaf, Walker};
use crate::{EnvBind, EnvBindError, Options, Shape};

/// Primitive kinds understood by the scalar codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Bool,
    String,
    I8,
    I16,
    I32,
    I64,
    Isize,
    U8,
    U16,
    U32,
    U64,
    Usize,
    F32,
    F64,
    Complex32,
    Complex64,
}

impl Kind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Bool => "bool",
            Kind::String => "string",
            Kind::I8 => "i8",
            Kind::I16 => "i16",
            Kind::I32 => "i32",
            Kind::I64 => "i64",
            Kind::Isize => "isize",
            Kind::U8 => "u8",
            Kind::U16 => "u16",
            Kind::U32 => "u32",
            Kind::U64 => "u64",
            Kind::Usize => "usize",
            Kind::F32 => "f32",
            Kind::F64 => "f64",
            Kind::Complex32 => "complex32",
            Kind::Complex64 => "complex64",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A primitive value that can be parsed from (and formatted to) environment text.
///
/// Parsing never produces partial values: malformed input fails with
/// [`EnvBindError::Parse`] carrying the kind and the offending text.
pub trait Scalar: Sized + fmt::Display {
    const KIND: Kind;

    fn parse_scalar(text: &str) -> Result<Self, EnvBindError>;

    fn format_scalar(&self) -> String {
        self.to_string()
    }
}

/// Parse `text` as the scalar `S`.
pub fn parse<S: Scalar>(text: &str) -> Result<S, EnvBindError> {
    S::parse_scalar(text)
}

impl Scalar for bool {
    const KIND: Kind = Kind::Bool;

    fn parse_scalar(text: &str) -> Result<Self, EnvBindError> {
        match text {
            "1" | "t" | "T" | "true" | "TRUE" | "True" => Ok(true),
            "0" | "f" | "F" | "false" | "FALSE" | "False" => Ok(false),
            _ => Err(EnvBindError::parse(Self::KIND, text, "invalid syntax")),
        }
    }
}

impl Scalar for String {
    const KIND: Kind = Kind::String;

    fn parse_scalar(text: &str) -> Result<Self, EnvBindError> {
        Ok(text.to_string())
    }
}

fn parse_from_str<T>(kind: Kind, text: &str) -> Result<T, EnvBindError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    text.parse::<T>()
        .map_err(|e| EnvBindError::parse(kind, text, e))
}

macro_rules! from_str_scalar {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl Scalar for $ty {
                const KIND: Kind = Kind::$kind;

                fn parse_scalar(text: &str) -> Result<Self, EnvBindError> {
                    parse_from_str(Self::KIND, text)
                }
            }
        )*
    };
}

from_str_scalar! {
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    isize => Isize,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    usize => Usize,
    f32 => F32,
    f64 => F64,
}

// `a+bi` grammar, optionally wrapped in parentheses.
fn strip_parens(text: &str) -> &str {
    text.strip_prefix('(')
        .and_then(|inner| inner.strip_suffix(')'))
        .unwrap_or(text)
}

impl Scalar for Complex32 {
    const KIND: Kind = Kind::Complex32;

    fn parse_scalar(text: &str) -> Result<Self, EnvBindError> {
        strip_parens(text)
            .parse::<Complex32>()
            .map_err(|e| EnvBindError::parse(Self::KIND, text, e))
    }
}

impl Scalar for Complex64 {
    const KIND: Kind = Kind::Complex64;

    fn parse_scalar(text: &str) -> Result<Self, EnvBindError> {
        strip_parens(text)
            .parse::<Complex64>()
            .map_err(|e| EnvBindError::parse(Self::KIND, text, e))
    }
}

macro_rules! scalar_shape {
    ($($ty:ty),* $(,)?) => {
        $(
            impl EnvBind for $ty {
                fn shape() -> Shape {
                    Shape::Primitive(<$ty as Scalar>::KIND)
                }

                fn analyze(_walker: &Walker, _emit: &mut dyn FnMut(Leaf<Self>)) {}

                fn assign(target: &mut Self, text: &str, _options: &Options) -> Result<(), EnvBindError> {
                    *target = <$ty as Scalar>::parse_scalar(text)?;
                    Ok(())
                }
            }
        )*
    };
}

scalar_shape!(
    bool, String, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64, Complex32,
    Complex64,
);
