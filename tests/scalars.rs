// Scalar field tests
use env_bind::{Complex32, Complex64, EnvBind, EnvBindError, Options, load_from};

mod common;

fn load_env<T: EnvBind>(vars: &[(&str, &str)]) -> Result<T, EnvBindError> {
    let mut target = T::default();
    load_from(&mut target, &Options::default(), &common::env(vars))?;
    Ok(target)
}

macro_rules! scalar_field_tests {
    ($($name:ident: $ty:ty = $text:literal => $expected:expr;)*) => {
        $(
            mod $name {
                use super::*;

                #[derive(Debug, Default, EnvBind)]
                struct Plain {
                    test_field: $ty,
                }

                #[derive(Debug, Default, EnvBind)]
                struct Wrapped {
                    test_field: Option<$ty>,
                }

                #[test]
                fn should_parse_field() {
                    let spec: Plain = load_env(&[("TEST_FIELD", $text)]).unwrap();
                    assert_eq!(spec.test_field, $expected);
                }

                #[test]
                fn should_allocate_optional_field() {
                    let spec: Wrapped = load_env(&[("TEST_FIELD", $text)]).unwrap();
                    assert_eq!(spec.test_field, Some($expected));
                }
            }
        )*
    };
}

scalar_field_tests! {
    bool_field: bool = "true" => true;
    string_field: String = "test" => "test".to_string();
    i8_field: i8 = "123" => 123;
    i16_field: i16 = "-123" => -123;
    i32_field: i32 = "123" => 123;
    i64_field: i64 = "123" => 123;
    isize_field: isize = "123" => 123;
    u8_field: u8 = "123" => 123;
    u16_field: u16 = "123" => 123;
    u32_field: u32 = "123" => 123;
    u64_field: u64 = "123" => 123;
    usize_field: usize = "123" => 123;
    f32_field: f32 = "12.3" => 12.3;
    f64_field: f64 = "12.3" => 12.3;
    complex32_field: Complex32 = "1+2i" => Complex32::new(1.0, 2.0);
    complex64_field: Complex64 = "1+2i" => Complex64::new(1.0, 2.0);
}

#[derive(Debug, Default, EnvBind)]
struct TypeVarietyTest {
    string_field: String,
    int_field: i32,
    float_field: f64,
    bool_field: bool,
    optional_int: Option<i32>,
    boxed_port: Box<u16>,
}

#[test]
fn should_parse_every_field_of_a_struct() {
    let config: TypeVarietyTest = load_env(&[
        ("STRING_FIELD", "hello"),
        ("INT_FIELD", "-42"),
        ("FLOAT_FIELD", "2.5"),
        ("BOOL_FIELD", "F"),
        ("OPTIONAL_INT", "7"),
        ("BOXED_PORT", "8080"),
    ])
    .unwrap();

    assert_eq!(config.string_field, "hello");
    assert_eq!(config.int_field, -42);
    assert_eq!(config.float_field, 2.5);
    assert!(!config.bool_field);
    assert_eq!(config.optional_int, Some(7));
    assert_eq!(*config.boxed_port, 8080);
}

#[test]
fn should_leave_unset_fields_at_their_defaults() {
    let config: TypeVarietyTest = load_env(&[("INT_FIELD", "1")]).unwrap();

    assert_eq!(config.int_field, 1);
    assert_eq!(config.string_field, "");
    assert_eq!(config.optional_int, None);
}

#[test]
fn should_keep_caller_supplied_values_when_unset() {
    let mut config = TypeVarietyTest {
        string_field: "preset".into(),
        int_field: 5,
        ..Default::default()
    };
    load_from(
        &mut config,
        &Options::default(),
        &common::env(&[("INT_FIELD", "6")]),
    )
    .unwrap();

    assert_eq!(config.string_field, "preset");
    assert_eq!(config.int_field, 6);
}

#[test]
fn should_fail_on_malformed_value_and_keep_prior_value() {
    let mut config = TypeVarietyTest {
        int_field: 5,
        ..Default::default()
    };
    let err = load_from(
        &mut config,
        &Options::default(),
        &common::env(&[("INT_FIELD", "not_a_number")]),
    )
    .unwrap_err();

    assert_eq!(err.variable(), Some("INT_FIELD"));
    assert!(matches!(err.root(), EnvBindError::Parse { kind, text, .. } if kind == "i32" && text == "not_a_number"));
    assert_eq!(config.int_field, 5);
}

#[test]
fn should_reject_out_of_range_integers() {
    #[derive(Debug, Default, EnvBind)]
    struct Narrow {
        level: u8,
    }

    let err = load_env::<Narrow>(&[("LEVEL", "256")]).unwrap_err();
    assert!(matches!(err.root(), EnvBindError::Parse { kind, .. } if kind == "u8"));
}

#[test]
fn should_not_allocate_optional_on_parse_failure() {
    #[derive(Debug, Default, EnvBind)]
    struct Spec {
        timeout: Option<u64>,
    }

    let mut spec = Spec::default();
    let result = load_from(
        &mut spec,
        &Options::default(),
        &common::env(&[("TIMEOUT", "soon")]),
    );

    assert!(result.is_err());
    assert_eq!(spec.timeout, None);
}
