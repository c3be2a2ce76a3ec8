//! Populate configuration structs from environment variables named after their shape.
//!
//! Every field reachable from the root (through nested structs, `Option`, `Box`,
//! `Vec` and maps) gets one or more variable names derived from the field path.
//! Scalars are parsed according to their type. Map keys and sequence indices
//! become regex captures, so `SERVERS_0_HOST` and `LIMITS_UPLOADS` can populate
//! `servers[0].host` and `limits["UPLOADS"]`.
//!
//! ```rust
//! use std::collections::HashMap;
//!
//! use env_bind::{EnvBind, Options, load_from};
//!
//! #[derive(Debug, Default, EnvBind)]
//! struct Database {
//!     host: String,
//!     port: u16,
//! }
//!
//! #[derive(Debug, Default, EnvBind)]
//! #[env_bind(prefix = "app")]
//! struct AppConfig {
//!     database: Database,              // -> APP_DATABASE_HOST, APP_DATABASE_PORT
//!     replicas: Vec<String>,           // -> APP_REPLICAS="a,b" or APP_REPLICAS_0=a
//!     limits: HashMap<String, u32>,    // -> APP_LIMITS="x:1" or APP_LIMITS_X=1
//!     timeout: Option<u64>,            // -> APP_TIMEOUT
//!     #[env_bind(skip)]
//!     cache: Vec<u8>,                  // never bound
//! }
//!
//! let env = HashMap::from([
//!     ("APP_DATABASE_HOST".to_string(), "db.internal".to_string()),
//!     ("APP_REPLICAS_1".to_string(), "replica-b".to_string()),
//!     ("APP_LIMITS_UPLOADS".to_string(), "10".to_string()),
//! ]);
//!
//! let mut config = AppConfig::default();
//! load_from(&mut config, &Options::default(), &env).unwrap();
//!
//! assert_eq!(config.database.host, "db.internal");
//! assert_eq!(config.replicas, vec!["".to_string(), "replica-b".to_string()]);
//! assert_eq!(config.limits["UPLOADS"], 10);
//! assert_eq!(config.timeout, None);
//! ```
//!
//! Fields without a matching variable keep the value they had before the load.
//! Variables with an empty value are treated as unset.

mod bind;
mod env;
mod error;
mod format;
mod options;
mod scalar;
mod shape;
mod walker;

pub mod grow;

pub use bind::{Bindings, Variable};
pub use env::{Environment, ProcessEnv};
pub use error::EnvBindError;
pub use format::{FormatBuilder, Formatter, Fragment};
pub use num_complex::{Complex32, Complex64};
pub use options::{MapOptions, Options, SequenceOptions};
pub use scalar::{Kind, Scalar, parse};
pub use shape::{EnvBind, FieldShape, Shape};
pub use walker::{Leaf, Setter, Walker};

/// Derive macro for the [`EnvBind`] trait.
///
/// The struct must have named fields and implement `Default`. Every field is bound
/// unless skipped; its type must implement [`EnvBind`].
///
/// **Struct-level attributes:**
/// - **`#[env_bind(prefix = "PREFIX")]`**: Prefix used when the load options set none
/// - **`#[env_bind(prefix)]`**: Use the struct name (in snake_case) as that prefix
///
/// **Field-level attributes:**
/// - **No attribute**: The field name is a path segment (`database.host` -> `DATABASE_HOST`)
/// - **`#[env_bind(rename = "name")]`**: Use `name` as the path segment instead
/// - **`#[env_bind(flatten)]`**: Also bind the field's members without its own segment
/// - **`#[env_bind(skip)]`**: Never bind this field
pub use env_bind_derive::EnvBind;

/// Load `target` from the process environment with default [`Options`].
pub fn load<T: EnvBind>(target: &mut T) -> Result<(), EnvBindError> {
    load_with(target, &Options::default())
}

/// Load `target` from the process environment.
pub fn load_with<T: EnvBind>(target: &mut T, options: &Options) -> Result<(), EnvBindError> {
    load_from(target, options, &ProcessEnv)
}

/// Load `target` from `env`.
///
/// The root must be a struct or a map; other shapes fail with
/// [`EnvBindError::InvalidSpecification`] before anything is written.
pub fn load_from<T, E>(target: &mut T, options: &Options, env: &E) -> Result<(), EnvBindError>
where
    T: EnvBind,
    E: Environment + ?Sized,
{
    let shape = T::shape();
    if !shape.is_root() {
        return Err(EnvBindError::InvalidSpecification(shape.to_string()));
    }
    Bindings::<T>::collect(options)?.apply(target, env)
}

/// Build a `T` from its `Default` and the process environment.
pub fn from_env<T: EnvBind>() -> Result<T, EnvBindError> {
    let mut target = T::default();
    load(&mut target)?;
    Ok(target)
}
