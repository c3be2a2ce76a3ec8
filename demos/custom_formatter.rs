use std::collections::BTreeMap;

use env_bind::{Bindings, EnvBind, FormatBuilder, Formatter, Options, load_from};

fn main() -> Result<(), env_bind::EnvBindError> {
    // Accept both `APP_CACHE_TTL_SECS` and `app.cache.ttlSecs`
    let dotted = FormatBuilder::original_names().trim_space().join_with(".");
    // ...and `app-cache-ttlsecs`, from raw split/join functions
    let kebab = Formatter::new(
        |name: &str| name.split('_').map(str::to_lowercase).collect(),
        |tokens: Vec<String>| tokens.join("-"),
    );

    let options = Options::default()
        .with_prefix("app")
        .with_formatter(dotted)
        .with_formatter(kebab);

    let bindings = Bindings::<AppConfig>::collect(&options)?;
    for name in bindings.literals() {
        println!("literal: {name}");
    }
    for pattern in bindings.patterns() {
        println!("pattern: {pattern}");
    }

    let env = BTreeMap::from([
        ("app.cache.ttlSecs".to_string(), "60".to_string()),
        ("app-cache-ttlsecs".to_string(), "90".to_string()),
        ("APP_FEATURES_1".to_string(), "beta".to_string()),
    ]);

    let mut config = AppConfig::default();
    bindings.apply(&mut config, &env)?;
    println!("Config: {:#?}", config);

    // literal variables apply in derivation order; the last formatter wins
    assert_eq!(config.cache.ttlSecs, 90);
    assert_eq!(config.features, vec!["", "beta"]);

    // the same bindings can be reused
    let mut other = AppConfig::default();
    bindings.apply(&mut other, &env)?;

    // load_from collects a fresh set with the same options
    let mut fresh = AppConfig::default();
    load_from(&mut fresh, &options, &env)?;
    assert_eq!(fresh.features, other.features);
    assert_eq!(other.cache.ttlSecs, config.cache.ttlSecs);
    Ok(())
}

#[allow(non_snake_case)]
#[derive(Debug, Default, EnvBind)]
struct Cache {
    ttlSecs: u64,
}

#[derive(Debug, Default, EnvBind)]
struct AppConfig {
    cache: Cache,
    features: Vec<String>,
}
