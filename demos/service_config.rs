use std::collections::HashMap;

use env_bind::{Bindings, EnvBind, Options, load_with};

fn main() -> Result<(), env_bind::EnvBindError> {
    // Set some environment variables for demonstration
    //
    // # Safety
    // This example cannot run in parallel with other programs that set/remove ENV variables
    unsafe {
        std::env::set_var("SERVICE_NAME", "billing");
        std::env::set_var("SERVICE_LISTEN_PORT", "9000");
        std::env::set_var("SERVICE_DATABASE_HOST", "db.internal");
        std::env::set_var("SERVICE_DATABASE_PORT", "5432");
        std::env::set_var("SERVICE_REPLICAS_0_HOST", "replica-a");
        std::env::set_var("SERVICE_REPLICAS_1_HOST", "replica-b");
        std::env::set_var("SERVICE_REPLICAS_1_PORT", "5433");
        std::env::set_var("SERVICE_LIMITS", "uploads:10, exports:2");
        std::env::set_var("SERVICE_LIMITS_REPORTS", "5");
        std::env::set_var("SERVICE_DEBUG", "T");
    }

    let mut config = ServiceConfig {
        listen: Listen {
            host: "0.0.0.0".to_string(),
            port: 8080,
        },
        ..Default::default()
    };

    let options = Options::default();
    for name in Bindings::<ServiceConfig>::collect(&options)?.literals() {
        println!("variable: {name}");
    }

    load_with(&mut config, &options)?;
    println!("Config: {:#?}", config);

    assert_eq!(config.listen.host, "0.0.0.0");
    assert_eq!(config.listen.port, 9000);
    assert_eq!(config.replicas.len(), 2);
    assert_eq!(config.replicas[1].port, 5433);
    assert_eq!(config.limits["REPORTS"], 5);
    assert!(config.debug);
    assert_eq!(config.name, "billing");
    assert_eq!(config.database.map(|db| db.port), Some(5432));
    assert!(config.started_at.is_none());
    Ok(())
}

#[derive(Debug, Default, EnvBind)]
struct Endpoint {
    host: String,
    port: u16,
}

#[derive(Debug, Default, EnvBind)]
struct Listen {
    host: String,
    port: u16,
}

#[derive(Debug, Default, EnvBind)]
#[env_bind(prefix = "service")]
struct ServiceConfig {
    name: String,                  // -> SERVICE_NAME
    listen: Listen,                // -> SERVICE_LISTEN_HOST, SERVICE_LISTEN_PORT
    database: Option<Endpoint>,    // -> SERVICE_DATABASE_HOST, ... (allocated on first write)
    replicas: Vec<Endpoint>,       // -> SERVICE_REPLICAS_<N>_HOST, SERVICE_REPLICAS_<N>_PORT
    limits: HashMap<String, u32>,  // -> SERVICE_LIMITS="k:v,..." or SERVICE_LIMITS_<KEY>
    debug: bool,                   // -> SERVICE_DEBUG
    #[env_bind(skip)]
    started_at: Option<u64>,       // never bound
}
