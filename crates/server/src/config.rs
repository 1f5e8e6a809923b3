//! `booking-server`'s own config slice: bind address and the URLs of the
//! two HTTP collaborators (NLU provider, execution backend) plus the
//! session store backend selection. Same defaults-<-env layering as
//! `booking_config::RuntimeConfigView`, just with a `BOOKING_SERVER_`
//! prefix so the two don't collide.

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub nlu_endpoint: Option<String>,
    pub execution_endpoint: Option<String>,
    pub redis_url: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind_addr: "0.0.0.0:8080".to_string(),
            nlu_endpoint: None,
            execution_endpoint: None,
            redis_url: None,
        }
    }
}

impl ServerConfig {
    pub fn load() -> Self {
        let defaults = ServerConfig::default();
        let builder = config::Config::builder()
            .set_default("bind_addr", defaults.bind_addr.clone())
            .and_then(|b| b.add_source(config::Environment::with_prefix("BOOKING_SERVER")))
            .build();

        match builder {
            Ok(cfg) => ServerConfig {
                bind_addr: cfg.get("bind_addr").unwrap_or(defaults.bind_addr),
                nlu_endpoint: cfg.get("nlu_endpoint").ok(),
                execution_endpoint: cfg.get("execution_endpoint").ok(),
                redis_url: cfg.get("redis_url").ok(),
            },
            Err(err) => {
                tracing::error!(error = %err, "server config load failed, using defaults");
                defaults
            }
        }
    }
}
