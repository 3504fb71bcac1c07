use secrecy::ExposeSecret;
use serde::Serialize;

use blossom_core::config::{AppConfig, LoadOptions};

#[derive(Debug, Serialize)]
struct EffectiveConfig {
    database_url: String,
    database_max_connections: u32,
    bot_token: &'static str,
    admin_ids: Vec<i64>,
    payment_provider_token: &'static str,
    checkout_url: String,
    bind_address: String,
    health_check_port: u16,
    log_level: String,
}

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("configuration issue: {error}"),
    };

    let effective = EffectiveConfig {
        database_url: config.database.url.clone(),
        database_max_connections: config.database.max_connections,
        bot_token: redact(!config.chat.bot_token.expose_secret().is_empty()),
        admin_ids: config.chat.admin_ids.clone(),
        payment_provider_token: redact(config.payment.provider_token.is_some()),
        checkout_url: config.payment.checkout_url.clone(),
        bind_address: config.server.bind_address.clone(),
        health_check_port: config.server.health_check_port,
        log_level: config.logging.level.clone(),
    };

    serde_json::to_string_pretty(&effective)
        .unwrap_or_else(|error| format!("could not render configuration: {error}"))
}

fn redact(set: bool) -> &'static str {
    if set {
        "<redacted>"
    } else {
        "<unset>"
    }
}

#[cfg(test)]
mod tests {
    use super::redact;

    #[test]
    fn secrets_never_render_their_values() {
        assert_eq!(redact(true), "<redacted>");
        assert_eq!(redact(false), "<unset>");
    }
}
