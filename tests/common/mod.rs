#![allow(dead_code)]

use std::time::Duration;

use serde_json::{json, Value};
use vsix_queue_lib::AppConfig;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const VSIX_ASSET: &str = "Microsoft.VisualStudio.Services.VSIXPackage";

pub fn config_for(server: &MockServer) -> AppConfig {
    AppConfig {
        marketplace_url: format!("{}/query", server.uri()),
        ..AppConfig::default()
    }
}

pub fn extension_json(server: &MockServer, id: &str, version: &str) -> Value {
    let (publisher, name) = id.split_once('.').unwrap();
    json!({
        "publisher": {
            "publisherName": publisher,
            "displayName": publisher.to_uppercase(),
            "isDomainVerified": true
        },
        "extensionName": name,
        "displayName": name,
        "shortDescription": format!("{} description", name),
        "versions": [{
            "version": version,
            "files": [
                { "assetType": VSIX_ASSET, "source": format!("{}/files/{}-{}.vsix", server.uri(), id, version) },
                { "assetType": "Microsoft.VisualStudio.Services.Icons.Default", "source": "https://cdn.example/icon.png" }
            ]
        }],
        "statistics": [{ "statisticName": "install", "value": 4200.0 }]
    })
}

pub fn envelope(extensions: Vec<Value>) -> Value {
    json!({ "results": [{ "extensions": extensions }] })
}

/// Answer the identifier lookup for `id` with one published version
pub async fn mount_extension(server: &MockServer, id: &str, version: &str) {
    mount_extension_delayed(server, id, version, Duration::ZERO).await;
}

pub async fn mount_extension_delayed(
    server: &MockServer,
    id: &str,
    version: &str,
    delay: Duration,
) {
    Mock::given(method("POST"))
        .and(path("/query"))
        .and(body_partial_json(json!({
            "filters": [{ "criteria": [{ "filterType": 7, "value": id }] }]
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(envelope(vec![extension_json(server, id, version)]))
                .set_delay(delay),
        )
        .mount(server)
        .await;
}

/// Answer the identifier lookup for `id` with no results
pub async fn mount_missing(server: &MockServer, id: &str) {
    Mock::given(method("POST"))
        .and(path("/query"))
        .and(body_partial_json(json!({
            "filters": [{ "criteria": [{ "filterType": 7, "value": id }] }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(vec![])))
        .mount(server)
        .await;
}

pub async fn mount_payload(server: &MockServer, id: &str, version: &str, body: &[u8]) {
    Mock::given(method("GET"))
        .and(path(format!("/files/{}-{}.vsix", id, version)))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.to_vec()))
        .mount(server)
        .await;
}
