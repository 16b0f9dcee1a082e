//! Mock backend helpers for integration tests.

#![allow(dead_code)]

use std::time::Duration;

use byte_core::backend::BackendClient;
use byte_core::config::EndpointsConfig;
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub fn can_bind_localhost() -> bool {
    std::net::TcpListener::bind("127.0.0.1:0").is_ok()
}

pub fn client_for(server: &MockServer) -> BackendClient {
    BackendClient::new(server.uri(), EndpointsConfig::default())
}

/// posts [1, 2]
pub fn posts_body() -> Value {
    json!({
        "updates": [
            {
                "id": 1,
                "title": "Faster kernels",
                "description": "A look at the new scheduler",
                "image_url": "https://img.example/1.png",
                "link": "https://blog.example/1",
                "source": "Kernel Weekly",
                "published": "2025-02-01T09:00:00Z"
            },
            {
                "id": 2,
                "title": "Shipping Rust",
                "description": "Notes from production",
                "link": "https://blog.example/2",
                "published": "2025-02-02T09:00:00Z"
            }
        ]
    })
}

/// events [1, 5]; id 1 collides with a post id on purpose.
pub fn events_body() -> Value {
    json!({
        "events": [
            {
                "id": 1,
                "event_name": "Brown bag: async Rust",
                "presenter": "Ada",
                "event_type": "Talk",
                "date_time": "2025-03-01T12:00:00Z",
                "invite_location": "Room 4",
                "invite_link": "https://meet.example/1",
                "description": "Lunch talk"
            },
            {
                "id": 5,
                "event_name": "Hack day",
                "event_type": "Workshop",
                "date_time": "2025-03-08T09:00:00Z"
            }
        ]
    })
}

/// Two external events, the first without an id.
pub fn external_events_body() -> Value {
    json!({
        "external_events": [
            { "title": "RustConf", "link": "https://rustconf.example", "location": "Online" },
            { "id": 1, "title": "Local meetup", "date": "2025-04-01" }
        ]
    })
}

pub fn json_response(body: &Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(body)
}

pub async fn mount_get(server: &MockServer, route: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(response)
        .mount(server)
        .await;
}

/// Mounts all three feeds with the given per-feed delays.
pub async fn mount_feeds(server: &MockServer, delays: [Duration; 3]) {
    mount_get(
        server,
        "/rss-updates",
        json_response(&posts_body()).set_delay(delays[0]),
    )
    .await;
    mount_get(
        server,
        "/events",
        json_response(&events_body()).set_delay(delays[1]),
    )
    .await;
    mount_get(
        server,
        "/external-events",
        json_response(&external_events_body()).set_delay(delays[2]),
    )
    .await;
}
