//! Router tests against an in-memory SQLite store.

use std::sync::Arc;

use axum::{
  Router,
  body::Body,
  http::{Request, StatusCode},
};
use chrono::{DateTime, Utc};
use kennel_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tower::ServiceExt as _;
use uuid::Uuid;

use crate::{ApiConfig, api_router, caller::CALLER_HEADER};

async fn app(config: ApiConfig) -> Router {
  let store = SqliteStore::open_in_memory().await.expect("in-memory store");
  api_router(Arc::new(store), config)
}

async fn send(
  app: &Router,
  method: &str,
  uri: &str,
  caller: Option<Uuid>,
  body: Option<Value>,
) -> (StatusCode, Value) {
  let mut builder = Request::builder().method(method).uri(uri);
  if let Some(caller) = caller {
    builder = builder.header(CALLER_HEADER, caller.to_string());
  }
  let body = match body {
    Some(json) => {
      builder = builder.header("content-type", "application/json");
      Body::from(json.to_string())
    }
    None => Body::empty(),
  };

  let resp = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let json = if bytes.is_empty() {
    Value::Null
  } else {
    serde_json::from_slice(&bytes).unwrap()
  };
  (status, json)
}

async fn register(app: &Router, email: &str) -> Uuid {
  let (status, body) = send(
    app,
    "POST",
    "/users",
    None,
    Some(json!({ "email": email, "display_name": "Someone" })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED, "{body}");
  id_of(&body, "user_id")
}

async fn create_dog(app: &Router, owner: Uuid, name: &str) -> Uuid {
  let (status, body) =
    send(app, "POST", "/dogs", Some(owner), Some(json!({ "name": name }))).await;
  assert_eq!(status, StatusCode::CREATED, "{body}");
  id_of(&body, "dog_id")
}

fn id_of(body: &Value, field: &str) -> Uuid {
  body[field].as_str().and_then(|s| s.parse().ok()).expect("uuid field")
}

// ─── Users ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn register_and_fetch_user() {
  let app = app(ApiConfig::default()).await;
  let alice = register(&app, " Alice@Example.com ").await;

  let (status, body) = send(&app, "GET", &format!("/users/{alice}"), Some(alice), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["email"], "alice@example.com");

  let (status, _) = send(
    &app,
    "POST",
    "/users",
    None,
    Some(json!({ "email": "alice@example.com", "display_name": "Again" })),
  )
  .await;
  assert_eq!(status, StatusCode::CONFLICT);

  let (status, _) = send(
    &app,
    "POST",
    "/users",
    None,
    Some(json!({ "email": "not-an-email", "display_name": "Nope" })),
  )
  .await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn missing_or_malformed_caller_is_unauthorized() {
  let app = app(ApiConfig::default()).await;

  let (status, body) = send(&app, "GET", "/dogs", None, None).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
  assert!(body["error"].as_str().unwrap().contains("x-user-id"));

  let req = Request::builder()
    .uri("/dogs")
    .header(CALLER_HEADER, "not-a-uuid")
    .body(Body::empty())
    .unwrap();
  let resp = app.oneshot(req).await.unwrap();
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn malformed_input_gets_json_error_body() {
  let app = app(ApiConfig::default()).await;
  let owner = register(&app, "owner@example.com").await;
  let dog = create_dog(&app, owner, "Rex").await;

  async fn raw(
    app: &Router,
    uri: &str,
    caller: Uuid,
    content_type: Option<&str>,
    body: &str,
  ) -> (StatusCode, Value) {
    let mut builder = Request::builder()
      .method("POST")
      .uri(uri)
      .header(CALLER_HEADER, caller.to_string());
    if let Some(content_type) = content_type {
      builder = builder.header("content-type", content_type);
    }
    let req = builder.body(Body::from(body.to_owned())).unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
  }

  let (status, body) =
    raw(&app, "/dogs", owner, Some("application/json"), "{\"name\": ").await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].is_string(), "{body}");

  let (status, body) =
    raw(&app, "/dogs", owner, Some("application/json"), "{\"name\": 5}").await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
  assert!(body["error"].is_string(), "{body}");

  let (status, body) = raw(&app, "/dogs", owner, None, "{\"name\": \"Rex\"}").await;
  assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
  assert!(body["error"].is_string(), "{body}");

  let (status, body) =
    send(&app, "GET", &format!("/dogs/{dog}/activity?limit=abc"), Some(owner), None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].is_string(), "{body}");

  let (status, body) = send(&app, "GET", "/dogs/not-a-uuid", Some(owner), None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].is_string(), "{body}");
}

// ─── Dogs ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn dog_profile_lifecycle() {
  let app = app(ApiConfig::default()).await;
  let owner = register(&app, "owner@example.com").await;
  let dog = create_dog(&app, owner, "Biscuit").await;

  let (status, body) = send(
    &app,
    "PATCH",
    &format!("/dogs/{dog}"),
    Some(owner),
    Some(json!({ "breed": "Beagle", "birth_date": "2020-02-29" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK, "{body}");
  assert_eq!(body["breed"], "Beagle");
  assert_eq!(body["birth_date"], "2020-02-29");

  let (_, body) = send(
    &app,
    "PATCH",
    &format!("/dogs/{dog}"),
    Some(owner),
    Some(json!({ "breed": null })),
  )
  .await;
  assert_eq!(body["breed"], Value::Null);
  assert_eq!(body["birth_date"], "2020-02-29");

  let (status, body) = send(&app, "GET", "/dogs", Some(owner), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body.as_array().unwrap().len(), 1);

  let (status, _) = send(
    &app,
    "POST",
    "/dogs",
    Some(owner),
    Some(json!({ "name": "   " })),
  )
  .await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn unknown_dog_is_not_found() {
  let app = app(ApiConfig::default()).await;
  let alice = register(&app, "alice@example.com").await;

  let (status, _) = send(&app, "GET", &format!("/dogs/{}", Uuid::new_v4()), Some(alice), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn permission_reports_effective_role() {
  let app = app(ApiConfig::default()).await;
  let owner = register(&app, "owner@example.com").await;
  let editor = register(&app, "editor@example.com").await;
  let dog = create_dog(&app, owner, "Rex").await;
  send(
    &app,
    "POST",
    &format!("/dogs/{dog}/collaborators"),
    Some(owner),
    Some(json!({ "user": "editor@example.com", "role": "editor" })),
  )
  .await;

  let (status, body) =
    send(&app, "GET", &format!("/dogs/{dog}/permission"), Some(owner), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["role"], "owner");
  assert_eq!(body["required"], "viewer");

  let (status, body) =
    send(&app, "GET", &format!("/dogs/{dog}/permission?role=editor"), Some(editor), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["role"], "editor");

  let (status, _) =
    send(&app, "GET", &format!("/dogs/{dog}/permission?role=owner"), Some(editor), None).await;
  assert_eq!(status, StatusCode::FORBIDDEN);
}

// ─── Collaborators ───────────────────────────────────────────────────────────

#[tokio::test]
async fn collaborator_management_is_owner_only() {
  let app = app(ApiConfig::default()).await;
  let owner = register(&app, "owner@example.com").await;
  let editor = register(&app, "editor@example.com").await;
  let carol = register(&app, "carol@example.com").await;
  let dog = create_dog(&app, owner, "Rex").await;
  let collaborators = format!("/dogs/{dog}/collaborators");

  let (status, body) = send(
    &app,
    "POST",
    &collaborators,
    Some(owner),
    Some(json!({ "user": editor, "role": "editor" })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED, "{body}");
  assert_eq!(body["collaborators"].as_array().unwrap().len(), 1);

  // Editors cannot add others.
  let (status, _) = send(
    &app,
    "POST",
    &collaborators,
    Some(editor),
    Some(json!({ "user": carol, "role": "viewer" })),
  )
  .await;
  assert_eq!(status, StatusCode::FORBIDDEN);

  let (status, _) = send(
    &app,
    "POST",
    &collaborators,
    Some(owner),
    Some(json!({ "user": editor, "role": "viewer" })),
  )
  .await;
  assert_eq!(status, StatusCode::CONFLICT);

  let (status, _) = send(
    &app,
    "POST",
    &collaborators,
    Some(owner),
    Some(json!({ "user": owner, "role": "viewer" })),
  )
  .await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

  let (status, _) = send(
    &app,
    "POST",
    &collaborators,
    Some(owner),
    Some(json!({ "user": "nobody@example.com", "role": "viewer" })),
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);

  let (status, body) = send(
    &app,
    "PUT",
    &format!("{collaborators}/{editor}"),
    Some(owner),
    Some(json!({ "role": "viewer" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["collaborators"][0]["role"], "viewer");

  let (status, _) = send(&app, "DELETE", &format!("{collaborators}/{carol}"), Some(owner), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);

  let (status, body) =
    send(&app, "DELETE", &format!("{collaborators}/{editor}"), Some(owner), None).await;
  assert_eq!(status, StatusCode::OK);
  assert!(body["collaborators"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn hidden_existence_masks_forbidden() {
  let app = app(ApiConfig { hide_existence: true, ..ApiConfig::default() }).await;
  let owner = register(&app, "owner@example.com").await;
  let stranger = register(&app, "stranger@example.com").await;
  let dog = create_dog(&app, owner, "Rex").await;

  let (status, _) = send(&app, "GET", &format!("/dogs/{dog}"), Some(stranger), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  let (status, _) = send(&app, "GET", &format!("/dogs/{dog}/activity"), Some(stranger), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);

  // A viewer already knows the dog exists; insufficient rank stays 403.
  let viewer = register(&app, "viewer@example.com").await;
  let (status, body) = send(
    &app,
    "POST",
    &format!("/dogs/{dog}/collaborators"),
    Some(owner),
    Some(json!({ "user": "viewer@example.com", "role": "viewer" })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED, "{body}");

  let (status, _) = send(&app, "GET", &format!("/dogs/{dog}"), Some(viewer), None).await;
  assert_eq!(status, StatusCode::OK);
  let (status, body) = send(
    &app,
    "PATCH",
    &format!("/dogs/{dog}"),
    Some(viewer),
    Some(json!({ "name": "Max" })),
  )
  .await;
  assert_eq!(status, StatusCode::FORBIDDEN, "{body}");
  let (status, _) = send(
    &app,
    "PATCH",
    &format!("/dogs/{dog}"),
    Some(stranger),
    Some(json!({ "name": "Max" })),
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

// ─── Records and activity ────────────────────────────────────────────────────

#[tokio::test]
async fn viewers_read_records_but_cannot_write() {
  let app = app(ApiConfig::default()).await;
  let owner = register(&app, "owner@example.com").await;
  let viewer = register(&app, "viewer@example.com").await;
  let dog = create_dog(&app, owner, "Rex").await;
  send(
    &app,
    "POST",
    &format!("/dogs/{dog}/collaborators"),
    Some(owner),
    Some(json!({ "user": viewer, "role": "viewer" })),
  )
  .await;

  let (status, body) = send(
    &app,
    "POST",
    &format!("/dogs/{dog}/weights"),
    Some(owner),
    Some(json!({ "weight_kg": 12.5 })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED, "{body}");
  assert_eq!(body["created_by"], owner.to_string());

  let (status, _) = send(
    &app,
    "POST",
    &format!("/dogs/{dog}/weights"),
    Some(viewer),
    Some(json!({ "weight_kg": 13.0 })),
  )
  .await;
  assert_eq!(status, StatusCode::FORBIDDEN);

  let (status, _) = send(
    &app,
    "POST",
    &format!("/dogs/{dog}/weights"),
    Some(owner),
    Some(json!({ "weight_kg": -1.0 })),
  )
  .await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

  let (status, body) = send(&app, "GET", &format!("/dogs/{dog}/weights"), Some(viewer), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body.as_array().unwrap().len(), 1);
  assert_eq!(body[0]["weight_kg"], 12.5);
}

#[tokio::test]
async fn activity_feed_merges_all_kinds() {
  let app = app(ApiConfig::default()).await;
  let owner = register(&app, "owner@example.com").await;
  let dog = create_dog(&app, owner, "Rex").await;

  let drafts = [
    ("potty", json!({ "kind": "pee" })),
    ("tasks", json!({ "title": "Walk" })),
    ("vaccines", json!({ "vaccine": "Rabies", "administered_on": "2024-05-01" })),
    ("weights", json!({ "weight_kg": 20.0 })),
  ];
  for _ in 0..4 {
    for (path, draft) in &drafts {
      let (status, body) = send(
        &app,
        "POST",
        &format!("/dogs/{dog}/{path}"),
        Some(owner),
        Some(draft.clone()),
      )
      .await;
      assert_eq!(status, StatusCode::CREATED, "{path}: {body}");
    }
  }

  let (status, body) = send(&app, "GET", &format!("/dogs/{dog}/activity"), Some(owner), None).await;
  assert_eq!(status, StatusCode::OK);
  let items = body.as_array().unwrap();
  assert_eq!(items.len(), 12);
  for kind in ["PottyRecord", "TaskRecord", "VaccineRecord", "WeightRecord"] {
    assert_eq!(items.iter().filter(|i| i["kind"] == kind).count(), 3, "{kind}");
  }
  let stamps: Vec<DateTime<Utc>> = items
    .iter()
    .map(|i| i["timestamp"].as_str().unwrap().parse().unwrap())
    .collect();
  assert!(stamps.windows(2).all(|w| w[0] >= w[1]), "{stamps:?}");

  let (_, body) =
    send(&app, "GET", &format!("/dogs/{dog}/activity?limit=1"), Some(owner), None).await;
  assert_eq!(body.as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn viewer_lifecycle_over_http() {
  let app = app(ApiConfig::default()).await;
  let owner = register(&app, "owner@example.com").await;
  let viewer = register(&app, "viewer@example.com").await;
  let dog = create_dog(&app, owner, "Rex").await;
  send(
    &app,
    "POST",
    &format!("/dogs/{dog}/potty"),
    Some(owner),
    Some(json!({ "kind": "both", "location": "park" })),
  )
  .await;

  let (status, _) = send(
    &app,
    "POST",
    &format!("/dogs/{dog}/collaborators"),
    Some(owner),
    Some(json!({ "user": "viewer@example.com", "role": "viewer" })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);

  let feed = format!("/dogs/{dog}/activity");
  let (status, body) = send(&app, "GET", &feed, Some(viewer), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body[0]["payload"]["location"], "park");

  let (status, _) = send(
    &app,
    "DELETE",
    &format!("/dogs/{dog}/collaborators/{viewer}"),
    Some(viewer),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::FORBIDDEN);

  let (status, _) = send(
    &app,
    "DELETE",
    &format!("/dogs/{dog}/collaborators/{viewer}"),
    Some(owner),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::OK);

  let (status, _) = send(&app, "GET", &feed, Some(viewer), None).await;
  assert_eq!(status, StatusCode::FORBIDDEN);
}
