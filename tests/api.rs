use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode};
use holocron::data::configuration::{Configuration, SeedPerson, SeedPlanet};
use holocron::data::dbconnector::{DBConnection, SQLConnector};
use holocron::server::{AppContext, router};
use serde_json::{Value, json};
use tower::ServiceExt;

async fn app() -> Router {
    let mut config = Configuration::default();
    for name in ["Tatooine", "Alderaan", "Yavin IV", "Hoth", "Dagobah"] {
        config.seed.planets.push(SeedPlanet {
            name: name.to_string(),
            description: None,
        });
    }
    config.seed.people.push(SeedPerson {
        name: "Luke Skywalker".to_string(),
        description: Some("Farm boy".to_string()),
        eyes_color: Some("blue".to_string()),
        hair_color: Some("blond".to_string()),
    });

    let mut connector = SQLConnector::new("sqlite::memory:");
    connector.connect().await.unwrap();
    connector.initialize(&config).await.unwrap();
    router(AppContext::new(connector.connection().unwrap().clone()))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            request = request.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(request.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn register(app: &Router, email: &str) -> i64 {
    let (status, body) = send(
        app,
        Method::POST,
        "/user",
        Some(json!({"email": email, "password": "secret"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["id"].as_i64().unwrap()
}

#[tokio::test]
async fn favorite_planet_twice_conflicts() {
    let app = app().await;
    let user_id = register(&app, "luke@rebels.org").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/favorites/planet/5",
        Some(json!({"user_id": user_id})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user_id"], json!(user_id));
    assert_eq!(body["planet_id"], json!(5));
    assert_eq!(body["people_id"], Value::Null);
    assert!(body["id"].is_i64());

    let (status, body) = send(
        &app,
        Method::POST,
        "/favorites/planet/5",
        Some(json!({"user_id": user_id})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"message": "This favorite already exists"}));
}

#[tokio::test]
async fn favorite_without_user_id_is_rejected() {
    let app = app().await;

    let (status, body) = send(&app, Method::POST, "/favorites/people/1", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "user_id is required");

    let (status, _) = send(&app, Method::POST, "/favorites/planet/1", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn deleting_missing_favorite_is_not_found() {
    let app = app().await;
    let user_id = register(&app, "leia@rebels.org").await;

    let (status, body) = send(
        &app,
        Method::DELETE,
        "/favorites/people/9",
        Some(json!({"user_id": user_id})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"message": "Favorite people not found"}));
}

#[tokio::test]
async fn deleted_favorite_is_gone() {
    let app = app().await;
    let user_id = register(&app, "han@falcon.space").await;
    let payload = json!({"user_id": user_id});

    let (status, _) = send(&app, Method::POST, "/favorites/people/1", Some(payload.clone())).await;
    assert_eq!(status, StatusCode::OK);

    let uri = format!("/user/favorites?user_id={user_id}");
    let (status, favs) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(favs.as_array().unwrap().len(), 1);

    let (status, body) = send(&app, Method::DELETE, "/favorites/people/1", Some(payload.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].is_string());

    let (status, _) = send(&app, Method::DELETE, "/favorites/people/1", Some(payload)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn user_favorites_requires_a_numeric_user_id() {
    let app = app().await;

    let (status, body) = send(&app, Method::GET, "/user/favorites", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());

    let (status, _) = send(&app, Method::GET, "/user/favorites?user_id=abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn missing_people_and_planets_are_404_with_message() {
    let app = app().await;

    for uri in ["/people/404", "/planet/404"] {
        let (status, body) = send(&app, Method::GET, uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert!(body["message"].is_string(), "{uri}");
    }
}

#[tokio::test]
async fn lists_and_fetches_seeded_records() {
    let app = app().await;

    let (status, planets) = send(&app, Method::GET, "/planet", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(planets.as_array().unwrap().len(), 5);
    assert_eq!(planets[0], json!({"id": 1, "name": "Tatooine", "description": null}));

    let (status, person) = send(&app, Method::GET, "/people/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        person,
        json!({
            "id": 1,
            "name": "Luke Skywalker",
            "description": "Farm boy",
            "eyes_color": "blue",
            "hair_color": "blond"
        })
    );
}

#[tokio::test]
async fn created_person_gets_default_colors() {
    let app = app().await;

    let (status, person) = send(&app, Method::POST, "/people", Some(json!({"name": "Chewbacca"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(person["eyes_color"], "brown");
    assert_eq!(person["hair_color"], "black");

    let (status, body) = send(&app, Method::POST, "/people", Some(json!({"description": "?"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "name is required");
}

#[tokio::test]
async fn users_never_expose_passwords() {
    let app = app().await;
    let user_id = register(&app, "obiwan@jedi.org").await;
    send(&app, Method::POST, "/favorites/planet/1", Some(json!({"user_id": user_id}))).await;

    let (status, users) = send(&app, Method::GET, "/user", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        users,
        json!([{
            "id": user_id,
            "email": "obiwan@jedi.org",
            "favorite": [{"id": 1, "user_id": user_id, "planet_id": 1, "people_id": null}]
        }])
    );
    assert!(!users.to_string().contains("secret"));

    let (status, _) = send(
        &app,
        Method::POST,
        "/user",
        Some(json!({"email": "obiwan@jedi.org", "password": "other"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn deleting_a_planet_returns_it_and_drops_its_favorites() {
    let app = app().await;
    let user_id = register(&app, "lando@cloud.city").await;
    let payload = json!({"user_id": user_id});
    send(&app, Method::POST, "/favorites/planet/4", Some(payload.clone())).await;

    let (status, planet) = send(&app, Method::DELETE, "/planet/4", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(planet["name"], "Hoth");

    let (status, _) = send(&app, Method::GET, "/planet/4", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, Method::DELETE, "/planet/4", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::DELETE, "/favorites/planet/4", Some(payload)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn favorite_for_unknown_planet_is_not_found() {
    let app = app().await;
    let user_id = register(&app, "wedge@rogue.squadron").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/favorites/planet/77",
        Some(json!({"user_id": user_id})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Planet not found");
}

#[tokio::test]
async fn sitemap_lists_endpoints() {
    let app = app().await;

    let (status, body) = send(&app, Method::GET, "/", None).await;
    assert_eq!(status, StatusCode::OK);
    let endpoints = body["endpoints"].as_array().unwrap();
    assert!(endpoints.contains(&json!("POST /favorites/planet/{planet_id}")));
}

#[tokio::test]
async fn non_numeric_path_ids_get_a_json_message() {
    let app = app().await;

    let (status, body) = send(&app, Method::GET, "/people/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"message": "id must be an integer"}));

    let (status, body) = send(
        &app,
        Method::POST,
        "/favorites/planet/abc",
        Some(json!({"user_id": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"message": "id must be an integer"}));

    // Out of range for i32
    let (status, body) = send(&app, Method::DELETE, "/planet/99999999999", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn get_user_includes_favorites() {
    let app = app().await;
    let user_id = register(&app, "mon@mothma.gov").await;
    send(&app, Method::POST, "/favorites/people/1", Some(json!({"user_id": user_id}))).await;

    let (status, user) = send(&app, Method::GET, &format!("/user/{user_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["email"], "mon@mothma.gov");
    assert_eq!(
        user["favorite"],
        json!([{"id": 1, "user_id": user_id, "planet_id": null, "people_id": 1}])
    );
    assert!(user.get("password_hash").is_none());

    let (status, body) = send(&app, Method::GET, "/user/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"message": "User not found"}));
}

#[tokio::test]
async fn created_planet_is_listed() {
    let app = app().await;

    let (status, planet) = send(
        &app,
        Method::POST,
        "/planet",
        Some(json!({"name": "Bespin", "description": "Gas giant"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(planet, json!({"id": 6, "name": "Bespin", "description": "Gas giant"}));

    let (status, fetched) = send(&app, Method::GET, "/planet/6", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, planet);

    let (status, body) = send(&app, Method::POST, "/planet", Some(json!({"description": "?"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "name is required");
}

#[tokio::test]
async fn deleting_a_person_drops_its_favorites() {
    let app = app().await;
    let user_id = register(&app, "biggs@rogue.squadron").await;
    let payload = json!({"user_id": user_id});
    send(&app, Method::POST, "/favorites/people/1", Some(payload.clone())).await;
    send(&app, Method::POST, "/favorites/planet/1", Some(payload.clone())).await;

    let (status, person) = send(&app, Method::DELETE, "/people/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(person["name"], "Luke Skywalker");

    let (status, _) = send(&app, Method::GET, "/people/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, body) = send(&app, Method::DELETE, "/people/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["message"].is_string());

    let (status, favs) = send(&app, Method::GET, &format!("/user/favorites?user_id={user_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        favs,
        json!([{"id": 2, "user_id": user_id, "planet_id": 1, "people_id": null}])
    );
}

#[tokio::test]
async fn deleting_a_user_returns_it_and_drops_its_favorites() {
    let app = app().await;
    let user_id = register(&app, "ackbar@mon.cala").await;
    let payload = json!({"user_id": user_id});
    send(&app, Method::POST, "/favorites/planet/2", Some(payload.clone())).await;
    send(&app, Method::POST, "/favorites/people/1", Some(payload.clone())).await;

    let uri = format!("/user/{user_id}");
    let (status, user) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["email"], "ackbar@mon.cala");
    assert_eq!(user["favorite"].as_array().unwrap().len(), 2);

    let (status, _) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::GET, &format!("/user/favorites?user_id={user_id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, Method::DELETE, "/favorites/planet/2", Some(payload)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
