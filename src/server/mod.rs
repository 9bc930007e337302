use crate::data::store::RecordStore;
use crate::entity::helpers::{
    create_user as register_user, new_person, new_planet, users_with_favorites,
};
use crate::entity::{favorite, people, planet, user};
use crate::error::{Error, Result};
use crate::favorites::{self, NewFavorite, Target};
use axum::body::Bytes;
use axum::extract::{FromRequestParts, Path, Query};
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use log::{debug, error, info};
use sea_orm::DatabaseConnection;
use serde::de::DeserializeOwned;
use std::sync::Arc;
pub mod types;
use types::{
    CreatePersonRequest, CreatePlanetRequest, CreateUserRequest, FavoriteRequest, FavoritesQuery,
    MessageResponse, SitemapResponse, UserResponse,
};

const ENDPOINTS: &[&str] = &[
    "GET /",
    "GET /user",
    "POST /user",
    "GET /user/{id}",
    "DELETE /user/{id}",
    "GET /user/favorites?user_id=",
    "GET /people",
    "POST /people",
    "GET /people/{id}",
    "DELETE /people/{id}",
    "GET /planet",
    "POST /planet",
    "GET /planet/{id}",
    "DELETE /planet/{id}",
    "POST /favorites/planet/{planet_id}",
    "DELETE /favorites/planet/{planet_id}",
    "POST /favorites/people/{people_id}",
    "DELETE /favorites/people/{people_id}",
];

/// Shared by every handler; the pool is the only process-wide state.
#[derive(Clone)]
pub struct AppContext {
    pub database_connection: Arc<DatabaseConnection>,
}

impl AppContext {
    pub fn new(database_connection: DatabaseConnection) -> Self {
        AppContext {
            database_connection: Arc::new(database_connection),
        }
    }

    fn store(&self) -> RecordStore<'_> {
        RecordStore::new(&self.database_connection)
    }
}

pub fn router(context: AppContext) -> Router {
    Router::new()
        .route("/", get(sitemap))
        .route("/user", get(list_users).post(create_user))
        .route("/user/favorites", get(list_user_favorites))
        .route("/user/{id}", get(get_user).delete(delete_user))
        .route("/people", get(list_people).post(create_person))
        .route("/people/{id}", get(get_person).delete(delete_person))
        .route("/planet", get(list_planets).post(create_planet))
        .route("/planet/{id}", get(get_planet).delete(delete_planet))
        .route(
            "/favorites/planet/{planet_id}",
            post(add_favorite_planet).delete(remove_favorite_planet),
        )
        .route(
            "/favorites/people/{people_id}",
            post(add_favorite_people).delete(remove_favorite_people),
        )
        .with_state(context)
}

pub async fn run(context: AppContext, port: u16) -> anyhow::Result<()> {
    debug!("Starting server on port {}", port);

    let app = router(context);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {e}");
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match self {
            Error::Validation(_) | Error::Conflict(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Credential(_) | Error::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let message = if self.is_client_error() {
            debug!("{status}: {self}");
            self.to_string()
        } else {
            error!("{self}");
            "Internal server error".to_string()
        };
        (status, Json(MessageResponse::new(message))).into_response()
    }
}

/// A numeric path segment. A malformed one is a validation error with the
/// usual `{message}` body instead of axum's plain-text rejection.
pub struct Id(pub i32);

impl<S: Send + Sync> FromRequestParts<S> for Id {
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        match Path::<i32>::from_request_parts(parts, state).await {
            Ok(Path(id)) => Ok(Id(id)),
            Err(rejection) => {
                debug!("rejected path id: {rejection}");
                Err(Error::validation("id must be an integer"))
            }
        }
    }
}

/// An empty body reads as `T::default()` so the handler can report the
/// missing field itself.
fn parse_body<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| {
        debug!("rejected request body: {e}");
        Error::validation("Request body must be a valid JSON object")
    })
}

fn required(value: Option<String>, field: &str) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(Error::validation(format!("{field} is required"))),
    }
}

async fn sitemap() -> Json<SitemapResponse> {
    Json(SitemapResponse {
        endpoints: ENDPOINTS.to_vec(),
    })
}

async fn list_users(State(state): State<AppContext>) -> Result<Json<Vec<UserResponse>>> {
    let users = users_with_favorites(&state.store())
        .await?
        .into_iter()
        .map(|(u, favs)| UserResponse::new(u, favs))
        .collect();
    Ok(Json(users))
}

async fn create_user(State(state): State<AppContext>, body: Bytes) -> Result<Json<UserResponse>> {
    let payload: CreateUserRequest = parse_body(&body)?;
    let email = required(payload.email, "email")?;
    let password = required(payload.password, "password")?;

    let created = register_user(&state.store(), &email, &password).await?;
    info!("Registered user {}", created.id);
    Ok(Json(UserResponse::new(created, Vec::new())))
}

async fn get_user(
    State(state): State<AppContext>,
    Id(id): Id,
) -> Result<Json<UserResponse>> {
    let store = state.store();
    let found = store
        .get_by_id::<user::Entity>(id)
        .await?
        .ok_or_else(|| Error::not_found("User not found"))?;
    let favs = favorites::list_for_user(&store, id).await?;
    Ok(Json(UserResponse::new(found, favs)))
}

async fn delete_user(
    State(state): State<AppContext>,
    Id(id): Id,
) -> Result<Json<UserResponse>> {
    let store = state.store();
    let found = store
        .get_by_id::<user::Entity>(id)
        .await?
        .ok_or_else(|| Error::not_found("User not found"))?;
    let favs = favorites::list_for_user(&store, id).await?;
    if !store.delete::<user::Entity>(id).await? {
        return Err(Error::not_found("User not found"));
    }
    info!("Deleted user {id} and {} favorites", favs.len());
    Ok(Json(UserResponse::new(found, favs)))
}

async fn list_user_favorites(
    State(state): State<AppContext>,
    Query(query): Query<FavoritesQuery>,
) -> Result<Json<Vec<favorite::Model>>> {
    let raw = query
        .user_id
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| Error::validation("user_id query parameter is required"))?;
    let user_id: i32 = raw
        .trim()
        .parse()
        .map_err(|_| Error::validation("user_id must be an integer"))?;

    let favs = favorites::list_for_user(&state.store(), user_id).await?;
    if favs.is_empty() {
        return Err(Error::not_found("No favorites found for this user"));
    }
    Ok(Json(favs))
}

async fn list_people(State(state): State<AppContext>) -> Result<Json<Vec<people::Model>>> {
    Ok(Json(state.store().list_all::<people::Entity>().await?))
}

async fn get_person(
    State(state): State<AppContext>,
    Id(id): Id,
) -> Result<Json<people::Model>> {
    match state.store().get_by_id::<people::Entity>(id).await? {
        Some(p) => Ok(Json(p)),
        None => Err(Error::not_found("People not found")),
    }
}

async fn create_person(
    State(state): State<AppContext>,
    body: Bytes,
) -> Result<Json<people::Model>> {
    let payload: CreatePersonRequest = parse_body(&body)?;
    let name = required(payload.name, "name")?;

    let created = state
        .store()
        .insert(new_person(
            &name,
            payload.description,
            payload.eyes_color,
            payload.hair_color,
        ))
        .await?;
    info!("Created person {} ({})", created.id, created.name);
    Ok(Json(created))
}

async fn delete_person(
    State(state): State<AppContext>,
    Id(id): Id,
) -> Result<Json<people::Model>> {
    let store = state.store();
    let found = store
        .get_by_id::<people::Entity>(id)
        .await?
        .ok_or_else(|| Error::not_found("People not found"))?;
    if !store.delete::<people::Entity>(id).await? {
        return Err(Error::not_found("People not found"));
    }
    info!("Deleted person {id}");
    Ok(Json(found))
}

async fn list_planets(State(state): State<AppContext>) -> Result<Json<Vec<planet::Model>>> {
    Ok(Json(state.store().list_all::<planet::Entity>().await?))
}

async fn get_planet(
    State(state): State<AppContext>,
    Id(id): Id,
) -> Result<Json<planet::Model>> {
    match state.store().get_by_id::<planet::Entity>(id).await? {
        Some(p) => Ok(Json(p)),
        None => Err(Error::not_found("Planet not found")),
    }
}

async fn create_planet(
    State(state): State<AppContext>,
    body: Bytes,
) -> Result<Json<planet::Model>> {
    let payload: CreatePlanetRequest = parse_body(&body)?;
    let name = required(payload.name, "name")?;

    let created = state
        .store()
        .insert(new_planet(&name, payload.description))
        .await?;
    info!("Created planet {} ({})", created.id, created.name);
    Ok(Json(created))
}

/// Responds with the planet as it was before deletion.
async fn delete_planet(
    State(state): State<AppContext>,
    Id(id): Id,
) -> Result<Json<planet::Model>> {
    let store = state.store();
    let found = store
        .get_by_id::<planet::Entity>(id)
        .await?
        .ok_or_else(|| Error::not_found("Planet not found"))?;
    if !store.delete::<planet::Entity>(id).await? {
        return Err(Error::not_found("Planet not found"));
    }
    info!("Deleted planet {id}");
    Ok(Json(found))
}

async fn add_favorite(
    state: &AppContext,
    body: &Bytes,
    target: Target,
) -> Result<Json<favorite::Model>> {
    let payload: FavoriteRequest = parse_body(body)?;
    let proposal = match target {
        Target::Planet(id) => NewFavorite::planet(payload.user_id, id),
        Target::People(id) => NewFavorite::people(payload.user_id, id),
    };
    Ok(Json(favorites::create(&state.store(), proposal).await?))
}

async fn remove_favorite(
    state: &AppContext,
    body: &Bytes,
    target: Target,
) -> Result<Json<MessageResponse>> {
    let payload: FavoriteRequest = parse_body(body)?;
    favorites::delete(&state.store(), payload.user_id, target).await?;
    Ok(Json(MessageResponse::new(format!(
        "Favorite {} deleted",
        target.kind()
    ))))
}

async fn add_favorite_planet(
    State(state): State<AppContext>,
    Id(planet_id): Id,
    body: Bytes,
) -> Result<Json<favorite::Model>> {
    add_favorite(&state, &body, Target::Planet(planet_id)).await
}

async fn add_favorite_people(
    State(state): State<AppContext>,
    Id(people_id): Id,
    body: Bytes,
) -> Result<Json<favorite::Model>> {
    add_favorite(&state, &body, Target::People(people_id)).await
}

async fn remove_favorite_planet(
    State(state): State<AppContext>,
    Id(planet_id): Id,
    body: Bytes,
) -> Result<Json<MessageResponse>> {
    remove_favorite(&state, &body, Target::Planet(planet_id)).await
}

async fn remove_favorite_people(
    State(state): State<AppContext>,
    Id(people_id): Id,
    body: Bytes,
) -> Result<Json<MessageResponse>> {
    remove_favorite(&state, &body, Target::People(people_id)).await
}
