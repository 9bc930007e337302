use crate::entity::{favorite, user};
use serde::{Deserialize, Serialize};

// Request fields are all optional so a missing one becomes a 400 with a
// message rather than a serde rejection.

#[derive(Debug, Default, Deserialize)]
pub struct CreateUserRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreatePlanetRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreatePersonRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub eyes_color: Option<String>,
    pub hair_color: Option<String>,
}

/// Body of POST and DELETE on `/favorites/{kind}/{id}`
#[derive(Debug, Default, Deserialize)]
pub struct FavoriteRequest {
    pub user_id: Option<i32>,
}

/// Kept as a string so a non-numeric value gets our own message.
#[derive(Debug, Default, Deserialize)]
pub struct FavoritesQuery {
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct UserResponse {
    pub id: i32,
    pub email: String,
    pub favorite: Vec<favorite::Model>,
}

impl UserResponse {
    pub fn new(user: user::Model, favorites: Vec<favorite::Model>) -> Self {
        UserResponse {
            id: user.id,
            email: user.email,
            favorite: favorites,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        MessageResponse {
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SitemapResponse {
    pub endpoints: Vec<&'static str>,
}
