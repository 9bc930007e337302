use crate::auth::hash_password;
use crate::data::store::RecordStore;
use crate::entity::{favorite, people, planet, user};
use crate::error::{Error, Result};
use sea_orm::{ColumnTrait, EntityTrait, QueryOrder, Set};

pub fn new_planet(name: &str, description: Option<String>) -> planet::ActiveModel {
    planet::ActiveModel {
        name: Set(name.to_string()),
        description: Set(description),
        ..Default::default()
    }
}

pub fn new_person(
    name: &str,
    description: Option<String>,
    eyes_color: Option<String>,
    hair_color: Option<String>,
) -> people::ActiveModel {
    people::ActiveModel {
        name: Set(name.to_string()),
        description: Set(description),
        eyes_color: Set(eyes_color.unwrap_or_else(|| people::DEFAULT_EYES_COLOR.to_string())),
        hair_color: Set(hair_color.unwrap_or_else(|| people::DEFAULT_HAIR_COLOR.to_string())),
        ..Default::default()
    }
}

/// Hashes the password before it gets anywhere near the table.
pub fn new_user(email: &str, password: &str) -> Result<user::ActiveModel> {
    Ok(user::ActiveModel {
        email: Set(email.to_string()),
        password_hash: Set(hash_password(password)?),
        is_active: Set(true),
        ..Default::default()
    })
}

/// Registers a user, rejecting an email that is already taken.
pub async fn create_user(
    store: &RecordStore<'_>,
    email: &str,
    password: &str,
) -> Result<user::Model> {
    let email = email.trim();
    if email.is_empty() {
        return Err(Error::validation("email is required"));
    }
    if password.is_empty() {
        return Err(Error::validation("password is required"));
    }
    if store
        .find_one::<user::Entity, _>(user::Column::Email.eq(email))
        .await?
        .is_some()
    {
        return Err(Error::conflict("A user with this email already exists"));
    }

    store
        .insert(new_user(email, password)?)
        .await
        .map_err(|e| Error::from_insert(e, "A user with this email already exists"))
}

/// Every user paired with their favorites, ordered by user id.
pub async fn users_with_favorites(
    store: &RecordStore<'_>,
) -> Result<Vec<(user::Model, Vec<favorite::Model>)>> {
    Ok(user::Entity::find()
        .order_by_asc(user::Column::Id)
        .find_with_related(favorite::Entity)
        .order_by_asc(favorite::Column::Id)
        .all(store.connection())
        .await?)
}
