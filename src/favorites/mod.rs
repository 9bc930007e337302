//! Rules for the `favorite` join table.
//!
//! A favorite belongs to one user and points at exactly one planet or one
//! person. Favorites are addressed by `(user_id, target)` everywhere; the
//! surrogate id is only an output.

use crate::data::store::RecordStore;
use crate::entity::{favorite, people, planet, user};
use crate::error::{Error, Result};
use log::{debug, info};
use sea_orm::{ColumnTrait, Condition, Set};
use std::fmt;

pub const DUPLICATE_MESSAGE: &str = "This favorite already exists";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Planet(i32),
    People(i32),
}

impl Target {
    pub fn kind(&self) -> &'static str {
        match self {
            Target::Planet(_) => "planet",
            Target::People(_) => "people",
        }
    }

    /// `favorite.user_id = user_id AND <target column> = id`
    fn condition(&self, user_id: i32) -> Condition {
        let by_user = Condition::all().add(favorite::Column::UserId.eq(user_id));
        match *self {
            Target::Planet(id) => by_user.add(favorite::Column::PlanetId.eq(id)),
            Target::People(id) => by_user.add(favorite::Column::PeopleId.eq(id)),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Planet(id) | Target::People(id) => write!(f, "{} {}", self.kind(), id),
        }
    }
}

/// A favorite as requested, before any rule has been checked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NewFavorite {
    pub user_id: Option<i32>,
    pub planet_id: Option<i32>,
    pub people_id: Option<i32>,
}

impl NewFavorite {
    pub fn planet(user_id: Option<i32>, planet_id: i32) -> Self {
        NewFavorite {
            user_id,
            planet_id: Some(planet_id),
            people_id: None,
        }
    }

    pub fn people(user_id: Option<i32>, people_id: i32) -> Self {
        NewFavorite {
            user_id,
            planet_id: None,
            people_id: Some(people_id),
        }
    }

    /// Checks the shape of the request without touching storage.
    pub fn validate(&self) -> Result<(i32, Target)> {
        let user_id = self
            .user_id
            .ok_or_else(|| Error::validation("user_id is required"))?;
        let target = match (self.planet_id, self.people_id) {
            (Some(planet_id), None) => Target::Planet(planet_id),
            (None, Some(people_id)) => Target::People(people_id),
            (Some(_), Some(_)) => {
                return Err(Error::validation(
                    "A favorite must reference either a planet or a person, not both",
                ));
            }
            (None, None) => {
                return Err(Error::validation(
                    "A favorite must reference a planet or a person",
                ));
            }
        };
        Ok((user_id, target))
    }
}

/// Validates and persists a favorite.
///
/// The lookup for an existing pair gives the friendly error in the common
/// case; the unique indexes on the table catch the concurrent one.
pub async fn create(store: &RecordStore<'_>, proposal: NewFavorite) -> Result<favorite::Model> {
    let (user_id, target) = proposal.validate()?;

    if store.get_by_id::<user::Entity>(user_id).await?.is_none() {
        return Err(Error::not_found("User not found"));
    }
    let target_exists = match target {
        Target::Planet(id) => store.get_by_id::<planet::Entity>(id).await?.is_some(),
        Target::People(id) => store.get_by_id::<people::Entity>(id).await?.is_some(),
    };
    if !target_exists {
        return Err(Error::not_found(match target {
            Target::Planet(_) => "Planet not found",
            Target::People(_) => "People not found",
        }));
    }

    if find(store, user_id, target).await?.is_some() {
        debug!("user {user_id} already has {target} as a favorite");
        return Err(Error::conflict(DUPLICATE_MESSAGE));
    }

    let (planet_id, people_id) = match target {
        Target::Planet(id) => (Some(id), None),
        Target::People(id) => (None, Some(id)),
    };
    let created = store
        .insert(favorite::ActiveModel {
            user_id: Set(user_id),
            planet_id: Set(planet_id),
            people_id: Set(people_id),
            ..Default::default()
        })
        .await
        .map_err(|e| Error::from_insert(e, DUPLICATE_MESSAGE))?;

    info!("user {user_id} added {target} as favorite {}", created.id);
    Ok(created)
}

pub async fn find(
    store: &RecordStore<'_>,
    user_id: i32,
    target: Target,
) -> Result<Option<favorite::Model>> {
    Ok(store
        .find_one::<favorite::Entity, _>(target.condition(user_id))
        .await?)
}

/// Removes the favorite `(user_id, target)` and returns what was stored.
pub async fn delete(
    store: &RecordStore<'_>,
    user_id: Option<i32>,
    target: Target,
) -> Result<favorite::Model> {
    let user_id = user_id.ok_or_else(|| Error::validation("user_id is required"))?;
    let existing = find(store, user_id, target)
        .await?
        .ok_or_else(|| Error::not_found(format!("Favorite {} not found", target.kind())))?;

    if !store.delete::<favorite::Entity>(existing.id).await? {
        // Removed by someone else between the lookup and the delete.
        return Err(Error::not_found(format!(
            "Favorite {} not found",
            target.kind()
        )));
    }
    info!("user {user_id} removed {target} from favorites");
    Ok(existing)
}

/// Favorites of one user, ordered by id.
pub async fn list_for_user(store: &RecordStore<'_>, user_id: i32) -> Result<Vec<favorite::Model>> {
    Ok(store
        .find_all::<favorite::Entity, _>(favorite::Column::UserId.eq(user_id))
        .await?)
}
