pub mod favorite;
pub mod helpers;
pub mod people;
pub mod planet;
pub mod user;
