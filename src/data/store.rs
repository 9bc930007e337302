//! Generic row access shared by every entity.
//!
//! `RecordStore` is a thin borrow of the pool. Column constraints (required
//! fields, foreign keys, unique indexes) are left to the engine and surface
//! as `DbErr` from `insert`.

use sea_orm::sea_query::IntoCondition;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, IntoActiveModel,
    Iterable, PrimaryKeyToColumn, PrimaryKeyTrait, QueryFilter, QueryOrder, Select,
};

#[derive(Clone, Copy)]
pub struct RecordStore<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> RecordStore<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        RecordStore { db }
    }

    pub fn connection(&self) -> &'a DatabaseConnection {
        self.db
    }

    pub async fn get_by_id<E>(&self, id: i32) -> Result<Option<E::Model>, DbErr>
    where
        E: EntityTrait,
        i32: Into<<E::PrimaryKey as PrimaryKeyTrait>::ValueType>,
    {
        E::find_by_id(id).one(self.db).await
    }

    pub async fn list_all<E>(&self) -> Result<Vec<E::Model>, DbErr>
    where
        E: EntityTrait,
    {
        ordered_by_key(E::find()).all(self.db).await
    }

    pub async fn find_one<E, C>(&self, predicate: C) -> Result<Option<E::Model>, DbErr>
    where
        E: EntityTrait,
        C: IntoCondition,
    {
        E::find().filter(predicate).one(self.db).await
    }

    pub async fn find_all<E, C>(&self, predicate: C) -> Result<Vec<E::Model>, DbErr>
    where
        E: EntityTrait,
        C: IntoCondition,
    {
        ordered_by_key(E::find().filter(predicate))
            .all(self.db)
            .await
    }

    /// Inserts the row and returns it as stored, generated id included.
    pub async fn insert<A>(
        &self,
        model: A,
    ) -> Result<<A::Entity as EntityTrait>::Model, DbErr>
    where
        A: ActiveModelTrait + ActiveModelBehavior + Send + 'a,
        <A::Entity as EntityTrait>::Model: IntoActiveModel<A>,
    {
        model.insert(self.db).await
    }

    /// Returns `false` when no row had that id.
    pub async fn delete<E>(&self, id: i32) -> Result<bool, DbErr>
    where
        E: EntityTrait,
        i32: Into<<E::PrimaryKey as PrimaryKeyTrait>::ValueType>,
    {
        let result = E::delete_by_id(id).exec(self.db).await?;
        Ok(result.rows_affected > 0)
    }
}

fn ordered_by_key<E: EntityTrait>(mut select: Select<E>) -> Select<E> {
    for key in E::PrimaryKey::iter() {
        select = select.order_by_asc(key.into_column());
    }
    select
}
