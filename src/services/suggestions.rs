use crate::{
    db::DbPool,
    entities::suggestion::{self, Entity as SuggestionEntity},
    errors::ServiceError,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::Serialize;
use std::str::FromStr;
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;

/// Suggestion lists are capped to keep the autocomplete dropdown short.
const SUGGESTION_LIMIT: u64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionKind {
    Cities,
    Consignors,
    Consignees,
    Contents,
}

impl SuggestionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SuggestionKind::Cities => "cities",
            SuggestionKind::Consignors => "consignors",
            SuggestionKind::Consignees => "consignees",
            SuggestionKind::Contents => "contents",
        }
    }
}

impl FromStr for SuggestionKind {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cities" => Ok(SuggestionKind::Cities),
            "consignors" => Ok(SuggestionKind::Consignors),
            "consignees" => Ok(SuggestionKind::Consignees),
            "contents" => Ok(SuggestionKind::Contents),
            other => Err(ServiceError::BadRequest(format!(
                "Unknown suggestion type: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SuggestionAdded {
    pub added: bool,
}

#[derive(Clone)]
pub struct SuggestionService {
    db_pool: Arc<DbPool>,
}

impl SuggestionService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Prefix matches for one kind, capped at five names.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        kind: SuggestionKind,
        prefix: &str,
    ) -> Result<Vec<String>, ServiceError> {
        let prefix = prefix.trim();
        if prefix.is_empty() {
            return Ok(Vec::new());
        }

        let rows = SuggestionEntity::find()
            .filter(suggestion::Column::Kind.eq(kind.as_str()))
            .filter(suggestion::Column::Name.starts_with(prefix))
            .order_by_asc(suggestion::Column::Name)
            .limit(SUGGESTION_LIMIT)
            .all(&*self.db_pool)
            .await?;

        Ok(rows.into_iter().map(|s| s.name).collect())
    }

    /// Records a name if it is new. Returns whether a row was inserted.
    #[instrument(skip(self))]
    pub async fn add(
        &self,
        kind: SuggestionKind,
        name: &str,
    ) -> Result<SuggestionAdded, ServiceError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ServiceError::ValidationError("Name is required".to_string()));
        }

        let exists = SuggestionEntity::find()
            .filter(suggestion::Column::Kind.eq(kind.as_str()))
            .filter(suggestion::Column::Name.eq(name))
            .one(&*self.db_pool)
            .await?
            .is_some();

        if exists {
            return Ok(SuggestionAdded { added: false });
        }

        let model = suggestion::ActiveModel {
            kind: Set(kind.as_str().to_string()),
            name: Set(name.to_string()),
            ..Default::default()
        };

        // A concurrent insert of the same name loses the unique race; treat
        // that the same as finding it already present.
        match model.insert(&*self.db_pool).await {
            Ok(_) => Ok(SuggestionAdded { added: true }),
            Err(e) => {
                let already = SuggestionEntity::find()
                    .filter(suggestion::Column::Kind.eq(kind.as_str()))
                    .filter(suggestion::Column::Name.eq(name))
                    .one(&*self.db_pool)
                    .await?
                    .is_some();
                if already {
                    Ok(SuggestionAdded { added: false })
                } else {
                    Err(ServiceError::DatabaseError(e))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_parses_known_values() {
        assert_eq!(
            "cities".parse::<SuggestionKind>().unwrap(),
            SuggestionKind::Cities
        );
        assert_eq!(
            "contents".parse::<SuggestionKind>().unwrap(),
            SuggestionKind::Contents
        );
    }

    #[test]
    fn kind_rejects_unknown_values() {
        assert!("trucks".parse::<SuggestionKind>().is_err());
        assert!("".parse::<SuggestionKind>().is_err());
    }
}
