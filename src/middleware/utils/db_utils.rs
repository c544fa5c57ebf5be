use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::middleware::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QryOrder {
    DESC,
    ASC,
}

impl fmt::Display for QryOrder {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            QryOrder::DESC => write!(f, "DESC"),
            QryOrder::ASC => write!(f, "ASC"),
        }
    }
}

impl FromStr for QryOrder {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_uppercase().as_str() {
            "ASC" => Ok(QryOrder::ASC),
            "DESC" => Ok(QryOrder::DESC),
            _ => Err(AppError::invalid(format!(
                "unsupported sort direction: {value}"
            ))),
        }
    }
}

/// Page window. A negative `page` means "everything".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub count: i64,
}

impl Pagination {
    pub fn all() -> Self {
        Self { page: -1, count: 0 }
    }

    pub fn new(page: i64, count: i64) -> AppResult<Self> {
        if page >= 0 && count <= 0 {
            return Err(AppError::invalid("page size must be positive"));
        }
        if page > 0 && page.checked_mul(count).is_none() {
            return Err(AppError::invalid("page out of range"));
        }
        Ok(Self { page, count })
    }

    /// `(limit, start)` or `None` when unpaginated.
    pub fn window(&self) -> Option<(i64, i64)> {
        if self.page < 0 {
            None
        } else {
            Some((self.count, self.page * self.count))
        }
    }
}

/// Discussion listing keys accepted by the web-service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum DiscussionSortKey {
    Id,
    TimeModified,
    TimeStart,
    TimeEnd,
}

impl DiscussionSortKey {
    pub fn column(&self) -> &'static str {
        match self {
            DiscussionSortKey::Id => "id",
            DiscussionSortKey::TimeModified => "time_modified",
            DiscussionSortKey::TimeStart => "time_start",
            DiscussionSortKey::TimeEnd => "time_end",
        }
    }

    pub fn parse(value: &str) -> AppResult<Self> {
        Self::from_str(value)
            .map_err(|_| AppError::invalid(format!("unsupported sort key: {value}")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum PostSortKey {
    Id,
    Created,
    Modified,
}

impl PostSortKey {
    pub fn column(&self) -> &'static str {
        match self {
            PostSortKey::Id => "id",
            PostSortKey::Created => "created",
            PostSortKey::Modified => "modified",
        }
    }

    pub fn parse(value: &str) -> AppResult<Self> {
        Self::from_str(value)
            .map_err(|_| AppError::invalid(format!("unsupported sort key: {value}")))
    }
}

/// `ORDER BY` body with ascending id as the tie breaker.
pub fn order_clause(column: &str, direction: QryOrder) -> String {
    if column == "id" {
        format!("id {direction}")
    } else {
        format!("{column} {direction}, id ASC")
    }
}

#[derive(Debug, Deserialize)]
pub struct CountRow {
    pub count: i64,
}
