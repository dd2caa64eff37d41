use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Deserialize;

use catalog_core::Pagination;
use catalog_products::{CreateCategoryInput, ProductFilter};

use crate::app::errors::ApiError;

// -------------------------
// Query parameters
// -------------------------

// Raw strings so malformed values produce a JSON validation error instead of
// the extractor's plain-text rejection.

#[derive(Debug, Default, Deserialize)]
pub struct ListProductsQuery {
    pub limit: Option<String>,
    pub offset: Option<String>,
    pub category_code: Option<String>,
    pub max_price: Option<String>,
}

impl ListProductsQuery {
    pub fn into_parts(self) -> Result<(Pagination, ProductFilter), ApiError> {
        let pagination = parse_pagination(self.limit.as_deref(), self.offset.as_deref())?;
        let max_price = self.max_price.as_deref().map(parse_max_price).transpose()?;
        let filter = ProductFilter::new()
            .with_category_code(self.category_code.unwrap_or_default())
            .with_max_price(max_price);
        Ok((pagination, filter))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListCategoriesQuery {
    pub limit: Option<String>,
    pub offset: Option<String>,
    pub category_code: Option<String>,
}

impl ListCategoriesQuery {
    /// Pagination plus the category code filter (empty means all).
    pub fn into_parts(self) -> Result<(Pagination, String), ApiError> {
        let pagination = parse_pagination(self.limit.as_deref(), self.offset.as_deref())?;
        Ok((pagination, self.category_code.unwrap_or_default()))
    }
}

/// `limit` defaults to 10, must be at least 1 and is clamped to 100.
/// `offset` defaults to 0 and must not be negative.
pub fn parse_pagination(limit: Option<&str>, offset: Option<&str>) -> Result<Pagination, ApiError> {
    let limit = match limit {
        None => Pagination::DEFAULT_LIMIT,
        Some(raw) => {
            let n = raw
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|n| *n >= 1)
                .ok_or(ApiError::InvalidParam {
                    field: "limit",
                    expected: "an integer greater than or equal to 1",
                })?;
            u32::try_from(n.min(i64::from(Pagination::MAX_LIMIT))).unwrap_or(Pagination::MAX_LIMIT)
        }
    };

    let offset = match offset {
        None => 0,
        Some(raw) => raw
            .trim()
            .parse::<i64>()
            .ok()
            .and_then(|n| u64::try_from(n).ok())
            .ok_or(ApiError::InvalidParam {
                field: "offset",
                expected: "an integer greater than or equal to 0",
            })?,
    };

    Ok(Pagination::new(limit, offset))
}

pub fn parse_max_price(raw: &str) -> Result<Decimal, ApiError> {
    Decimal::from_str(raw.trim())
        .ok()
        .filter(|price| price.is_sign_positive() && !price.is_zero())
        .ok_or(ApiError::InvalidParam {
            field: "max_price",
            expected: "a decimal greater than 0",
        })
}

/// `PROD` followed by exactly three ASCII digits.
pub fn validate_product_code(code: &str) -> Result<(), ApiError> {
    let valid = code
        .strip_prefix("PROD")
        .is_some_and(|digits| digits.len() == 3 && digits.bytes().all(|b| b.is_ascii_digit()));
    if valid {
        Ok(())
    } else {
        Err(ApiError::InvalidProductCode(code.to_string()))
    }
}

// -------------------------
// Request bodies
// -------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCategoryRequest {
    pub code: String,
    pub name: String,
}

/// A JSON body that is either a single object or an array of them.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(item) => vec![item],
            OneOrMany::Many(items) => items,
        }
    }
}

/// Every element needs a non-blank code and name.
pub fn validate_categories(
    requests: Vec<CreateCategoryRequest>,
) -> Result<Vec<CreateCategoryInput>, ApiError> {
    requests
        .into_iter()
        .map(|req| {
            if req.code.trim().is_empty() {
                return Err(ApiError::InvalidParam {
                    field: "code",
                    expected: "a non-empty string",
                });
            }
            if req.name.trim().is_empty() {
                return Err(ApiError::InvalidParam {
                    field: "name",
                    expected: "a non-empty string",
                });
            }
            Ok(CreateCategoryInput::new(req.code, req.name))
        })
        .collect()
}
