use serde::{Deserialize, Serialize};

use catalog_core::CategoryId;

/// A product category. `code` is unique across categories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub code: String,
    pub name: String,
}

/// One element of a batch category creation request.
///
/// Transient: the persisted form is a [`Category`] row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateCategoryInput {
    pub code: String,
    pub name: String,
}

impl CreateCategoryInput {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }

    /// Storage form: surrounding whitespace stripped from the code.
    pub fn normalized(&self) -> Self {
        Self {
            code: self.code.trim().to_string(),
            name: self.name.clone(),
        }
    }
}
