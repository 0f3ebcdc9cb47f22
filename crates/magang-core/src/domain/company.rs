//! Company domain entity

use magang_shared::{Lifecycle, Timestamps};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Internship host organization.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Company {
    pub id: Uuid,

    #[validate(length(min = 1, max = 150, message = "Company name must be 1-150 characters"))]
    pub name: String,

    #[validate(length(max = 255, message = "Address is too long"))]
    pub address: Option<String>,

    #[validate(length(max = 100, message = "Contact is too long"))]
    pub contact: Option<String>,

    pub lifecycle: Lifecycle,
    pub timestamps: Timestamps,
}

impl Company {
    pub fn new(
        name: String,
        address: Option<String>,
        contact: Option<String>,
    ) -> Result<Self, validator::ValidationErrors> {
        let company = Self {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            address,
            contact,
            lifecycle: Lifecycle::Active,
            timestamps: Timestamps::now(),
        };

        company.validate()?;
        Ok(company)
    }
}
