use std::sync::Arc;

use crate::{
    error::AppError,
    model::Profile,
    store::ProfileStore,
    validation::{CreateInput, UpdateInput},
};

/// Splits a submitted name on whitespace: first token becomes the first
/// name, the remaining tokens re-join with single spaces as the last name
/// (absent when there is only one token).
pub fn split_name(name: &str) -> (String, Option<String>) {
    let mut parts = name.split_whitespace();

    let first = parts.next().unwrap_or_default().to_string();
    let rest: Vec<&str> = parts.collect();
    let last = if rest.is_empty() {
        None
    } else {
        Some(rest.join(" "))
    };

    (first, last)
}

/// The single-profile operations. All reads and writes address "the first
/// stored record"; only the upsert looks records up by email.
#[derive(Clone)]
pub struct ProfileService {
    store: Arc<dyn ProfileStore>,
}

impl ProfileService {
    pub fn new(store: Arc<dyn ProfileStore>) -> Self {
        Self { store }
    }

    /// Upsert keyed by email: repeated calls with the same address converge
    /// to one record reflecting the latest input, keeping its original id.
    /// A duplicate-index race inside the store surfaces as
    /// [`AppError::DuplicateKey`].
    pub async fn create_or_update(&self, input: CreateInput) -> Result<Profile, AppError> {
        let (first_name, last_name) = split_name(&input.name);

        let profile = match self.store.find_by_email(&input.email).await? {
            Some(mut existing) => {
                existing.first_name = first_name;
                existing.last_name = last_name;
                existing.email = input.email;
                existing.age = input.age;
                existing.touch();

                existing.validate().map_err(AppError::Validation)?;
                self.store.update(&existing).await?;
                existing
            }
            None => {
                let profile = Profile::new(first_name, last_name, input.email, input.age);

                profile.validate().map_err(AppError::Validation)?;
                self.store.insert(&profile).await?;
                profile
            }
        };

        Ok(profile)
    }

    /// The current profile, if any. Absence is a normal outcome.
    pub async fn get(&self) -> Result<Option<Profile>, AppError> {
        Ok(self.store.find_first().await?)
    }

    /// Partial update of the current profile; only submitted fields change.
    pub async fn update(&self, input: UpdateInput) -> Result<Profile, AppError> {
        let mut profile = self.store.find_first().await?.ok_or(AppError::NotFound)?;

        if let Some(name) = &input.name {
            let (first_name, last_name) = split_name(name);
            profile.first_name = first_name;
            profile.last_name = last_name;
        }

        if let Some(email) = input.email {
            // Checked again in the store, but catching it here keeps the
            // common path off the unique-index failure branch.
            if email != profile.email {
                if let Some(other) = self.store.find_by_email(&email).await? {
                    if other.id != profile.id {
                        return Err(AppError::DuplicateKey {
                            field: "email".to_string(),
                            value: email,
                        });
                    }
                }
            }
            profile.email = email;
        }

        if let Some(age) = input.age {
            profile.age = Some(age);
        }

        profile.touch();
        profile.validate().map_err(AppError::Validation)?;
        self.store.update(&profile).await?;

        Ok(profile)
    }

    /// Removes the current profile; false when none existed.
    pub async fn delete(&self) -> Result<bool, AppError> {
        Ok(self.store.delete_first().await?.is_some())
    }

    pub async fn count(&self) -> Result<u64, AppError> {
        Ok(self.store.count().await?)
    }
}
