// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process [`Store`] for tests and local runs.

use crate::db::{Store, StoreError, StoreResult};
use crate::models::{Holding, User};
use async_trait::async_trait;
use bson::oid::ObjectId;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use regex::RegexBuilder;

/// Store keeping documents in concurrent maps.
///
/// Ids are fresh ObjectIds, so sorting by id yields insertion order.
/// The email index is claimed before a user is written, which makes email
/// uniqueness hold under concurrent registration.
#[derive(Default)]
pub struct MemoryDb {
    users: DashMap<String, User>,
    /// email -> user id
    emails: DashMap<String, String>,
    holdings: DashMap<String, Holding>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    fn sorted_holdings<F>(&self, keep: F) -> Vec<Holding>
    where
        F: Fn(&Holding) -> bool,
    {
        let mut holdings: Vec<Holding> = self
            .holdings
            .iter()
            .filter(|entry| keep(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        holdings.sort_by(|a, b| a.id.cmp(&b.id));
        holdings
    }
}

#[async_trait]
impl Store for MemoryDb {
    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let mut users: Vec<User> = self.users.iter().map(|e| e.value().clone()).collect();
        users.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(users)
    }

    async fn find_user_by_id(&self, id: &str) -> StoreResult<Option<User>> {
        Ok(self.users.get(id).map(|u| u.value().clone()))
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let Some(id) = self.emails.get(email).map(|e| e.value().clone()) else {
            return Ok(None);
        };
        self.find_user_by_id(&id).await
    }

    async fn insert_user(&self, user: &User) -> StoreResult<String> {
        let id = ObjectId::new().to_hex();
        match self.emails.entry(user.email.clone()) {
            Entry::Occupied(_) => return Err(StoreError::Duplicate("email")),
            Entry::Vacant(slot) => {
                slot.insert(id.clone());
            }
        }

        let mut stored = user.clone();
        stored.id = Some(id.clone());
        self.users.insert(id.clone(), stored);
        Ok(id)
    }

    async fn replace_user(&self, id: &str, user: &User) -> StoreResult<bool> {
        let Some(mut existing) = self.users.get_mut(id) else {
            return Ok(false);
        };

        if existing.email != user.email {
            match self.emails.entry(user.email.clone()) {
                Entry::Occupied(_) => return Err(StoreError::Duplicate("email")),
                Entry::Vacant(slot) => {
                    slot.insert(id.to_string());
                }
            }
            self.emails.remove(&existing.email);
        }

        let mut stored = user.clone();
        stored.id = Some(id.to_string());
        *existing = stored;
        Ok(true)
    }

    async fn delete_user(&self, id: &str) -> StoreResult<bool> {
        match self.users.remove(id) {
            Some((_, user)) => {
                self.emails.remove(&user.email);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_holdings(&self) -> StoreResult<Vec<Holding>> {
        Ok(self.sorted_holdings(|_| true))
    }

    async fn find_holding_by_id(&self, id: &str) -> StoreResult<Option<Holding>> {
        Ok(self.holdings.get(id).map(|h| h.value().clone()))
    }

    async fn find_holdings_by_ticker(&self, ticker: &str) -> StoreResult<Vec<Holding>> {
        Ok(self.sorted_holdings(|h| h.ticker == ticker))
    }

    async fn find_holdings_by_account(&self, pattern: &str) -> StoreResult<Vec<Holding>> {
        let regex = RegexBuilder::new(&format!(".*{}.*", pattern))
            .case_insensitive(true)
            .build()
            .map_err(|e| StoreError::Backend(format!("Invalid account pattern: {}", e)))?;
        Ok(self.sorted_holdings(|h| regex.is_match(&h.account)))
    }

    async fn insert_holding(&self, holding: &Holding) -> StoreResult<String> {
        let id = ObjectId::new().to_hex();
        let mut stored = holding.clone();
        stored.id = Some(id.clone());
        self.holdings.insert(id.clone(), stored);
        Ok(id)
    }

    async fn replace_holding(&self, id: &str, holding: &Holding) -> StoreResult<bool> {
        let Some(mut existing) = self.holdings.get_mut(id) else {
            return Ok(false);
        };
        let mut stored = holding.clone();
        stored.id = Some(id.to_string());
        *existing = stored;
        Ok(true)
    }

    async fn delete_holding(&self, id: &str) -> StoreResult<bool> {
        Ok(self.holdings.remove(id).is_some())
    }
}
