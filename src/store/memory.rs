// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the tomora-api project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! In-memory reference implementation of [`DataStore`]
//!
//! Tables are plain `HashMap`s behind a single `RwLock`. State is
//! process-lifetime only; everything is lost on restart.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::Utc;

use super::models::{
    History, NewHistory, NewReminder, NewUser, Reminder, ReminderPatch, User,
};
use super::{DataStore, StoreError};

#[derive(Default)]
struct Tables {
    users: HashMap<i64, User>,
    reminders: HashMap<i64, Reminder>,
    history: HashMap<i64, History>,
    next_user_id: i64,
    next_reminder_id: i64,
    next_history_id: i64,
}

/// Thread-safe in-memory store
pub struct MemoryStore {
    inner: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore {
            inner: RwLock::new(Tables::default()),
        }
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Tables>, StoreError> {
        self.inner.read().map_err(|_| StoreError::Unavailable)
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Tables>, StoreError> {
        self.inner.write().map_err(|_| StoreError::Unavailable)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DataStore for MemoryStore {
    fn create_user(&self, new: NewUser) -> Result<User, StoreError> {
        let mut tables = self.write()?;
        if tables.users.values().any(|u| u.email == new.email) {
            return Err(StoreError::EmailTaken);
        }
        tables.next_user_id += 1;
        let user = User {
            id: tables.next_user_id,
            email: new.email,
            name: new.name,
            password: new.password,
            is_medicado: new.is_medicado,
            is_auxiliar: new.is_auxiliar,
            linked_id: None,
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let tables = self.read()?;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    fn find_user_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        let tables = self.read()?;
        Ok(tables.users.get(&id).cloned())
    }

    fn link_users(&self, user_id: i64, linked_id: i64) -> Result<User, StoreError> {
        let mut tables = self.write()?;
        let user = tables.users.get_mut(&user_id).ok_or(StoreError::NotFound)?;
        user.linked_id = Some(linked_id);
        Ok(user.clone())
    }

    fn create_reminder(&self, new: NewReminder) -> Result<Reminder, StoreError> {
        let mut tables = self.write()?;
        tables.next_reminder_id += 1;
        let reminder = Reminder {
            id: tables.next_reminder_id,
            user_id: new.user_id,
            name: new.name,
            dosage: new.dosage,
            desc: new.desc,
            hour: new.hour,
            recurring: new.recurring,
            active: new.active,
            source: new.source,
            created_at: Utc::now(),
        };
        tables.reminders.insert(reminder.id, reminder.clone());
        Ok(reminder)
    }

    fn reminders_for_user(&self, user_id: i64) -> Result<Vec<Reminder>, StoreError> {
        let tables = self.read()?;
        let mut reminders: Vec<Reminder> = tables
            .reminders
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        reminders.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(reminders)
    }

    fn active_reminders(&self, user_id: i64, limit: usize) -> Result<Vec<Reminder>, StoreError> {
        let tables = self.read()?;
        let mut reminders: Vec<Reminder> = tables
            .reminders
            .values()
            .filter(|r| r.user_id == user_id && r.active)
            .cloned()
            .collect();
        reminders.sort_by(|a, b| a.hour.cmp(&b.hour));
        reminders.truncate(limit);
        Ok(reminders)
    }

    fn update_reminder(&self, id: i64, patch: ReminderPatch) -> Result<Reminder, StoreError> {
        let mut tables = self.write()?;
        let reminder = tables.reminders.get_mut(&id).ok_or(StoreError::NotFound)?;
        if let Some(name) = patch.name {
            reminder.name = name;
        }
        if let Some(dosage) = patch.dosage {
            reminder.dosage = Some(dosage);
        }
        if let Some(desc) = patch.desc {
            reminder.desc = Some(desc);
        }
        if let Some(hour) = patch.hour {
            reminder.hour = hour;
        }
        Ok(reminder.clone())
    }

    fn delete_reminder(&self, id: i64) -> Result<(), StoreError> {
        let mut tables = self.write()?;
        tables
            .reminders
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }

    fn create_history(&self, new: NewHistory) -> Result<History, StoreError> {
        let mut tables = self.write()?;
        tables.next_history_id += 1;
        let record = History {
            id: tables.next_history_id,
            user_id: new.user_id,
            reminder_id: new.reminder_id,
            name: new.name,
            hour: new.hour,
            taken: new.taken,
            created_at: Utc::now(),
        };
        tables.history.insert(record.id, record.clone());
        Ok(record)
    }

    fn history_for_user(&self, user_id: i64) -> Result<Vec<History>, StoreError> {
        let tables = self.read()?;
        let mut records: Vec<History> = tables
            .history
            .values()
            .filter(|h| h.user_id == user_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user(email: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            name: "Alice".to_string(),
            password: "$6$salt$hash".to_string(),
            is_medicado: true,
            is_auxiliar: false,
        }
    }

    #[test]
    fn test_create_and_find_user() {
        let store = MemoryStore::new();
        let user = store.create_user(sample_user("alice@example.com")).unwrap();
        assert_eq!(user.id, 1);

        let by_email = store.find_user_by_email("alice@example.com").unwrap();
        assert_eq!(by_email.map(|u| u.id), Some(user.id));
        assert!(store.find_user_by_id(99).unwrap().is_none());
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let store = MemoryStore::new();
        store.create_user(sample_user("alice@example.com")).unwrap();
        let err = store
            .create_user(sample_user("alice@example.com"))
            .unwrap_err();
        assert!(matches!(err, StoreError::EmailTaken));
    }

    #[test]
    fn test_active_reminders_sorted_and_capped() {
        let store = MemoryStore::new();
        let user = store.create_user(sample_user("alice@example.com")).unwrap();
        for (hour, active) in [("12:00", true), ("08:00", true), ("09:30", false)] {
            store
                .create_reminder(NewReminder {
                    user_id: user.id,
                    name: "Vitamin".to_string(),
                    dosage: None,
                    desc: None,
                    hour: hour.to_string(),
                    recurring: "none".to_string(),
                    active,
                    source: "app".to_string(),
                })
                .unwrap();
        }

        let active = store.active_reminders(user.id, 10).unwrap();
        let hours: Vec<&str> = active.iter().map(|r| r.hour.as_str()).collect();
        assert_eq!(hours, vec!["08:00", "12:00"]);

        let capped = store.active_reminders(user.id, 1).unwrap();
        assert_eq!(capped.len(), 1);
    }

    #[test]
    fn test_update_and_delete_reminder() {
        let store = MemoryStore::new();
        let user = store.create_user(sample_user("alice@example.com")).unwrap();
        let reminder = store
            .create_reminder(NewReminder {
                user_id: user.id,
                name: "Vitamin".to_string(),
                dosage: Some("5mg".to_string()),
                desc: None,
                hour: "08:00".to_string(),
                recurring: "daily".to_string(),
                active: true,
                source: "app".to_string(),
            })
            .unwrap();

        let updated = store
            .update_reminder(
                reminder.id,
                ReminderPatch {
                    hour: Some("09:00".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.hour, "09:00");
        assert_eq!(updated.name, "Vitamin");

        store.delete_reminder(reminder.id).unwrap();
        assert!(matches!(
            store.delete_reminder(reminder.id),
            Err(StoreError::NotFound)
        ));
    }
}
