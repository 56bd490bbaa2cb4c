//! In-memory stores mirroring the Postgres queries, for service and router tests.

use std::sync::Mutex;

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::{
    repo::UserStore,
    repo_types::{NewUser, User, UserId},
};
use crate::tasks::{
    repo::TaskStore,
    repo_types::{CompanyStat, DateRange, Task, TaskDraft, TaskPatch},
};

#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<Vec<User>>,
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn insert(&self, user: &NewUser) -> anyhow::Result<Option<User>> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == user.email) {
            return Ok(None);
        }
        let created = User {
            id: UserId::new(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            created_at: OffsetDateTime::now_utc(),
        };
        users.push(created.clone());
        Ok(Some(created))
    }
}

#[derive(Default)]
pub struct MemoryTaskStore {
    tasks: Mutex<Vec<Task>>,
}

impl MemoryTaskStore {
    fn owned(&self, owner: UserId) -> Vec<Task> {
        let tasks = self.tasks.lock().unwrap();
        tasks.iter().filter(|t| t.user_id == owner).cloned().collect()
    }
}

// Insertion order stands in for created_at so ties stay deterministic.
fn newest_first(tasks: &mut [Task]) {
    tasks.reverse();
    tasks.sort_by(|a, b| b.date.cmp(&a.date));
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn insert(&self, owner: UserId, draft: &TaskDraft) -> anyhow::Result<Task> {
        let now = OffsetDateTime::now_utc();
        let task = Task {
            id: Uuid::new_v4(),
            user_id: owner,
            date: draft.date,
            company_name: draft.company_name.clone(),
            description: draft.description.clone(),
            is_completed: draft.is_completed,
            created_at: now,
            updated_at: now,
        };
        self.tasks.lock().unwrap().push(task.clone());
        Ok(task)
    }

    async fn list(&self, owner: UserId, range: Option<DateRange>) -> anyhow::Result<Vec<Task>> {
        let mut tasks: Vec<Task> = self
            .owned(owner)
            .into_iter()
            .filter(|t| range.map_or(true, |r| r.contains(t.date)))
            .collect();
        tasks.sort_by(|a, b| a.date.cmp(&b.date));
        Ok(tasks)
    }

    async fn update(&self, owner: UserId, id: Uuid, patch: &TaskPatch) -> anyhow::Result<Option<Task>> {
        let mut tasks = self.tasks.lock().unwrap();
        let Some(task) = tasks.iter_mut().find(|t| t.id == id && t.user_id == owner) else {
            return Ok(None);
        };
        if let Some(date) = patch.date {
            task.date = date;
        }
        if let Some(company_name) = &patch.company_name {
            task.company_name = company_name.clone();
        }
        if let Some(description) = &patch.description {
            task.description = description.clone();
        }
        if let Some(is_completed) = patch.is_completed {
            task.is_completed = is_completed;
        }
        task.updated_at = OffsetDateTime::now_utc();
        Ok(Some(task.clone()))
    }

    async fn delete(&self, owner: UserId, id: Uuid) -> anyhow::Result<bool> {
        let mut tasks = self.tasks.lock().unwrap();
        let before = tasks.len();
        tasks.retain(|t| !(t.id == id && t.user_id == owner));
        Ok(tasks.len() < before)
    }

    async fn search_company(&self, owner: UserId, needle: &str, limit: i64) -> anyhow::Result<Vec<Task>> {
        let needle = needle.to_lowercase();
        let mut tasks: Vec<Task> = self
            .owned(owner)
            .into_iter()
            .filter(|t| t.company_name.to_lowercase().contains(&needle))
            .collect();
        newest_first(&mut tasks);
        tasks.truncate(limit.max(0) as usize);
        Ok(tasks)
    }

    async fn company_summary(&self, owner: UserId) -> anyhow::Result<Vec<CompanyStat>> {
        let mut stats: Vec<CompanyStat> = Vec::new();
        for task in self.owned(owner) {
            match stats.iter_mut().find(|s| s.company_name == task.company_name) {
                Some(stat) => {
                    stat.visit_count += 1;
                    stat.last_visit = stat.last_visit.max(task.date);
                }
                None => stats.push(CompanyStat {
                    company_name: task.company_name,
                    visit_count: 1,
                    last_visit: task.date,
                }),
            }
        }
        stats.sort_by(|a, b| a.company_name.cmp(&b.company_name));
        Ok(stats)
    }

    async fn by_company(&self, owner: UserId, company_name: &str) -> anyhow::Result<Vec<Task>> {
        let mut tasks: Vec<Task> = self
            .owned(owner)
            .into_iter()
            .filter(|t| t.company_name == company_name)
            .collect();
        newest_first(&mut tasks);
        Ok(tasks)
    }
}
