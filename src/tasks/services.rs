use std::sync::Arc;

use time::{Date, Month};
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::claims::Session;
use crate::error::AppError;
use crate::tasks::{
    repo::TaskStore,
    repo_types::{parse_calendar_date, DateRange, Task, TaskDraft, TaskPatch},
};

/// Raw create input; validated and trimmed by [`TaskService::create`].
#[derive(Debug, Clone, Default)]
pub struct NewTaskInput {
    pub date: Option<String>,
    pub company_name: Option<String>,
    pub description: Option<String>,
    pub is_completed: Option<bool>,
}

/// Raw partial update input.
#[derive(Debug, Clone, Default)]
pub struct TaskUpdateInput {
    pub date: Option<String>,
    pub company_name: Option<String>,
    pub description: Option<String>,
    pub is_completed: Option<bool>,
}

/// A calendar month; `month` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthFilter {
    pub month: u8,
    pub year: i32,
}

impl MonthFilter {
    /// First through last day of the month, inclusive.
    pub fn range(&self) -> Result<DateRange, AppError> {
        let month = Month::try_from(self.month)
            .map_err(|_| AppError::validation("month must be between 1 and 12"))?;
        let first = Date::from_calendar_date(self.year, month, 1)
            .map_err(|_| AppError::validation("year is out of range"))?;
        let last = Date::from_calendar_date(self.year, month, month.length(self.year))
            .map_err(|_| AppError::validation("year is out of range"))?;
        Ok(DateRange { first, last })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_date(raw: &str) -> Result<Date, AppError> {
    parse_calendar_date(raw).ok_or_else(|| AppError::validation("date must be a valid calendar date"))
}

pub(crate) fn task_not_found() -> AppError {
    AppError::not_found("task not found")
}

/// Owner-scoped CRUD over tasks.
pub struct TaskService {
    store: Arc<dyn TaskStore>,
}

impl TaskService {
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, session: &Session, input: NewTaskInput) -> Result<Task, AppError> {
        let (Some(date), Some(company_name), Some(description)) = (
            non_blank(input.date),
            non_blank(input.company_name),
            non_blank(input.description),
        ) else {
            return Err(AppError::validation(
                "date, company name and description are required",
            ));
        };
        let draft = TaskDraft {
            date: parse_date(&date)?,
            company_name,
            description,
            is_completed: input.is_completed.unwrap_or(false),
        };

        let task = self.store.insert(session.user_id, &draft).await?;
        info!(user_id = %session.user_id, task_id = %task.id, "task created");
        Ok(task)
    }

    pub async fn list(&self, session: &Session, filter: Option<MonthFilter>) -> Result<Vec<Task>, AppError> {
        let range = filter.map(|f| f.range()).transpose()?;
        Ok(self.store.list(session.user_id, range).await?)
    }

    pub async fn update(
        &self,
        session: &Session,
        task_id: Uuid,
        input: TaskUpdateInput,
    ) -> Result<Task, AppError> {
        let patch = validate_patch(input)?;
        let task = self
            .store
            .update(session.user_id, task_id, &patch)
            .await?
            .ok_or_else(|| {
                warn!(user_id = %session.user_id, %task_id, "update of missing or foreign task");
                task_not_found()
            })?;
        info!(user_id = %session.user_id, %task_id, "task updated");
        Ok(task)
    }

    pub async fn delete(&self, session: &Session, task_id: Uuid) -> Result<(), AppError> {
        if !self.store.delete(session.user_id, task_id).await? {
            warn!(user_id = %session.user_id, %task_id, "delete of missing or foreign task");
            return Err(task_not_found());
        }
        info!(user_id = %session.user_id, %task_id, "task deleted");
        Ok(())
    }
}

/// Supplied text fields must stay non-empty after trimming; a blank date counts as absent.
fn validate_patch(input: TaskUpdateInput) -> Result<TaskPatch, AppError> {
    let date = match input.date.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => Some(parse_date(raw)?),
        _ => None,
    };
    let company_name = input
        .company_name
        .map(|v| non_blank(Some(v)).ok_or_else(|| AppError::validation("company name cannot be empty")))
        .transpose()?;
    let description = input
        .description
        .map(|v| non_blank(Some(v)).ok_or_else(|| AppError::validation("description cannot be empty")))
        .transpose()?;
    Ok(TaskPatch {
        date,
        company_name,
        description,
        is_completed: input.is_completed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repo_types::UserId;
    use crate::testing::MemoryTaskStore;
    use time::macros::date;

    fn session(name: &str) -> Session {
        Session {
            user_id: UserId::new(),
            name: name.into(),
            email: format!("{}@example.com", name.to_lowercase()),
        }
    }

    fn service() -> TaskService {
        TaskService::new(Arc::new(MemoryTaskStore::default()))
    }

    fn input(date: &str, company: &str, description: &str) -> NewTaskInput {
        NewTaskInput {
            date: Some(date.into()),
            company_name: Some(company.into()),
            description: Some(description.into()),
            is_completed: None,
        }
    }

    #[test]
    fn month_filter_bounds() {
        let r = MonthFilter { month: 2, year: 2024 }.range().unwrap();
        assert_eq!(r.first, date!(2024 - 02 - 01));
        assert_eq!(r.last, date!(2024 - 02 - 29));
        let r = MonthFilter { month: 12, year: 2023 }.range().unwrap();
        assert_eq!(r.last, date!(2023 - 12 - 31));
        assert!(MonthFilter { month: 0, year: 2024 }.range().is_err());
        assert!(MonthFilter { month: 13, year: 2024 }.range().is_err());
    }

    #[tokio::test]
    async fn create_then_list_returns_trimmed_task() {
        let svc = service();
        let alice = session("Alice");
        let created = svc
            .create(&alice, input("2024-03-15", "  Acme  ", "\tinstall printer \n"))
            .await
            .unwrap();

        let tasks = svc.list(&alice, None).await.unwrap();
        assert_eq!(tasks, vec![created.clone()]);
        assert_eq!(created.company_name, "Acme");
        assert_eq!(created.description, "install printer");
        assert_eq!(created.date, date!(2024 - 03 - 15));
        assert!(!created.is_completed);
        assert_eq!(created.user_id, alice.user_id);
    }

    #[tokio::test]
    async fn create_rejects_missing_or_blank_fields() {
        let svc = service();
        let alice = session("Alice");
        for bad in [
            input("", "Acme", "visit"),
            input("2024-03-15", "   ", "visit"),
            input("2024-03-15", "Acme", ""),
            NewTaskInput::default(),
        ] {
            let err = svc.create(&alice, bad).await.unwrap_err();
            assert!(matches!(err, AppError::Validation(_)));
        }
        let err = svc.create(&alice, input("2024-13-01", "Acme", "visit")).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(svc.list(&alice, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_orders_by_date_and_filters_by_month() {
        let svc = service();
        let alice = session("Alice");
        svc.create(&alice, input("2024-04-01", "Globex", "b")).await.unwrap();
        svc.create(&alice, input("2024-03-15", "Acme", "a")).await.unwrap();
        svc.create(&alice, input("2024-03-31", "Initech", "c")).await.unwrap();

        let all = svc.list(&alice, None).await.unwrap();
        let dates: Vec<_> = all.iter().map(|t| t.date).collect();
        assert_eq!(
            dates,
            vec![date!(2024 - 03 - 15), date!(2024 - 03 - 31), date!(2024 - 04 - 01)]
        );

        let march = svc
            .list(&alice, Some(MonthFilter { month: 3, year: 2024 }))
            .await
            .unwrap();
        assert_eq!(march.len(), 2);
        assert!(march.iter().any(|t| t.company_name == "Acme"));

        let april = svc
            .list(&alice, Some(MonthFilter { month: 4, year: 2024 }))
            .await
            .unwrap();
        assert_eq!(april.len(), 1);
        assert!(april.iter().all(|t| t.company_name != "Acme"));
    }

    #[tokio::test]
    async fn list_never_leaks_other_owners() {
        let svc = service();
        let alice = session("Alice");
        let bob = session("Bob");
        svc.create(&alice, input("2024-03-15", "Acme", "a")).await.unwrap();
        assert!(svc.list(&bob, None).await.unwrap().is_empty());
        assert!(svc
            .list(&bob, Some(MonthFilter { month: 3, year: 2024 }))
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn update_changes_only_supplied_fields_and_is_idempotent() {
        let svc = service();
        let alice = session("Alice");
        let task = svc.create(&alice, input("2024-03-15", "Acme", "visit")).await.unwrap();

        let patch = TaskUpdateInput {
            description: Some("  follow-up visit ".into()),
            is_completed: Some(true),
            ..Default::default()
        };
        let first = svc.update(&alice, task.id, patch.clone()).await.unwrap();
        assert_eq!(first.description, "follow-up visit");
        assert!(first.is_completed);
        assert_eq!(first.company_name, "Acme");
        assert_eq!(first.date, task.date);

        let second = svc.update(&alice, task.id, patch).await.unwrap();
        assert_eq!(
            (second.date, &second.company_name, &second.description, second.is_completed),
            (first.date, &first.company_name, &first.description, first.is_completed)
        );
    }

    #[tokio::test]
    async fn update_toggles_completion_and_moves_date() {
        let svc = service();
        let alice = session("Alice");
        let task = svc.create(&alice, input("2024-03-15", "Acme", "visit")).await.unwrap();

        let moved = svc
            .update(
                &alice,
                task.id,
                TaskUpdateInput {
                    date: Some("2024-05-02T09:00:00Z".into()),
                    is_completed: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(moved.date, date!(2024 - 05 - 02));

        let reopened = svc
            .update(
                &alice,
                task.id,
                TaskUpdateInput {
                    date: Some("   ".into()),
                    is_completed: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(!reopened.is_completed);
        assert_eq!(reopened.date, date!(2024 - 05 - 02));
    }

    #[tokio::test]
    async fn update_rejects_blank_text_fields() {
        let svc = service();
        let alice = session("Alice");
        let task = svc.create(&alice, input("2024-03-15", "Acme", "visit")).await.unwrap();
        let err = svc
            .update(
                &alice,
                task.id,
                TaskUpdateInput {
                    company_name: Some("  ".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn foreign_and_missing_tasks_look_identical() {
        let svc = service();
        let alice = session("Alice");
        let bob = session("Bob");
        let task = svc.create(&alice, input("2024-03-15", "Acme", "visit")).await.unwrap();

        let update = TaskUpdateInput {
            is_completed: Some(true),
            ..Default::default()
        };
        let foreign = svc.update(&bob, task.id, update.clone()).await.unwrap_err();
        let missing = svc.update(&bob, Uuid::new_v4(), update).await.unwrap_err();
        assert!(matches!(foreign, AppError::NotFound(_)));
        assert_eq!(foreign.to_string(), missing.to_string());

        let foreign = svc.delete(&bob, task.id).await.unwrap_err();
        let missing = svc.delete(&bob, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(foreign, AppError::NotFound(_)));
        assert_eq!(foreign.to_string(), missing.to_string());

        let still_there = svc.list(&alice, None).await.unwrap();
        assert_eq!(still_there, vec![task]);
    }

    #[tokio::test]
    async fn delete_is_immediate() {
        let svc = service();
        let alice = session("Alice");
        let task = svc.create(&alice, input("2024-03-15", "Acme", "visit")).await.unwrap();
        svc.delete(&alice, task.id).await.unwrap();
        assert!(svc.list(&alice, None).await.unwrap().is_empty());
        let err = svc.delete(&alice, task.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
