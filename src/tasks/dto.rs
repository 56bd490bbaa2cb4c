use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::tasks::{
    repo_types::Task,
    services::{MonthFilter, NewTaskInput, TaskUpdateInput},
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateTaskRequest {
    pub date: Option<String>,
    pub company_name: Option<String>,
    pub description: Option<String>,
    pub is_completed: Option<bool>,
}

impl From<CreateTaskRequest> for NewTaskInput {
    fn from(r: CreateTaskRequest) -> Self {
        Self {
            date: r.date,
            company_name: r.company_name,
            description: r.description,
            is_completed: r.is_completed,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateTaskRequest {
    pub date: Option<String>,
    pub company_name: Option<String>,
    pub description: Option<String>,
    pub is_completed: Option<bool>,
}

impl From<UpdateTaskRequest> for TaskUpdateInput {
    fn from(r: UpdateTaskRequest) -> Self {
        Self {
            date: r.date,
            company_name: r.company_name,
            description: r.description,
            is_completed: r.is_completed,
        }
    }
}

/// `?month=3&year=2024`; the filter applies only when both are present.
/// Values stay strings so that `?month=&year=` reads as "no filter".
#[derive(Debug, Default, Deserialize)]
pub struct ListTasksQuery {
    pub month: Option<String>,
    pub year: Option<String>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl ListTasksQuery {
    pub fn month_filter(&self) -> Result<Option<MonthFilter>, AppError> {
        let (Some(month), Some(year)) = (present(&self.month), present(&self.year)) else {
            return Ok(None);
        };
        let month = month
            .parse::<u8>()
            .map_err(|_| AppError::validation("month must be between 1 and 12"))?;
        let year = year
            .parse::<i32>()
            .map_err(|_| AppError::validation("year must be a number"))?;
        Ok(Some(MonthFilter { month, year }))
    }
}

#[derive(Debug, Serialize)]
pub struct TasksResponse {
    pub tasks: Vec<Task>,
}

#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub task: Task,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}
