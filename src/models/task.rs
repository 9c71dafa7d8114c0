use serde::{Deserialize, Serialize};

use super::TaskConfig;

/// Server-side lifecycle status of a generation task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl TaskStatus {
    /// Completed or failed tasks no longer change without a resume.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskStatus::Pending => write!(f, "pending"),
            TaskStatus::Processing => write!(f, "processing"),
            TaskStatus::Completed => write!(f, "completed"),
            TaskStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Token accounting reported for a task run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenUsage {
    #[serde(default)]
    pub synthesizer_tokens: u64,
    #[serde(default)]
    pub trainee_tokens: u64,
    #[serde(default)]
    pub total_tokens: u64,
}

/// Generation task as reported by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub task_id: String,
    #[serde(default)]
    pub task_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_description: Option<String>,
    #[serde(default)]
    pub filenames: Vec<String>,
    #[serde(default)]
    pub filepaths: Vec<String>,
    pub status: TaskStatus,
    #[serde(default)]
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_usage: Option<TokenUsage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qa_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<TaskConfig>,
    /// Single-file layout used by older backends.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
}

impl Task {
    /// Create a pending task with no files
    pub fn new(task_id: impl Into<String>, task_name: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            task_name: task_name.into(),
            task_description: None,
            filenames: Vec::new(),
            filepaths: Vec::new(),
            status: TaskStatus::Pending,
            created_at: String::new(),
            started_at: None,
            completed_at: None,
            error_message: None,
            output_file: None,
            token_usage: None,
            processing_time: None,
            qa_count: None,
            config: None,
            filename: None,
            file_path: None,
        }
    }

    /// Set status
    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    /// Fold legacy single-file fields into the file lists.
    pub fn normalized(mut self) -> Self {
        if self.filenames.is_empty() {
            if let Some(name) = self.filename.clone() {
                self.filenames.push(name);
            }
        }
        if self.filepaths.is_empty() {
            if let Some(path) = self.file_path.clone() {
                self.filepaths.push(path);
            }
        }
        self
    }
}

/// Kind of task to create
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    #[default]
    Sft,
    Evaluation,
}

/// Body of `POST /tasks`
#[derive(Debug, Clone, Serialize)]
pub struct CreateTaskRequest {
    pub task_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_description: Option<String>,
    pub task_type: TaskType,
    pub filenames: Vec<String>,
    pub filepaths: Vec<String>,
}

impl CreateTaskRequest {
    /// New SFT task over already uploaded files
    pub fn new(task_name: impl Into<String>, filenames: Vec<String>, filepaths: Vec<String>) -> Self {
        Self {
            task_name: task_name.into(),
            task_description: None,
            task_type: TaskType::Sft,
            filenames,
            filepaths,
        }
    }

    /// Set description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.task_description = Some(description.into());
        self
    }

    /// Set task type
    pub fn with_type(mut self, task_type: TaskType) -> Self {
        self.task_type = task_type;
        self
    }
}

/// Per-status task counts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStats {
    #[serde(default)]
    pub total: usize,
    #[serde(default)]
    pub pending: usize,
    #[serde(default)]
    pub processing: usize,
    #[serde(default)]
    pub completed: usize,
    #[serde(default)]
    pub failed: usize,
}

impl TaskStats {
    /// Count a task list locally
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let mut stats = Self {
            total: tasks.len(),
            ..Self::default()
        };
        for task in tasks {
            match task.status {
                TaskStatus::Pending => stats.pending += 1,
                TaskStatus::Processing => stats.processing += 1,
                TaskStatus::Completed => stats.completed += 1,
                TaskStatus::Failed => stats.failed += 1,
            }
        }
        stats
    }
}

/// Export format for download endpoints
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DownloadFormat {
    #[default]
    Json,
    Csv,
}

impl DownloadFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            DownloadFormat::Json => "json",
            DownloadFormat::Csv => "csv",
        }
    }
}

/// Body of `POST /test-connection`
#[derive(Debug, Clone, Serialize)]
pub struct TestConnectionRequest {
    pub base_url: String,
    pub api_key: String,
    pub model_name: String,
}
