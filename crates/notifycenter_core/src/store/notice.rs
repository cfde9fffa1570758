//! User-visible transient notices (toasts) raised by store operations.

/// Notice severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// One transient message for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub description: Option<String>,
}

impl Notice {
    pub fn info(title: impl Into<String>, description: Option<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            title: title.into(),
            description,
        }
    }

    pub fn error(description: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            title: "Error".to_string(),
            description: Some(description.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}
