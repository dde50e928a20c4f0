use crate::log_level::LogLevel;
use chrono::Local;

/// One formatted line on its way to the writer thread.
#[derive(Debug, Clone)]
pub(crate) struct LogRecord {
    pub timestamp: String,
    pub level: LogLevel,
    pub component: Option<String>,
    pub message: String,
}

impl LogRecord {
    pub fn new(level: LogLevel, component: Option<&str>, message: &str) -> Self {
        Self {
            timestamp: Local::now().format("%Y-%m-%d %H:%M:%S%.3f").to_string(),
            level,
            component: component.map(str::to_string),
            message: message.to_string(),
        }
    }

    /// `[timestamp] LEVEL [component]: message`, newline terminated.
    pub fn render(&self) -> String {
        match &self.component {
            Some(component) => format!(
                "[{}] {} [{}]: {}\n",
                self.timestamp, self.level, component, self.message
            ),
            None => format!("[{}] {}: {}\n", self.timestamp, self.level, self.message),
        }
    }
}
