//! Monitoring plugin verdict model.
//!
//! A [`Monitoring`] carries the status, the message lines and the performance
//! data produced by one check, and renders them following the Nagios plugin
//! output convention.

use std::fmt;

/// Plugin status, ordered by severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Status {
    /// Everything is fine.
    #[default]
    Ok,
    /// Something looks wrong but does not need immediate action.
    Warning,
    /// The checked resource could not be found or evaluated.
    Unknown,
    /// Something is broken.
    Critical,
}

impl Status {
    /// Process exit code for this status.
    #[must_use]
    pub fn exit_code(self) -> i32 {
        match self {
            Self::Ok => 0,
            Self::Warning => 1,
            Self::Critical => 2,
            Self::Unknown => 3,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "OK"),
            Self::Warning => write!(f, "WARNING"),
            Self::Critical => write!(f, "CRITICAL"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// One performance data value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Perfdata {
    /// Metric label.
    pub label: String,
    /// Metric value.
    pub value: usize,
    /// Unit of measure, empty for plain counters.
    pub unit: String,
}

impl fmt::Display for Perfdata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}{};;;;", self.label, self.value, self.unit)
    }
}

/// Result of a single check.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Monitoring {
    status: Status,
    messages: Vec<String>,
    perfdata: Vec<Perfdata>,
}

impl Monitoring {
    /// Create an empty OK result.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an UNKNOWN result with a single message.
    #[must_use]
    pub fn unknown(message: impl Into<String>) -> Self {
        let mut monitoring = Self::new();
        monitoring.set_status(Status::Unknown);
        monitoring.add_message(message);
        monitoring
    }

    /// Current status.
    #[must_use]
    pub fn status(&self) -> Status {
        self.status
    }

    /// Force the status. Only meant for the initial verdict of a check,
    /// later branches go through [`Monitoring::escalate`].
    pub fn set_status(&mut self, status: Status) {
        self.status = status;
    }

    /// Raise the status to `status` if it is more severe than the current one.
    pub fn escalate(&mut self, status: Status) {
        if status > self.status {
            self.status = status;
        }
    }

    /// Append a message line.
    pub fn add_message(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    /// Message lines, in insertion order.
    #[must_use]
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Record a performance value. A label that already exists is overwritten
    /// in place.
    pub fn add_perfdata(&mut self, label: impl Into<String>, value: usize, unit: impl Into<String>) {
        let label = label.into();
        let unit = unit.into();
        if let Some(existing) = self.perfdata.iter_mut().find(|p| p.label == label) {
            existing.value = value;
            existing.unit = unit;
        } else {
            self.perfdata.push(Perfdata { label, value, unit });
        }
    }

    /// All performance values, in insertion order.
    #[must_use]
    pub fn perfdata(&self) -> &[Perfdata] {
        &self.perfdata
    }

    /// Look up a performance value by label.
    #[must_use]
    pub fn perfdata_value(&self, label: &str) -> Option<usize> {
        self.perfdata
            .iter()
            .find(|p| p.label == label)
            .map(|p| p.value)
    }

    /// Process exit code matching the status.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        self.status.exit_code()
    }
}

impl fmt::Display for Monitoring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lines = self.messages.iter();
        write!(f, "{}: {}", self.status, lines.next().map_or("", String::as_str))?;

        if !self.perfdata.is_empty() {
            write!(f, " |")?;
            for perfdata in &self.perfdata {
                write!(f, " {perfdata}")?;
            }
        }

        for line in lines {
            write!(f, "\n{line}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_monitoring_is_ok() {
        let monitoring = Monitoring::new();
        assert_eq!(monitoring.status(), Status::Ok);
        assert!(monitoring.messages().is_empty());
        assert_eq!(monitoring.exit_code(), 0);
    }

    #[test]
    fn test_escalate_never_downgrades() {
        let mut monitoring = Monitoring::new();
        monitoring.escalate(Status::Critical);
        monitoring.escalate(Status::Ok);
        monitoring.escalate(Status::Warning);
        assert_eq!(monitoring.status(), Status::Critical);
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(Status::Ok.exit_code(), 0);
        assert_eq!(Status::Warning.exit_code(), 1);
        assert_eq!(Status::Critical.exit_code(), 2);
        assert_eq!(Status::Unknown.exit_code(), 3);
    }

    #[test]
    fn test_perfdata_label_is_replaced() {
        let mut monitoring = Monitoring::new();
        monitoring.add_perfdata("nbIndices", 1, "");
        monitoring.add_perfdata("nbIndicesLocked", 0, "");
        monitoring.add_perfdata("nbIndices", 4, "");

        assert_eq!(monitoring.perfdata().len(), 2);
        assert_eq!(monitoring.perfdata_value("nbIndices"), Some(4));
        assert_eq!(monitoring.perfdata()[0].label, "nbIndices");
    }

    #[test]
    fn test_render_plugin_output() {
        let mut monitoring = Monitoring::new();
        monitoring.set_status(Status::Critical);
        monitoring.add_message("There are 1 indices failed");
        monitoring.add_message("Indice logs (hot): disk full");
        monitoring.add_perfdata("NbIndiceFailed", 1, "");

        assert_eq!(
            monitoring.to_string(),
            "CRITICAL: There are 1 indices failed | NbIndiceFailed=1;;;;\nIndice logs (hot): disk full"
        );
    }

    #[test]
    fn test_render_without_perfdata() {
        let monitoring = Monitoring::unknown("ILM status not found");
        assert_eq!(monitoring.to_string(), "UNKNOWN: ILM status not found");
        assert_eq!(monitoring.exit_code(), 3);
    }
}
