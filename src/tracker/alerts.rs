use chrono::Duration;

use crate::config::NotificationConfig;

/// How insistent a notification should be. Maps onto the tray icon levels of
/// a graphical shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Information,
    Warning,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Alert {
    pub message: &'static str,
    pub severity: Severity,
}

const INFORMATION_ALERT: Alert = Alert {
    message: "Finish now!",
    severity: Severity::Information,
};
const WARNING_ALERT: Alert = Alert {
    message: "Tomorrow is a new day!",
    severity: Severity::Warning,
};
const CRITICAL_ALERT: Alert = Alert {
    message: "GO HOME NOW!",
    severity: Severity::Critical,
};

/// One-shot elapsed-time alerts. Each threshold fires at most once per
/// session, earliest threshold first, at most one alert per check. Pausing
/// does not rearm anything, only [AlertPolicy::reset] does.
pub struct AlertPolicy {
    information: Duration,
    warning: Duration,
    critical: Duration,
    information_shown: bool,
    warning_shown: bool,
    critical_shown: bool,
}

impl AlertPolicy {
    pub fn new(config: &NotificationConfig) -> Self {
        Self {
            information: config.information.as_duration(),
            warning: config.warning.as_duration(),
            critical: config.critical.as_duration(),
            information_shown: false,
            warning_shown: false,
            critical_shown: false,
        }
    }

    pub fn check(&mut self, elapsed: Duration) -> Option<Alert> {
        if elapsed >= self.information && !self.information_shown {
            self.information_shown = true;
            return Some(INFORMATION_ALERT);
        }
        if elapsed >= self.warning && !self.warning_shown {
            self.warning_shown = true;
            return Some(WARNING_ALERT);
        }
        if elapsed >= self.critical && !self.critical_shown {
            self.critical_shown = true;
            return Some(CRITICAL_ALERT);
        }
        None
    }

    pub fn reset(&mut self) {
        self.information_shown = false;
        self.warning_shown = false;
        self.critical_shown = false;
    }

    pub fn any_shown(&self) -> bool {
        self.information_shown || self.warning_shown || self.critical_shown
    }
}
