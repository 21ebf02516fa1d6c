//! Status icons for CLI output

/// Status icons for different states
pub struct StatusIcon;

impl StatusIcon {
    /// Success icon (rollout complete)
    pub const SUCCESS: &'static str = "✓";

    /// Warning icon (rollout in progress)
    pub const WARNING: &'static str = "⚠";

    /// Error icon (nothing running)
    pub const ERROR: &'static str = "✗";

    /// Pending icon (waiting)
    pub const PENDING: &'static str = "⏳";

    /// Unknown icon
    pub const UNKNOWN: &'static str = "?";

    /// Get status icon based on running/desired counts
    pub fn get_rollout_icon(running: i32, desired: i32) -> &'static str {
        if desired == 0 {
            Self::UNKNOWN
        } else if running >= desired {
            Self::SUCCESS
        } else if running > 0 {
            Self::WARNING
        } else {
            Self::ERROR
        }
    }

    /// Get icon for a deployment status string (PRIMARY / ACTIVE / ...)
    pub fn get_deployment_icon(status: &str) -> &'static str {
        match status {
            "PRIMARY" => Self::SUCCESS,
            "ACTIVE" => Self::PENDING,
            "DRAINING" => Self::WARNING,
            _ => Self::UNKNOWN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rollout_icon() {
        assert_eq!(StatusIcon::get_rollout_icon(3, 3), StatusIcon::SUCCESS);
        assert_eq!(StatusIcon::get_rollout_icon(1, 3), StatusIcon::WARNING);
        assert_eq!(StatusIcon::get_rollout_icon(0, 3), StatusIcon::ERROR);
        assert_eq!(StatusIcon::get_rollout_icon(0, 0), StatusIcon::UNKNOWN);
    }

    #[test]
    fn test_deployment_icon() {
        assert_eq!(StatusIcon::get_deployment_icon("PRIMARY"), StatusIcon::SUCCESS);
        assert_eq!(StatusIcon::get_deployment_icon("ACTIVE"), StatusIcon::PENDING);
        assert_eq!(StatusIcon::get_deployment_icon("whatever"), StatusIcon::UNKNOWN);
    }
}
