//! Table rendering for CLI output

use super::{ColorTheme, StatusIcon};
use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, Color, ContentArrangement, Table};

use crate::domain::service::Service;
use crate::shared::arn;

/// Table renderer for formatted output
pub struct TableRenderer {
    theme: ColorTheme,
}

impl Default for TableRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TableRenderer {
    /// Create a new table renderer with default theme
    pub fn new() -> Self {
        Self {
            theme: ColorTheme::default(),
        }
    }

    /// Render a service's deployment status as a formatted block
    pub fn render_service_status(&self, cluster: &str, service: &Service) -> String {
        let mut output = String::new();
        output.push_str(&format!("Cluster:          {}\n", cluster));
        output.push_str(&format!("Service:          {}\n", service.name));
        output.push_str(&format!(
            "Task definition:  {}\n",
            arn::revision_name(&service.task_definition)
        ));
        output.push_str(&format!(
            "Tasks:            {} {}/{} running, {} pending\n",
            StatusIcon::get_rollout_icon(service.running_count, service.desired_count),
            service.running_count,
            service.desired_count,
            service.pending_count,
        ));
        output.push_str("Deployments:\n");
        output.push_str(&self.render_deployments(service));
        output
    }

    /// Render a service's deployments as a table
    pub fn render_deployments(&self, service: &Service) -> String {
        if service.deployments.is_empty() {
            return "  (none)\n".to_string();
        }

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new("REVISION").set_alignment(CellAlignment::Left),
                Cell::new("STATUS").set_alignment(CellAlignment::Center),
                Cell::new("DESIRED").set_alignment(CellAlignment::Center),
                Cell::new("PENDING").set_alignment(CellAlignment::Center),
                Cell::new("RUNNING").set_alignment(CellAlignment::Center),
                Cell::new("CREATED").set_alignment(CellAlignment::Left),
            ]);

        for deployment in &service.deployments {
            let icon = StatusIcon::get_deployment_icon(&deployment.status);
            let count_color = self
                .theme
                .get_rollout_color(deployment.running_count, deployment.desired_count);
            let status_color = match deployment.status.as_str() {
                "PRIMARY" => Color::Green,
                "DRAINING" => Color::Yellow,
                _ => Color::Grey,
            };
            let created = deployment
                .created_at
                .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
                .unwrap_or_else(|| "-".to_string());

            table.add_row(vec![
                Cell::new(arn::revision_name(&deployment.task_definition)),
                Cell::new(format!("{} {}", icon, deployment.status)).fg(status_color),
                Cell::new(deployment.desired_count.to_string()),
                Cell::new(deployment.pending_count.to_string()),
                Cell::new(deployment.running_count.to_string()).fg(count_color),
                Cell::new(created),
            ]);
        }

        format!("{}\n", table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::service::Deployment;

    fn sample_service() -> Service {
        Service {
            arn: "arn:aws:ecs:us-west-2:123456789012:service/default/web".to_string(),
            name: "web".to_string(),
            cluster_arn: "arn:aws:ecs:us-west-2:123456789012:cluster/default".to_string(),
            task_definition: "arn:aws:ecs:us-west-2:123456789012:task-definition/web:12"
                .to_string(),
            status: Some("ACTIVE".to_string()),
            desired_count: 2,
            running_count: 2,
            pending_count: 0,
            deployments: vec![Deployment {
                task_definition: "arn:aws:ecs:us-west-2:123456789012:task-definition/web:12"
                    .to_string(),
                status: "PRIMARY".to_string(),
                desired_count: 2,
                pending_count: 0,
                running_count: 2,
                created_at: None,
            }],
            events: Vec::new(),
        }
    }

    #[test]
    fn test_render_service_status_includes_revision() {
        let renderer = TableRenderer::new();
        let output = renderer.render_service_status("default", &sample_service());
        assert!(output.contains("web:12"));
        assert!(output.contains("2/2 running"));
    }

    #[test]
    fn test_render_deployments_empty() {
        let renderer = TableRenderer::new();
        let mut service = sample_service();
        service.deployments.clear();
        assert_eq!(renderer.render_deployments(&service), "  (none)\n");
    }
}
