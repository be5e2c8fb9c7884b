//! Table rendering for CLI output

use super::colors::table_color_to_colored_str;
use super::{ColorTheme, StatusIcon};
use crate::domain::engine::Capabilities;
use crate::domain::mounts::MountManifest;
use crate::domain::plan::{LifecycleTag, TaskPlan};
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, ContentArrangement, Table};

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
    pub fn new() -> Self {
        Self {
            theme: ColorTheme::default(),
        }
    }

    /// Render the plan as one row per task, in document order
    pub fn render_plan(&self, project_name: &str, plan: &TaskPlan) -> String {
        if plan.is_empty() {
            return format!("No tasks planned for {}", project_name);
        }

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new("#").set_alignment(CellAlignment::Right),
                Cell::new("TASK").set_alignment(CellAlignment::Left),
                Cell::new("KIND").set_alignment(CellAlignment::Left),
                Cell::new("STATE").set_alignment(CellAlignment::Center),
                Cell::new("TAGS").set_alignment(CellAlignment::Left),
            ]);

        for (index, task) in plan.tasks().iter().enumerate() {
            let state = task.state();
            let tags = task
                .tags
                .iter()
                .map(|t| t.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            // Color a row by its primary tag.
            let tag_color = task
                .tags
                .iter()
                .next()
                .map(|t| self.theme.tag_color(*t))
                .unwrap_or(self.theme.muted);

            table.add_row(vec![
                Cell::new(index + 1).set_alignment(CellAlignment::Right),
                Cell::new(&task.name),
                Cell::new(task.kind.as_str()),
                Cell::new(format!("{} {}", StatusIcon::state_icon(state), state.as_str()))
                    .fg(self.theme.state_color(state)),
                Cell::new(tags).fg(tag_color),
            ]);
        }

        let mut output = String::new();
        output.push_str(&format!(
            "╭─ Plan for {} {} ─╮\n",
            project_name,
            format!("[{} tasks]", plan.len()).bright_black()
        ));
        output.push_str(&table.to_string());
        output.push('\n');

        let legend = LifecycleTag::ALL
            .iter()
            .map(|tag| {
                let color = table_color_to_colored_str(self.theme.tag_color(*tag));
                format!("{} {}", tag.as_str().color(color), plan.with_tag(*tag).len())
            })
            .collect::<Vec<_>>()
            .join("  ");
        output.push_str(&format!("Tags: {}\n", legend));

        output
    }

    pub fn render_capabilities(&self, display_name: &str, capabilities: &Capabilities) -> String {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new(format!("{} CAPABILITY", display_name.to_uppercase())),
                Cell::new("SUPPORTED").set_alignment(CellAlignment::Center),
            ]);

        for (name, enabled) in capabilities.entries() {
            table.add_row(vec![
                Cell::new(name),
                Cell::new(StatusIcon::flag_icon(enabled))
                    .fg(self.theme.flag_color(enabled))
                    .set_alignment(CellAlignment::Center),
            ]);
        }

        table.to_string()
    }

    pub fn render_mounts(&self, manifest: &MountManifest) -> String {
        if manifest.is_empty() {
            return "No credential mounts required".to_string();
        }

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new("HOST PATH"),
                Cell::new("MOUNT POINT"),
                Cell::new("MODE").set_alignment(CellAlignment::Center),
            ]);

        for (host, mount) in manifest.iter() {
            table.add_row(vec![
                Cell::new(host),
                Cell::new(&mount.bind),
                Cell::new(format!("{} {}", StatusIcon::LOCKED, mount.mode.as_str()))
                    .set_alignment(CellAlignment::Center),
            ]);
        }

        table.to_string()
    }
}
