//! Output rendering and formatting

use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Color, ContentArrangement, Table};
use console::style;
use nodeup_install::{HostReport, InstallOutcome};
use std::io;

/// Output renderer for command results
#[derive(Clone)]
pub struct OutputRenderer {
    /// Use JSON output format
    json_output: bool,
    colors_enabled: bool,
}

fn yes_no(value: bool, good: bool, colors: bool) -> Cell {
    let cell = Cell::new(if value { "yes" } else { "no" });
    if !colors {
        return cell;
    }
    if value == good {
        cell.fg(Color::Green)
    } else {
        cell.fg(Color::Red)
    }
}

impl OutputRenderer {
    pub fn new(json_output: bool, colors_enabled: bool) -> Self {
        Self {
            json_output,
            colors_enabled,
        }
    }

    /// Render the host readiness report
    pub fn render_host_report(&self, report: &HostReport) -> io::Result<()> {
        if self.json_output {
            let json = serde_json::to_string_pretty(report).map_err(io::Error::other)?;
            println!("{json}");
            return Ok(());
        }

        println!("Running as root: {}", if report.root { "yes" } else { "no" });
        if !report.root {
            println!("Port checks need root; results below may report ports as busy.");
        }

        let mut ports = Table::new();
        ports
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new("Port").add_attribute(Attribute::Bold),
                Cell::new("Available").add_attribute(Attribute::Bold),
            ]);
        for (port, available) in &report.ports {
            ports.add_row(vec![
                Cell::new(port),
                yes_no(*available, true, self.colors_enabled),
            ]);
        }
        println!("{ports}");

        let mut runtimes = Table::new();
        runtimes
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new("Runtime").add_attribute(Attribute::Bold),
                Cell::new("Installed").add_attribute(Attribute::Bold),
                Cell::new("Running").add_attribute(Attribute::Bold),
                Cell::new("Group access").add_attribute(Attribute::Bold),
            ]);
        for runtime in &report.runtimes {
            runtimes.add_row(vec![
                Cell::new(runtime.runtime.display_name()),
                yes_no(runtime.installed, true, self.colors_enabled),
                yes_no(runtime.running, true, self.colors_enabled),
                yes_no(runtime.in_group, true, self.colors_enabled),
            ]);
        }
        println!("{runtimes}");

        println!(
            "Unprivileged ports from 80: {}",
            if report.unprivileged_ports_configured {
                "configured"
            } else {
                "not configured"
            }
        );
        Ok(())
    }

    /// Closing line for an installer run
    pub fn render_outcome(&self, outcome: InstallOutcome) -> io::Result<()> {
        if self.json_output {
            println!("{}", serde_json::json!({ "outcome": outcome.as_str() }));
            return Ok(());
        }
        println!("\n{}", style("Installation complete!").green().bold());
        Ok(())
    }
}
