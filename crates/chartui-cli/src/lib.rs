//! Shared CLI definitions for chartui.
//!
//! Used by the main application, the build script (manpage) and the
//! gen_docs binary (command-line-options markdown).

use clap::{CommandFactory, Parser, ValueEnum};
use std::path::PathBuf;

/// Chart kind selectable from the command line.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum ChartKindArg {
    /// Line through the values, in list order
    Line,
    /// One bar per record
    Bar,
    /// Slices proportional to each value's share of the total
    Pie,
}

/// Command-line arguments for chartui
#[derive(Clone, Parser, Debug)]
#[command(
    name = "chartui",
    version,
    about = "Build, edit and export simple charts in the terminal",
    long_about = "Build, edit and export simple charts in the terminal.\n\n\
        Records are {name, value} pairs shown as a line, bar or pie chart. \
        The list starts with sample data, can be edited with the form, \
        exported to a JSON document and imported back."
)]
pub struct Args {
    /// JSON document to import at startup ({"chartType": ..., "data": [{"name", "value"}]})
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Initial chart kind (overrides the chartType of PATH only)
    #[arg(long = "chart-type", value_enum, value_name = "KIND")]
    pub chart_type: Option<ChartKindArg>,

    /// Start in dark mode
    #[arg(long = "dark", action)]
    pub dark: bool,

    /// Directory where JSON exports are written (default from config, else current directory)
    #[arg(long = "export-dir", value_name = "DIR")]
    pub export_dir: Option<PathBuf>,

    /// Render the chart to an image (PNG or EPS, by extension) and exit without starting the UI
    #[arg(long = "render-image", value_name = "OUT")]
    pub render_image: Option<PathBuf>,

    /// Write a default configuration file and exit
    #[arg(long = "generate-config", action)]
    pub generate_config: bool,

    /// Overwrite an existing configuration file (with --generate-config)
    #[arg(long = "force", requires = "generate_config", action)]
    pub force: bool,

    /// Enable debug mode: verbose logging and a status row with event counters
    #[arg(long = "debug", action)]
    pub debug: bool,

    /// Write logs to this file instead of the cache directory
    #[arg(long = "log-file", value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

fn escape_table_cell(s: &str) -> String {
    s.replace('|', "\\|").replace(['\n', '\r'], " ")
}

/// Markdown table of the command-line options.
pub fn render_options_markdown() -> String {
    let mut cmd = Args::command();
    cmd.build();

    let mut out = String::from("# Command Line Options\n\n");
    out.push_str("## Usage\n\n```\n");
    out.push_str(&cmd.render_usage().to_string());
    out.push_str("\n```\n\n");

    out.push_str("## Options\n\n");
    out.push_str("| Option | Description |\n");
    out.push_str("|--------|-------------|\n");

    for arg in cmd.get_arguments() {
        let id = arg.get_id().as_str();
        if id == "help" || id == "version" {
            continue;
        }
        let value_names: Vec<String> = arg
            .get_value_names()
            .map(|names| names.iter().map(|n| format!("<{}>", n)).collect())
            .unwrap_or_default();

        let option = if arg.is_positional() {
            format!("[{}]", value_names.join(" "))
        } else {
            let mut parts = Vec::new();
            if let Some(s) = arg.get_short() {
                parts.push(format!("-{}", s));
            }
            if let Some(l) = arg.get_long() {
                parts.push(format!("--{}", l));
            }
            let mut flag = parts.join(", ");
            if !value_names.is_empty() {
                flag.push(' ');
                flag.push_str(&value_names.join(" "));
            }
            flag
        };
        let help = arg.get_help().map(|h| h.to_string()).unwrap_or_default();
        out.push_str(&format!(
            "| `{}` | {} |\n",
            escape_table_cell(&option),
            escape_table_cell(&help)
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn parses_path_and_options() {
        let args = Args::parse_from([
            "chartui",
            "data.json",
            "--chart-type",
            "pie",
            "--dark",
            "--export-dir",
            "out",
        ]);
        assert_eq!(args.path, Some(PathBuf::from("data.json")));
        assert_eq!(args.chart_type, Some(ChartKindArg::Pie));
        assert!(args.dark);
        assert_eq!(args.export_dir, Some(PathBuf::from("out")));
    }

    #[test]
    fn path_is_optional() {
        let args = Args::parse_from(["chartui"]);
        assert!(args.path.is_none());
        assert!(!args.debug);
    }

    #[test]
    fn force_requires_generate_config() {
        assert!(Args::try_parse_from(["chartui", "--force"]).is_err());
        let args = Args::parse_from(["chartui", "--generate-config", "--force"]);
        assert!(args.generate_config && args.force);
    }

    #[test]
    fn unknown_chart_type_is_rejected() {
        assert!(Args::try_parse_from(["chartui", "--chart-type", "radar"]).is_err());
    }

    #[test]
    fn markdown_lists_options() {
        let md = render_options_markdown();
        assert!(md.contains("--chart-type"));
        assert!(md.contains("--render-image"));
        assert!(!md.contains("`--help`"));
    }
}
