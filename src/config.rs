use color_eyre::eyre::eyre;
use color_eyre::Result;
use ratatui::style::Color;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use supports_color::Stream;

use crate::chart_data::{palette_slot, DEFAULT_PALETTE, PALETTE_SIZE};

/// Manages config directory and config file operations
#[derive(Clone)]
pub struct ConfigManager {
    pub(crate) config_dir: PathBuf,
}

impl ConfigManager {
    /// Create a ConfigManager with a custom config directory (primarily for testing)
    pub fn with_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    /// Create a new ConfigManager for the given app name
    pub fn new(app_name: &str) -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| eyre!("Could not determine config directory"))?
            .join(app_name);

        Ok(Self { config_dir })
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Get path to a specific config file or subdirectory
    pub fn config_path(&self, path: &str) -> PathBuf {
        self.config_dir.join(path)
    }

    pub fn ensure_config_dir(&self) -> Result<()> {
        if !self.config_dir.exists() {
            std::fs::create_dir_all(&self.config_dir)?;
        }
        Ok(())
    }

    /// Generate default configuration template as a string
    pub fn generate_default_config(&self) -> String {
        DEFAULT_CONFIG_TEMPLATE.to_string()
    }

    /// Write default configuration to config file
    pub fn write_default_config(&self, force: bool) -> Result<PathBuf> {
        let config_path = self.config_path("config.toml");

        if config_path.exists() && !force {
            return Err(eyre!(
                "Config file already exists at {}. Use --force to overwrite.",
                config_path.display()
            ));
        }

        self.ensure_config_dir()?;
        std::fs::write(&config_path, DEFAULT_CONFIG_TEMPLATE)?;

        Ok(config_path)
    }

    /// Load `config.toml` from this directory; defaults when the file is absent
    pub fn load_config(&self) -> Result<AppConfig> {
        let config_path = self.config_path("config.toml");

        if !config_path.exists() {
            return Ok(AppConfig::default());
        }

        let content = std::fs::read_to_string(&config_path).map_err(|e| {
            eyre!(
                "Failed to read config file at {}: {}",
                config_path.display(),
                e
            )
        })?;

        toml::from_str(&content).map_err(|e| {
            eyre!(
                "Failed to parse config file at {}: {}",
                config_path.display(),
                e
            )
        })
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Configuration format version (for future compatibility)
    pub version: String,
    pub display: DisplayConfig,
    pub export: ExportConfig,
    pub performance: PerformanceConfig,
    pub theme: ThemeConfig,
    pub debug: DebugConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub dark_mode: bool,
    /// Width of the record table column on the right of the chart
    pub table_width: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Where JSON exports are written; current directory when unset
    pub directory: Option<String>,
    pub image_width: u32,
    pub image_height: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceConfig {
    pub event_poll_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    #[serde(deserialize_with = "light_colors")]
    pub light: ColorConfig,
    #[serde(deserialize_with = "dark_colors")]
    pub dark: ColorConfig,
    /// Pie slice colors, cycled by record index
    pub palette: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    pub primary: String,
    pub success: String,
    pub error: String,
    pub warning: String,
    pub dimmed: String,
    pub background: String,
    pub controls_bg: String,
    pub text_primary: String,
    pub text_secondary: String,
    pub text_inverse: String,
    pub cursor_focused: String,
    pub table_header: String,
    pub table_selected: String,
    pub modal_border: String,
    pub modal_border_active: String,
    pub modal_border_error: String,
    pub line_series: String,
    pub bar_series: String,
    pub axis: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DebugConfig {
    pub enabled: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: "0.1".to_string(),
            display: DisplayConfig::default(),
            export: ExportConfig::default(),
            performance: PerformanceConfig::default(),
            theme: ThemeConfig::default(),
            debug: DebugConfig::default(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            dark_mode: false,
            table_width: 40,
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            directory: None,
            image_width: 800,
            image_height: 400,
        }
    }
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            event_poll_interval_ms: 25,
        }
    }
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            light: ColorConfig::light(),
            dark: ColorConfig::dark(),
            palette: DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl ColorConfig {
    pub fn light() -> Self {
        Self {
            primary: "#3b82f6".to_string(),
            success: "#10b981".to_string(),
            error: "#ef4444".to_string(),
            warning: "#f59e0b".to_string(),
            dimmed: "#6b7280".to_string(),
            background: "#ffffff".to_string(),
            controls_bg: "#e5e7eb".to_string(),
            text_primary: "#1f2937".to_string(),
            text_secondary: "#6b7280".to_string(),
            text_inverse: "#ffffff".to_string(),
            cursor_focused: "default".to_string(),
            table_header: "#374151".to_string(),
            table_selected: "reversed".to_string(),
            modal_border: "#9ca3af".to_string(),
            modal_border_active: "#3b82f6".to_string(),
            modal_border_error: "#ef4444".to_string(),
            line_series: "#3b82f6".to_string(),
            bar_series: "#10b981".to_string(),
            axis: "#6b7280".to_string(),
        }
    }

    pub fn dark() -> Self {
        Self {
            primary: "cyan".to_string(),
            success: "green".to_string(),
            error: "red".to_string(),
            warning: "yellow".to_string(),
            dimmed: "dark_gray".to_string(),
            background: "black".to_string(),
            controls_bg: "indexed(236)".to_string(),
            text_primary: "white".to_string(),
            text_secondary: "dark_gray".to_string(),
            text_inverse: "black".to_string(),
            cursor_focused: "default".to_string(),
            table_header: "white".to_string(),
            table_selected: "reversed".to_string(),
            modal_border: "cyan".to_string(),
            modal_border_active: "yellow".to_string(),
            modal_border_error: "red".to_string(),
            line_series: "#3b82f6".to_string(),
            bar_series: "#10b981".to_string(),
            axis: "gray".to_string(),
        }
    }

    fn fields(&self) -> [(&'static str, &str); 19] {
        [
            ("primary", self.primary.as_str()),
            ("success", self.success.as_str()),
            ("error", self.error.as_str()),
            ("warning", self.warning.as_str()),
            ("dimmed", self.dimmed.as_str()),
            ("background", self.background.as_str()),
            ("controls_bg", self.controls_bg.as_str()),
            ("text_primary", self.text_primary.as_str()),
            ("text_secondary", self.text_secondary.as_str()),
            ("text_inverse", self.text_inverse.as_str()),
            ("cursor_focused", self.cursor_focused.as_str()),
            ("table_header", self.table_header.as_str()),
            ("table_selected", self.table_selected.as_str()),
            ("modal_border", self.modal_border.as_str()),
            ("modal_border_active", self.modal_border_active.as_str()),
            ("modal_border_error", self.modal_border_error.as_str()),
            ("line_series", self.line_series.as_str()),
            ("bar_series", self.bar_series.as_str()),
            ("axis", self.axis.as_str()),
        ]
    }
}

fn light_colors<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<ColorConfig, D::Error> {
    ColorConfig::light().overlay(deserializer)
}

fn dark_colors<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<ColorConfig, D::Error> {
    ColorConfig::dark().overlay(deserializer)
}

impl ColorConfig {
    /// Apply a partial color table on top of `self`; keys left out keep their value.
    fn overlay<'de, D: Deserializer<'de>>(
        mut self,
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        let values = HashMap::<String, String>::deserialize(deserializer)?;
        for (name, value) in values {
            let slot = self
                .field_mut(&name)
                .ok_or_else(|| D::Error::custom(format!("unknown color key '{}'", name)))?;
            *slot = value;
        }
        Ok(self)
    }

    fn field_mut(&mut self, name: &str) -> Option<&mut String> {
        let field = match name {
            "primary" => &mut self.primary,
            "success" => &mut self.success,
            "error" => &mut self.error,
            "warning" => &mut self.warning,
            "dimmed" => &mut self.dimmed,
            "background" => &mut self.background,
            "controls_bg" => &mut self.controls_bg,
            "text_primary" => &mut self.text_primary,
            "text_secondary" => &mut self.text_secondary,
            "text_inverse" => &mut self.text_inverse,
            "cursor_focused" => &mut self.cursor_focused,
            "table_header" => &mut self.table_header,
            "table_selected" => &mut self.table_selected,
            "modal_border" => &mut self.modal_border,
            "modal_border_active" => &mut self.modal_border_active,
            "modal_border_error" => &mut self.modal_border_error,
            "line_series" => &mut self.line_series,
            "bar_series" => &mut self.bar_series,
            "axis" => &mut self.axis,
            _ => return None,
        };
        Some(field)
    }
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self::dark()
    }
}

// Configuration loading and merging
impl AppConfig {
    /// Load configuration from all layers (default → user)
    pub fn load(app_name: &str) -> Result<Self> {
        let config_manager = ConfigManager::new(app_name)?;
        Self::load_from(&config_manager)
    }

    /// Load from a specific config directory (default → user)
    pub fn load_from(config_manager: &ConfigManager) -> Result<Self> {
        let mut config = AppConfig::default();
        config.merge(config_manager.load_config()?);
        config.validate()?;
        Ok(config)
    }

    /// Merge another config into this one (other takes precedence)
    pub fn merge(&mut self, other: AppConfig) {
        if other.version != AppConfig::default().version {
            self.version = other.version;
        }

        self.display.merge(other.display);
        self.export.merge(other.export);
        self.performance.merge(other.performance);
        self.theme.merge(other.theme);
        self.debug.merge(other.debug);
    }

    pub fn validate(&self) -> Result<()> {
        if !self.version.starts_with("0.1") {
            return Err(eyre!(
                "Unsupported config version: {}. Expected 0.1.x",
                self.version
            ));
        }

        if self.performance.event_poll_interval_ms == 0 {
            return Err(eyre!("event_poll_interval_ms must be greater than 0"));
        }

        if self.export.image_width == 0 || self.export.image_height == 0 {
            return Err(eyre!("image_width and image_height must be greater than 0"));
        }

        if self.display.table_width < 20 {
            return Err(eyre!("table_width must be at least 20"));
        }

        let parser = ColorParser::new();
        self.theme.validate(&parser)?;

        Ok(())
    }
}

impl DisplayConfig {
    pub fn merge(&mut self, other: Self) {
        let default = DisplayConfig::default();
        if other.dark_mode != default.dark_mode {
            self.dark_mode = other.dark_mode;
        }
        if other.table_width != default.table_width {
            self.table_width = other.table_width;
        }
    }
}

impl ExportConfig {
    pub fn merge(&mut self, other: Self) {
        let default = ExportConfig::default();
        if other.directory.is_some() {
            self.directory = other.directory;
        }
        if other.image_width != default.image_width {
            self.image_width = other.image_width;
        }
        if other.image_height != default.image_height {
            self.image_height = other.image_height;
        }
    }

    /// Export directory with `~/` expanded; current directory when unset
    pub fn directory_path(&self) -> PathBuf {
        match self.directory.as_deref() {
            None | Some("") => PathBuf::from("."),
            Some(dir) => match (dir.strip_prefix("~/"), dirs::home_dir()) {
                (Some(rest), Some(home)) => home.join(rest),
                _ => PathBuf::from(dir),
            },
        }
    }
}

impl PerformanceConfig {
    pub fn merge(&mut self, other: Self) {
        let default = PerformanceConfig::default();
        if other.event_poll_interval_ms != default.event_poll_interval_ms {
            self.event_poll_interval_ms = other.event_poll_interval_ms;
        }
    }
}

impl ThemeConfig {
    pub fn merge(&mut self, other: Self) {
        self.light.merge(other.light, &ColorConfig::light());
        self.dark.merge(other.dark, &ColorConfig::dark());
        if other.palette != ThemeConfig::default().palette {
            self.palette = other.palette;
        }
    }

    fn validate(&self, parser: &ColorParser) -> Result<()> {
        self.light
            .validate(parser)
            .map_err(|e| eyre!("[theme.light] {}", e))?;
        self.dark
            .validate(parser)
            .map_err(|e| eyre!("[theme.dark] {}", e))?;

        if self.palette.len() != PALETTE_SIZE {
            return Err(eyre!(
                "palette must have exactly {} colors, found {}",
                PALETTE_SIZE,
                self.palette.len()
            ));
        }
        for color in &self.palette {
            parse_hex(color.trim()).map_err(|e| eyre!("Invalid palette color: {}", e))?;
        }
        Ok(())
    }

    /// Palette as RGB triples (for image export)
    pub fn palette_rgb(&self) -> Vec<(u8, u8, u8)> {
        let parsed: Vec<(u8, u8, u8)> = self
            .palette
            .iter()
            .filter_map(|c| parse_hex(c.trim()).ok())
            .collect();
        if parsed.len() == PALETTE_SIZE {
            parsed
        } else {
            DEFAULT_PALETTE
                .iter()
                .filter_map(|c| parse_hex(c).ok())
                .collect()
        }
    }
}

impl ColorConfig {
    /// Validate all color strings can be parsed
    fn validate(&self, parser: &ColorParser) -> Result<()> {
        for (name, value) in self.fields() {
            parser
                .parse(value)
                .map_err(|e| eyre!("Invalid color value for '{}': {}", name, e))?;
        }
        Ok(())
    }

    /// Take each field of `other` that differs from `default`
    pub fn merge(&mut self, other: Self, default: &Self) {
        macro_rules! merge_field {
            ($($field:ident),* $(,)?) => {
                $(
                    if other.$field != default.$field {
                        self.$field = other.$field;
                    }
                )*
            };
        }
        merge_field!(
            primary,
            success,
            error,
            warning,
            dimmed,
            background,
            controls_bg,
            text_primary,
            text_secondary,
            text_inverse,
            cursor_focused,
            table_header,
            table_selected,
            modal_border,
            modal_border_active,
            modal_border_error,
            line_series,
            bar_series,
            axis,
        );
    }
}

impl DebugConfig {
    pub fn merge(&mut self, other: Self) {
        if other.enabled {
            self.enabled = true;
        }
    }
}

/// Color parser with terminal capability detection
pub struct ColorParser {
    supports_true_color: bool,
    supports_256: bool,
    no_color: bool,
}

impl ColorParser {
    /// Create a new ColorParser with automatic terminal capability detection
    pub fn new() -> Self {
        let no_color = std::env::var("NO_COLOR").is_ok();
        let support = supports_color::on(Stream::Stdout);

        Self {
            supports_true_color: support.as_ref().map(|s| s.has_16m).unwrap_or(false),
            supports_256: support.as_ref().map(|s| s.has_256).unwrap_or(false),
            no_color,
        }
    }

    /// Parse a color string (hex or named) and convert to appropriate terminal color.
    /// Invalid strings are rejected even when NO_COLOR is set.
    pub fn parse(&self, s: &str) -> Result<Color> {
        let color = self.parse_color(s)?;
        Ok(if self.no_color { Color::Reset } else { color })
    }

    fn parse_color(&self, s: &str) -> Result<Color> {
        let trimmed = s.trim();

        if trimmed.starts_with('#') && trimmed.len() == 7 {
            let (r, g, b) = parse_hex(trimmed)?;
            return Ok(self.convert_rgb_to_terminal_color(r, g, b));
        }

        // Indexed colors: "indexed(236)" for explicit 256-color palette
        if trimmed.to_lowercase().starts_with("indexed(") && trimmed.ends_with(')') {
            let num_str = &trimmed[8..trimmed.len() - 1];
            let num = num_str.parse::<u8>().map_err(|_| {
                eyre!(
                    "Invalid indexed color: '{}'. Expected format: indexed(0-255)",
                    trimmed
                )
            })?;
            return Ok(Color::Indexed(num));
        }

        let lower = trimmed.to_lowercase();
        match lower.as_str() {
            "black" => Ok(Color::Black),
            "red" => Ok(Color::Red),
            "green" => Ok(Color::Green),
            "yellow" => Ok(Color::Yellow),
            "blue" => Ok(Color::Blue),
            "magenta" => Ok(Color::Magenta),
            "cyan" => Ok(Color::Cyan),
            "white" => Ok(Color::White),

            "bright_black" | "bright black" => Ok(Color::Indexed(8)),
            "bright_red" | "bright red" => Ok(Color::Indexed(9)),
            "bright_green" | "bright green" => Ok(Color::Indexed(10)),
            "bright_yellow" | "bright yellow" => Ok(Color::Indexed(11)),
            "bright_blue" | "bright blue" => Ok(Color::Indexed(12)),
            "bright_magenta" | "bright magenta" => Ok(Color::Indexed(13)),
            "bright_cyan" | "bright cyan" => Ok(Color::Indexed(14)),
            "bright_white" | "bright white" => Ok(Color::Indexed(15)),

            "gray" | "grey" => Ok(Color::Indexed(8)),
            "dark_gray" | "dark gray" | "dark_grey" | "dark grey" => Ok(Color::Indexed(8)),
            "light_gray" | "light gray" | "light_grey" | "light grey" => Ok(Color::Indexed(7)),

            // Handled specially in rendering
            "reset" | "reversed" | "default" => Ok(Color::Reset),

            _ => Err(eyre!(
                "Unknown color name: '{}'. Supported: basic ANSI colors (red, blue, etc.), \
                 bright variants (bright_red, etc.), or hex colors (#ff0000)",
                trimmed
            )),
        }
    }

    fn convert_rgb_to_terminal_color(&self, r: u8, g: u8, b: u8) -> Color {
        if self.supports_true_color {
            Color::Rgb(r, g, b)
        } else if self.supports_256 {
            Color::Indexed(rgb_to_256_color(r, g, b))
        } else {
            rgb_to_basic_ansi(r, g, b)
        }
    }
}

impl Default for ColorParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse hex color string (#ff0000) to RGB components
pub fn parse_hex(s: &str) -> Result<(u8, u8, u8)> {
    if !s.starts_with('#') || s.len() != 7 || !s.is_ascii() {
        return Err(eyre!(
            "Invalid hex color format: '{}'. Expected format: #rrggbb",
            s
        ));
    }

    let r = u8::from_str_radix(&s[1..3], 16)
        .map_err(|_| eyre!("Invalid red component in hex color: {}", s))?;
    let g = u8::from_str_radix(&s[3..5], 16)
        .map_err(|_| eyre!("Invalid green component in hex color: {}", s))?;
    let b = u8::from_str_radix(&s[5..7], 16)
        .map_err(|_| eyre!("Invalid blue component in hex color: {}", s))?;

    Ok((r, g, b))
}

/// Convert RGB to nearest 256-color palette index (xterm palette)
pub fn rgb_to_256_color(r: u8, g: u8, b: u8) -> u8 {
    let max_diff = r.max(g).max(b) as i16 - r.min(g).min(b) as i16;
    if max_diff < 10 {
        // Grayscale ramp (232-255)
        let gray = (r as u16 + g as u16 + b as u16) / 3;
        if gray < 8 {
            return 16;
        } else if gray > 247 {
            return 231;
        } else {
            return 232 + ((gray - 8) * 24 / 240) as u8;
        }
    }

    // 6x6x6 color cube (16-231)
    let r_idx = (r as u16 * 5 / 255) as u8;
    let g_idx = (g as u16 * 5 / 255) as u8;
    let b_idx = (b as u16 * 5 / 255) as u8;

    16 + 36 * r_idx + 6 * g_idx + b_idx
}

/// Convert RGB to nearest basic ANSI color (8 colors)
pub fn rgb_to_basic_ansi(r: u8, g: u8, b: u8) -> Color {
    let max_diff = r.max(g).max(b) as i16 - r.min(g).min(b) as i16;
    if max_diff < 30 {
        let avg = (r as u16 + g as u16 + b as u16) / 3;
        return if avg < 64 { Color::Black } else { Color::White };
    }

    match (r > 128, g > 128, b > 128) {
        (false, false, false) => Color::Black,
        (true, false, false) => Color::Red,
        (false, true, false) => Color::Green,
        (true, true, false) => Color::Yellow,
        (false, false, true) => Color::Blue,
        (true, false, true) => Color::Magenta,
        (false, true, true) => Color::Cyan,
        (true, true, true) => Color::White,
    }
}

/// Theme containing parsed colors ready for use
#[derive(Debug, Clone)]
pub struct Theme {
    pub colors: HashMap<String, Color>,
    pub palette: Vec<Color>,
    pub dark: bool,
}

impl Theme {
    /// Parse the light or dark color set plus the slice palette
    pub fn from_config(config: &ThemeConfig, dark: bool) -> Result<Self> {
        let parser = ColorParser::new();
        let set = if dark { &config.dark } else { &config.light };

        let mut colors = HashMap::new();
        for (name, value) in set.fields() {
            colors.insert(name.to_string(), parser.parse(value)?);
        }

        let palette = config
            .palette
            .iter()
            .map(|c| parser.parse(c))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            colors,
            palette,
            dark,
        })
    }

    /// Get a color by name, returns Reset if not found
    pub fn get(&self, name: &str) -> Color {
        self.colors.get(name).copied().unwrap_or(Color::Reset)
    }

    /// Color of the pie slice for the record at `index`
    pub fn slice_color(&self, index: usize) -> Color {
        self.palette
            .get(palette_slot(index))
            .copied()
            .unwrap_or(Color::Reset)
    }
}

// Default configuration template
const DEFAULT_CONFIG_TEMPLATE: &str = include_str!("../config/default.toml");
