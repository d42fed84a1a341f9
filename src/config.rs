use std::path::Path;

use toml::Value;

use crate::error::{Diagnostics, LuminolError};
use crate::format::{ColorFormat, FORMAT_NAMES};
use crate::transform::{Transform, TransformKind};

/// `theme-type` preference from `[global]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemePreference {
    #[default]
    Auto,
    Light,
    Dark,
}

/// The `[global]` section.
#[derive(Debug, Clone, Default)]
pub struct GlobalConfig {
    pub wallpaper_command: Option<String>,
    pub theme_type: ThemePreference,
    pub reload_commands: Vec<String>,
    pub use_shell: bool,
    pub log_output: bool,
}

/// One `[app.colors]` entry: a derived color name, the semantic role it
/// draws from, and the transforms to apply, in declaration order.
#[derive(Debug, Clone)]
pub struct ColorBinding {
    pub name: String,
    pub source: String,
    pub transforms: Vec<Transform>,
}

/// One enabled `[<app>]` section.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub name: String,
    pub output_file: String,
    pub color_format: ColorFormat,
    pub syntax: String,
    pub template: Option<String>,
    pub remap_colors: bool,
    pub colors: Vec<ColorBinding>,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub global: GlobalConfig,
    pub apps: Vec<AppConfig>,
}

const GLOBAL_KEYS: [&str; 5] = [
    "wallpaper-command",
    "theme-type",
    "reload-commands",
    "use-shell",
    "log-output",
];

const APP_KEYS: [&str; 7] = [
    "enabled",
    "color-format",
    "output-file",
    "syntax",
    "remap-colors",
    "template",
    "colors",
];

impl Config {
    /// Load and validate the configuration file.
    pub fn load(path: &Path, diags: &mut Diagnostics) -> Result<Self, LuminolError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            LuminolError::config(
                "global",
                "",
                format!("cannot read config file {}: {e}", path.display()),
                "create $XDG_CONFIG_HOME/luminol/config.toml (see the sample config)",
            )
        })?;
        Self::parse(&text, diags)
    }

    /// Parse and validate configuration text. Disabled apps are dropped;
    /// unknown keys warn, structural problems are fatal.
    pub fn parse(text: &str, diags: &mut Diagnostics) -> Result<Self, LuminolError> {
        let table: toml::Table = text.parse().map_err(|e| {
            LuminolError::config(
                "global",
                "",
                format!("invalid TOML syntax: {e}"),
                "fix the reported line in config.toml",
            )
        })?;

        let global = match table.get("global") {
            Some(Value::Table(section)) => parse_global(section, diags)?,
            Some(_) => {
                return Err(LuminolError::config(
                    "global",
                    "",
                    "[global] must be a table",
                    "declare it as a [global] section",
                ))
            }
            None => GlobalConfig::default(),
        };

        let mut apps = Vec::new();
        for (name, value) in &table {
            if name == "global" {
                continue;
            }
            let Value::Table(section) = value else {
                return Err(LuminolError::config(
                    name.clone(),
                    "",
                    "application sections must be tables",
                    format!("declare it as [{name}]"),
                ));
            };
            if let Some(app) = parse_app(name, section, diags)? {
                apps.push(app);
            }
        }

        Ok(Self { global, apps })
    }
}

fn parse_global(section: &toml::Table, diags: &mut Diagnostics) -> Result<GlobalConfig, LuminolError> {
    warn_unknown_keys("global", section, &GLOBAL_KEYS, diags);

    let wallpaper_command = optional_string(section, "global", "wallpaper-command")?
        .filter(|cmd| !cmd.trim().is_empty());

    let theme_type = match optional_string(section, "global", "theme-type")? {
        None => ThemePreference::Auto,
        Some(value) => match value.as_str() {
            "auto" => ThemePreference::Auto,
            "light" => ThemePreference::Light,
            "dark" => ThemePreference::Dark,
            other => {
                return Err(LuminolError::config(
                    "global",
                    "theme-type",
                    format!("'{other}' is not a valid theme type"),
                    "use one of: auto, light, dark",
                ))
            }
        },
    };

    let reload_commands = match section.get("reload-commands") {
        None => Vec::new(),
        Some(Value::Array(items)) => {
            let mut commands = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Value::String(cmd) => commands.push(cmd.clone()),
                    other => {
                        return Err(LuminolError::config(
                            "global",
                            "reload-commands",
                            format!("expected a string, got {}", other.type_str()),
                            "list each reload command as a quoted string",
                        ))
                    }
                }
            }
            commands
        }
        Some(other) => {
            return Err(LuminolError::config(
                "global",
                "reload-commands",
                format!("expected an array, got {}", other.type_str()),
                "use reload-commands = [\"cmd one\", \"cmd two\"]",
            ))
        }
    };

    Ok(GlobalConfig {
        wallpaper_command,
        theme_type,
        reload_commands,
        use_shell: optional_bool(section, "global", "use-shell")?.unwrap_or(false),
        log_output: optional_bool(section, "global", "log-output")?.unwrap_or(false),
    })
}

fn parse_app(
    name: &str,
    section: &toml::Table,
    diags: &mut Diagnostics,
) -> Result<Option<AppConfig>, LuminolError> {
    if !optional_bool(section, name, "enabled")?.unwrap_or(false) {
        return Ok(None);
    }
    warn_unknown_keys(name, section, &APP_KEYS, diags);

    let output_file = required_string(section, name, "output-file")?;
    let syntax = required_string(section, name, "syntax")?;

    let format_name = required_string(section, name, "color-format")?;
    let color_format: ColorFormat = format_name.parse().map_err(|_| {
        LuminolError::config(
            name,
            "color-format",
            format!("'{format_name}' is not a supported color format"),
            format!("use one of: {}", FORMAT_NAMES.join(", ")),
        )
    })?;

    let template = optional_string(section, name, "template")?.filter(|t| !t.trim().is_empty());
    let remap_colors = optional_bool(section, name, "remap-colors")?.unwrap_or(false);

    let colors = match section.get("colors") {
        None => Vec::new(),
        Some(Value::Table(bindings)) => parse_bindings(name, bindings, diags)?,
        Some(other) => {
            return Err(LuminolError::config(
                name,
                "colors",
                format!("expected a table, got {}", other.type_str()),
                format!("declare bindings under [{name}.colors]"),
            ))
        }
    };

    if remap_colors && colors.is_empty() {
        return Err(LuminolError::config(
            name,
            "colors",
            "remap-colors is enabled but no [colors] table is defined",
            format!("add a [{name}.colors] table or set remap-colors = false"),
        ));
    }

    Ok(Some(AppConfig {
        name: name.to_string(),
        output_file,
        color_format,
        syntax,
        template,
        remap_colors,
        colors,
    }))
}

/// Binding entries are either a bare source-role string or an inline table
/// with `source` plus transform keys. Declaration order is preserved.
fn parse_bindings(
    app: &str,
    bindings: &toml::Table,
    diags: &mut Diagnostics,
) -> Result<Vec<ColorBinding>, LuminolError> {
    let mut parsed = Vec::with_capacity(bindings.len());
    for (binding_name, value) in bindings {
        let binding = match value {
            Value::String(source) => ColorBinding {
                name: binding_name.clone(),
                source: source.clone(),
                transforms: Vec::new(),
            },
            Value::Table(entry) => {
                let Some(source) = entry.get("source") else {
                    return Err(LuminolError::config(
                        app,
                        format!("colors.{binding_name}"),
                        "binding is missing the required 'source' key",
                        "name the semantic role this color derives from, e.g. source = \"accent-primary\"",
                    ));
                };
                let Value::String(source) = source else {
                    return Err(LuminolError::config(
                        app,
                        format!("colors.{binding_name}.source"),
                        format!("expected a string, got {}", source.type_str()),
                        "name a semantic role such as \"bg-primary\"",
                    ));
                };

                let mut transforms = Vec::new();
                for (key, raw) in entry {
                    if key == "source" {
                        continue;
                    }
                    let Some(kind) = TransformKind::from_key(key) else {
                        diags.warn(format!(
                            "[{app}.colors.{binding_name}]: unknown transform '{key}' skipped"
                        ));
                        continue;
                    };
                    let Some(value) = numeric(raw) else {
                        diags.warn(format!(
                            "[{app}.colors.{binding_name}]: {key} must be a number, got {}; skipped",
                            raw.type_str()
                        ));
                        continue;
                    };
                    transforms.push(Transform { kind, value });
                }

                ColorBinding {
                    name: binding_name.clone(),
                    source: source.clone(),
                    transforms,
                }
            }
            other => {
                return Err(LuminolError::config(
                    app,
                    format!("colors.{binding_name}"),
                    format!("expected a role name or an inline table, got {}", other.type_str()),
                    "use either name = \"bg-primary\" or name = { source = \"bg-primary\", brightness = 1.2 }",
                ))
            }
        };
        parsed.push(binding);
    }
    Ok(parsed)
}

fn numeric(value: &Value) -> Option<f32> {
    match value {
        Value::Integer(i) => Some(*i as f32),
        Value::Float(f) if f.is_finite() => Some(*f as f32),
        _ => None,
    }
}

fn warn_unknown_keys(section: &str, table: &toml::Table, known: &[&str], diags: &mut Diagnostics) {
    for key in table.keys() {
        if !known.contains(&key.as_str()) {
            diags.warn(format!(
                "unknown option '{key}' in [{section}] ignored (supported: {})",
                known.join(", ")
            ));
        }
    }
}

fn required_string(table: &toml::Table, section: &str, key: &str) -> Result<String, LuminolError> {
    match optional_string(table, section, key)? {
        Some(value) if !value.trim().is_empty() => Ok(value),
        Some(_) => Err(LuminolError::config(
            section,
            key,
            "value cannot be empty",
            format!("set a value for '{key}'"),
        )),
        None => Err(LuminolError::config(
            section,
            key,
            "missing mandatory option",
            format!("add '{key}' to the [{section}] section"),
        )),
    }
}

fn optional_string(table: &toml::Table, section: &str, key: &str) -> Result<Option<String>, LuminolError> {
    match table.get(key) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(LuminolError::config(
            section,
            key,
            format!("expected a string, got {}", other.type_str()),
            format!("quote the value of '{key}'"),
        )),
    }
}

fn optional_bool(table: &toml::Table, section: &str, key: &str) -> Result<Option<bool>, LuminolError> {
    match table.get(key) {
        None => Ok(None),
        Some(Value::Boolean(b)) => Ok(Some(*b)),
        Some(other) => Err(LuminolError::config(
            section,
            key,
            format!("expected true or false, got {}", other.type_str()),
            format!("set '{key}' to true or false"),
        )),
    }
}
