use crate::color::Color;
use crate::config::{AppConfig, ColorBinding};
use crate::error::{Diagnostics, LuminolError};
use crate::palette::SemanticPalette;
use crate::paths;
use crate::transform::TransformSet;

/// The literal token that marks the placeholder position in a template
/// `syntax` pattern.
const PLACEHOLDER_TOKEN: &str = "placeholder";

/// The renderer's three operating modes, resolved from two config fields
/// with strict precedence: a template wins over remapping, remapping wins
/// over the default emission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    Default,
    Custom,
    Template,
}

pub fn resolve_mode(app: &AppConfig) -> RenderMode {
    if app.template.is_some() {
        RenderMode::Template
    } else if app.remap_colors {
        RenderMode::Custom
    } else {
        RenderMode::Default
    }
}

/// Render one application's output content.
pub fn render_app(
    app: &AppConfig,
    palette: &SemanticPalette,
    diags: &mut Diagnostics,
) -> Result<String, LuminolError> {
    match resolve_mode(app) {
        RenderMode::Default => Ok(render_default(app, palette)),
        RenderMode::Custom => render_custom(app, palette, diags),
        RenderMode::Template => {
            let reference = app.template.as_deref().expect("template mode requires a template");
            let path = paths::resolve_template(reference);
            let template = std::fs::read_to_string(&path).map_err(|e| LuminolError::Io {
                path: path.clone(),
                message: format!("cannot read template for [{}]: {e}", app.name),
            })?;
            render_template(&template, app, palette, diags)
        }
    }
}

/// Default mode: one line per UI role in canonical order. ANSI roles are
/// not emitted here, and any `[app.colors]` table is ignored.
pub fn render_default(app: &AppConfig, palette: &SemanticPalette) -> String {
    let mut out = String::new();
    for (name, color) in palette.ui_roles() {
        out.push_str(&substitute(&app.syntax, name, &app.color_format.emit(&color)));
        out.push('\n');
    }
    out
}

/// Custom mapping mode: each binding is resolved, transformed, formatted,
/// and substituted, in declaration order.
pub fn render_custom(
    app: &AppConfig,
    palette: &SemanticPalette,
    diags: &mut Diagnostics,
) -> Result<String, LuminolError> {
    if app.colors.is_empty() {
        return Err(missing_colors_error(&app.name));
    }
    let mut out = String::new();
    for binding in &app.colors {
        let color = resolve_binding(&app.name, binding, palette, diags)?;
        out.push_str(&substitute(&app.syntax, &binding.name, &app.color_format.emit(&color)));
        out.push('\n');
    }
    Ok(out)
}

/// Template mode: derive the placeholder pattern from `syntax`, then
/// replace every `prefix + name + suffix` occurrence for each candidate
/// name. Placeholders naming nothing we know stay untouched.
pub fn render_template(
    template: &str,
    app: &AppConfig,
    palette: &SemanticPalette,
    diags: &mut Diagnostics,
) -> Result<String, LuminolError> {
    let Some((prefix, suffix)) = placeholder_pattern(&app.syntax) else {
        return Err(LuminolError::config(
            &app.name,
            "syntax",
            format!("template mode requires the literal token '{PLACEHOLDER_TOKEN}' in the syntax pattern"),
            "use something like syntax = \"{placeholder}\"",
        ));
    };

    let mut candidates: Vec<(String, Color)> = if app.remap_colors {
        if app.colors.is_empty() {
            return Err(missing_colors_error(&app.name));
        }
        let mut resolved = Vec::with_capacity(app.colors.len());
        for binding in &app.colors {
            resolved.push((
                binding.name.clone(),
                resolve_binding(&app.name, binding, palette, diags)?,
            ));
        }
        resolved
    } else {
        palette.roles().map(|(name, color)| (name.to_string(), color)).collect()
    };

    // Longest names first, so `ansi-1` can never clobber an `ansi-10`
    // occurrence when the suffix is empty.
    candidates.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

    let mut text = template.to_string();
    for (name, color) in &candidates {
        let needle = format!("{prefix}{name}{suffix}");
        text = text.replace(&needle, &app.color_format.emit(color));
    }
    Ok(text)
}

/// Split the syntax pattern around the first `placeholder` token; the full
/// leading and trailing literals become the search prefix and suffix.
fn placeholder_pattern(syntax: &str) -> Option<(&str, &str)> {
    syntax
        .find(PLACEHOLDER_TOKEN)
        .map(|at| (&syntax[..at], &syntax[at + PLACEHOLDER_TOKEN.len()..]))
}

/// `{name}` and `{color}` are the only reserved sequences in a syntax
/// pattern; everything else, braces included, is literal text.
fn substitute(syntax: &str, name: &str, color: &str) -> String {
    syntax.replace("{name}", name).replace("{color}", color)
}

fn resolve_binding(
    app_name: &str,
    binding: &ColorBinding,
    palette: &SemanticPalette,
    diags: &mut Diagnostics,
) -> Result<Color, LuminolError> {
    let source = palette.get(&binding.source).ok_or_else(|| {
        LuminolError::config(
            app_name,
            format!("colors.{}.source", binding.name),
            format!("'{}' is not a role in the semantic palette", binding.source),
            "use a UI role like bg-primary or an ANSI role like ansi-4",
        )
    })?;
    let context = format!("[{app_name}.colors.{}]", binding.name);
    let transforms = TransformSet::resolve(&binding.transforms, &context, diags);
    Ok(transforms.apply(source))
}

fn missing_colors_error(app_name: &str) -> LuminolError {
    LuminolError::config(
        app_name,
        "colors",
        "remap-colors is enabled but no color bindings are defined",
        format!("add a [{app_name}.colors] table or disable remap-colors"),
    )
}
