use std::env;
use std::path::{Path, PathBuf};

/// Expand a leading `~` and `$VAR` references in a path string.
pub fn expand(path: &str) -> PathBuf {
    let tilde_expanded = if let Some(rest) = path.strip_prefix("~/") {
        format!("{}/{rest}", home().display())
    } else if path == "~" {
        home().display().to_string()
    } else {
        path.to_string()
    };
    PathBuf::from(expand_vars(&tilde_expanded))
}

/// True when the string carries no directory component at all, i.e. it
/// should be resolved under the per-app cache directory.
pub fn is_bare_filename(path: &str) -> bool {
    !path.starts_with('~') && Path::new(path).parent() == Some(Path::new(""))
}

/// `$XDG_CONFIG_HOME/luminol`, falling back to `~/.config/luminol`.
pub fn config_dir() -> PathBuf {
    xdg_dir("XDG_CONFIG_HOME", ".config").join("luminol")
}

pub fn config_file() -> PathBuf {
    config_dir().join("config.toml")
}

/// `$XDG_CACHE_HOME/luminol`, falling back to `~/.cache/luminol`.
pub fn cache_dir() -> PathBuf {
    xdg_dir("XDG_CACHE_HOME", ".cache").join("luminol")
}

/// `$XDG_STATE_HOME/luminol/logs`, falling back to `~/.local/state/luminol/logs`.
pub fn log_root() -> PathBuf {
    xdg_dir("XDG_STATE_HOME", ".local/state")
        .join("luminol")
        .join("logs")
}

pub fn templates_dir() -> PathBuf {
    config_dir().join("templates")
}

/// Resolve a template reference: a bare filename lives under the config
/// templates directory, anything else is expanded as a path.
pub fn resolve_template(reference: &str) -> PathBuf {
    if is_bare_filename(reference) {
        templates_dir().join(reference)
    } else {
        expand(reference)
    }
}

/// Resolve an app's output file: bare filenames land in the cache tree,
/// paths are expanded in place.
pub fn resolve_output(app: &str, output_file: &str) -> PathBuf {
    if is_bare_filename(output_file) {
        cache_dir().join(app).join(output_file)
    } else {
        expand(output_file)
    }
}

fn home() -> PathBuf {
    env::var("HOME").map(PathBuf::from).unwrap_or_else(|_| PathBuf::from("/"))
}

fn xdg_dir(var: &str, home_fallback: &str) -> PathBuf {
    match env::var(var) {
        Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => home().join(home_fallback),
    }
}

fn expand_vars(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = String::with_capacity(input.len());
    let mut i = 0;
    while i < input.len() {
        if bytes[i] == b'$' {
            let rest = &input[i + 1..];
            let name_len = rest
                .bytes()
                .enumerate()
                .take_while(|(j, b)| {
                    if *j == 0 {
                        b.is_ascii_alphabetic() || *b == b'_'
                    } else {
                        b.is_ascii_alphanumeric() || *b == b'_'
                    }
                })
                .count();
            if name_len > 0 {
                let name = &rest[..name_len];
                match env::var(name) {
                    Ok(value) => out.push_str(&value),
                    Err(_) => {
                        out.push('$');
                        out.push_str(name);
                    }
                }
                i += 1 + name_len;
                continue;
            }
        }
        let ch = input[i..].chars().next().expect("in-bounds char");
        out.push(ch);
        i += ch.len_utf8();
    }
    out
}
