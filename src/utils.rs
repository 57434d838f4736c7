use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use directories::{BaseDirs, ProjectDirs};
use std::path::PathBuf;

/// Profile mode for the application (dev or prod)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    Dev,
    Prod,
}

impl Profile {
    fn app_name(self) -> &'static str {
        match self {
            Profile::Dev => "doneward-dev",
            Profile::Prod => "doneward",
        }
    }
}

/// Configuration directory; the dev profile uses "doneward-dev"
pub fn get_config_dir(profile: Profile) -> Option<PathBuf> {
    ProjectDirs::from("com", "doneward", profile.app_name())
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Data directory holding the database and the log file
pub fn get_data_dir(profile: Profile) -> Option<PathBuf> {
    ProjectDirs::from("com", "doneward", profile.app_name())
        .map(|dirs| dirs.data_dir().to_path_buf())
}

/// Expand `~` in a path string to the user's home directory
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = BaseDirs::new().map(|d| d.home_dir().to_path_buf()) {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Parsed key binding information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedKeyBinding {
    pub key_code: KeyCode,
    pub requires_ctrl: bool,
}

/// Ctrl on Windows/Linux; Ctrl or Option on macOS
pub fn has_primary_modifier(modifiers: KeyModifiers) -> bool {
    #[cfg(target_os = "macos")]
    {
        modifiers.contains(KeyModifiers::CONTROL) || modifiers.contains(KeyModifiers::ALT)
    }

    #[cfg(not(target_os = "macos"))]
    {
        modifiers.contains(KeyModifiers::CONTROL)
    }
}

/// On macOS "Ctrl+" is shown as "Opt+"
pub fn format_key_binding_for_display(key_binding: &str) -> String {
    #[cfg(target_os = "macos")]
    {
        key_binding.replace("Ctrl+", "Opt+")
    }

    #[cfg(not(target_os = "macos"))]
    {
        key_binding.to_string()
    }
}

/// Parse a key binding string from config.
/// Supports single keys ("q", "X"), named keys ("Enter", "Left", "F1") and "Ctrl+<key>".
pub fn parse_key_binding(key_str: &str) -> Result<ParsedKeyBinding, String> {
    let key_str = key_str.trim();

    if let Some(key_part) = key_str.strip_prefix("Ctrl+") {
        return Ok(ParsedKeyBinding {
            key_code: parse_key_code(key_part)?,
            requires_ctrl: true,
        });
    }

    Ok(ParsedKeyBinding {
        key_code: parse_key_code(key_str)?,
        requires_ctrl: false,
    })
}

fn parse_key_code(key_str: &str) -> Result<KeyCode, String> {
    match key_str {
        "Enter" => Ok(KeyCode::Enter),
        "Esc" | "Escape" => Ok(KeyCode::Esc),
        "Backspace" => Ok(KeyCode::Backspace),
        "Tab" => Ok(KeyCode::Tab),
        "Space" | " " => Ok(KeyCode::Char(' ')),
        "Left" => Ok(KeyCode::Left),
        "Right" => Ok(KeyCode::Right),
        "Up" => Ok(KeyCode::Up),
        "Down" => Ok(KeyCode::Down),
        "Home" => Ok(KeyCode::Home),
        "End" => Ok(KeyCode::End),
        "Delete" => Ok(KeyCode::Delete),
        _ => {
            if let Some(n) = key_str.strip_prefix('F').and_then(|n| n.parse::<u8>().ok()) {
                if (1..=12).contains(&n) {
                    return Ok(KeyCode::F(n));
                }
            }
            let mut chars = key_str.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(KeyCode::Char(c)),
                _ => Err(format!("Unknown key binding: {}", key_str)),
            }
        }
    }
}

/// Whether `key` triggers `binding`. Character bindings ignore Shift since
/// the character itself already carries case.
pub fn matches_key_event(key: &KeyEvent, binding: &ParsedKeyBinding) -> bool {
    if binding.requires_ctrl != has_primary_modifier(key.modifiers) {
        return false;
    }
    match (binding.key_code, key.code) {
        (KeyCode::Char(expected), KeyCode::Char(actual)) if binding.requires_ctrl => {
            expected.eq_ignore_ascii_case(&actual)
        }
        (expected, actual) => expected == actual,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn parses_named_and_modified_keys() {
        assert_eq!(
            parse_key_binding("Ctrl+s").unwrap(),
            ParsedKeyBinding { key_code: KeyCode::Char('s'), requires_ctrl: true }
        );
        assert_eq!(parse_key_binding("Space").unwrap().key_code, KeyCode::Char(' '));
        assert_eq!(parse_key_binding("F2").unwrap().key_code, KeyCode::F(2));
        assert_eq!(parse_key_binding("X").unwrap().key_code, KeyCode::Char('X'));
        assert!(parse_key_binding("F13").is_err());
        assert!(parse_key_binding("Hyper+q").is_err());
    }

    fn matches(code: KeyCode, modifiers: KeyModifiers, binding: &str) -> bool {
        matches_key_event(&key(code, modifiers), &parse_key_binding(binding).unwrap())
    }

    #[test]
    fn plain_binding_requires_no_ctrl() {
        assert!(matches(KeyCode::Char('q'), KeyModifiers::NONE, "q"));
        assert!(!matches(KeyCode::Char('q'), KeyModifiers::CONTROL, "q"));
        assert!(!matches(KeyCode::Char('Q'), KeyModifiers::SHIFT, "q"));
        assert!(matches(KeyCode::Char('X'), KeyModifiers::SHIFT, "X"));
        assert!(matches(KeyCode::F(1), KeyModifiers::NONE, "F1"));
    }

    #[test]
    fn ctrl_binding_matches_either_case() {
        assert!(matches(KeyCode::Char('s'), KeyModifiers::CONTROL, "Ctrl+s"));
        assert!(matches(KeyCode::Char('S'), KeyModifiers::CONTROL, "Ctrl+s"));
        assert!(!matches(KeyCode::Char('s'), KeyModifiers::NONE, "Ctrl+s"));
    }

    #[test]
    fn expand_path_leaves_absolute_paths_alone() {
        assert_eq!(expand_path("/var/tmp/x.db"), PathBuf::from("/var/tmp/x.db"));
    }
}
