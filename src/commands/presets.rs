use crate::error::{ChatlensError, Result};
use crate::presets::{self, PresetCategory, DEFAULT_PRESETS};
use colored::Colorize;

/// Print the preset library, or a single category of it
pub fn show_presets(category: Option<&str>, json: bool) -> Result<()> {
    let selected: Vec<&PresetCategory> = match category {
        Some(name) => {
            let found = presets::category(name)
                .ok_or_else(|| ChatlensError::NotFound(format!("preset category {}", name)))?;
            vec![found]
        }
        None => DEFAULT_PRESETS.iter().collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&selected)?);
        return Ok(());
    }

    print!("{}", render_categories(&selected));
    Ok(())
}

/// Human-readable listing of preset categories
pub fn render_categories(categories: &[&PresetCategory]) -> String {
    let mut out = String::new();
    for category in categories {
        out.push_str(&format!("\n{} {}\n", category.emoji, category.name.bold()));
        for prompt in category.prompts {
            out.push_str(&format!("  {}  {}\n", prompt.id.cyan(), prompt.text));
        }
    }
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_all_categories() {
        let all: Vec<&PresetCategory> = DEFAULT_PRESETS.iter().collect();
        let rendered = render_categories(&all);
        for category in DEFAULT_PRESETS {
            assert!(rendered.contains(category.name));
        }
        assert!(rendered.contains("decision-1"));
        assert!(rendered.contains("time-3"));
    }

    #[test]
    fn test_show_known_category() {
        assert!(show_presets(Some("time management"), false).is_ok());
        assert!(show_presets(None, true).is_ok());
    }

    #[test]
    fn test_unknown_category_is_not_found() {
        let err = show_presets(Some("gardening"), false).unwrap_err();
        assert!(err.to_string().contains("preset category gardening"));
    }
}
