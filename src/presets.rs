//! Preset conversation starters
//!
//! A fixed library of prompts grouped by category, offered to the user when
//! starting a new chat.

use serde::Serialize;

/// A single preset prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PresetPrompt {
    /// Stable identifier, e.g. `decision-1`
    pub id: &'static str,
    /// Prompt text inserted into the chat input
    pub text: &'static str,
    /// Short category label
    pub category: &'static str,
    /// Icon shown next to the prompt
    pub emoji: &'static str,
}

/// A named group of preset prompts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PresetCategory {
    /// Display name, e.g. `Decision Making & Planning`
    pub name: &'static str,
    /// Icon shown next to the category
    pub emoji: &'static str,
    /// Prompts in display order
    pub prompts: &'static [PresetPrompt],
}

macro_rules! prompt {
    ($id:literal, $category:literal, $emoji:literal, $text:literal) => {
        PresetPrompt {
            id: $id,
            text: $text,
            category: $category,
            emoji: $emoji,
        }
    };
}

/// The default preset library
pub static DEFAULT_PRESETS: &[PresetCategory] = &[
    PresetCategory {
        name: "Decision Making & Planning",
        emoji: "🤔",
        prompts: &[
            prompt!("decision-1", "Decision Making", "🤔",
                "Help me think through the pros and cons of a major decision I'm facing. Ask me questions to understand my situation better."),
            prompt!("decision-2", "Decision Making", "🤔",
                "I'm considering two different career paths. Can you help me evaluate the pros and cons of each option?"),
            prompt!("decision-3", "Decision Making", "🤔",
                "Help me plan a thoughtful birthday surprise. What are some creative ideas I should consider?"),
        ],
    },
    PresetCategory {
        name: "Communication & Writing",
        emoji: "✍️",
        prompts: &[
            prompt!("comm-1", "Communication", "✍️",
                "Draft a polite follow-up message for someone who hasn't responded to my previous message. Make it friendly and non-pushy."),
            prompt!("comm-2", "Communication", "✍️",
                "Help me write a professional email. I'll tell you who it's for and what it's about."),
            prompt!("comm-3", "Communication", "✍️",
                "I have a message I'd like to rewrite. Can you help me make it sound more professional and polished?"),
        ],
    },
    PresetCategory {
        name: "Daily Planning & Organization",
        emoji: "📅",
        prompts: &[
            prompt!("planning-1", "Planning", "📅",
                "Help me create an effective daily schedule. What's the best way to structure my day for maximum productivity?"),
            prompt!("planning-2", "Planning", "📅",
                "What should I focus on today? Help me identify my top priorities and create a plan."),
            prompt!("planning-3", "Planning", "📅",
                "Help me organize my week. What's the best approach to balance my work, personal tasks, and self-care?"),
        ],
    },
    PresetCategory {
        name: "Personal Tasks & Reminders",
        emoji: "✅",
        prompts: &[
            prompt!("tasks-1", "Tasks", "✅",
                "I have some ingredients in my fridge and need meal ideas. Can you suggest recipes based on what I have?"),
            prompt!("tasks-2", "Tasks", "✅",
                "Help me create a comprehensive checklist for an upcoming trip. What are the essential things I shouldn't forget?"),
            prompt!("tasks-3", "Tasks", "✅",
                "What are some important things I should remember to do this week? Help me think of tasks I might be forgetting."),
        ],
    },
    PresetCategory {
        name: "Problem Solving & Advice",
        emoji: "💡",
        prompts: &[
            prompt!("advice-1", "Advice", "💡",
                "I'm facing a challenge and need help thinking through solutions. Can you ask me questions to better understand my situation?"),
            prompt!("advice-2", "Advice", "💡",
                "I'm dealing with a difficult situation at work. What are some strategies I could use to handle it effectively?"),
            prompt!("advice-3", "Advice", "💡",
                "Help me brainstorm creative ways to achieve a goal I have. I'll share the goal with you."),
        ],
    },
    PresetCategory {
        name: "Time Management & Productivity",
        emoji: "⏰",
        prompts: &[
            prompt!("time-1", "Time Management", "⏰",
                "I have multiple tasks to complete. How should I prioritize them? What's the best method for deciding what to do first?"),
            prompt!("time-2", "Time Management", "⏰",
                "Help me estimate how long different tasks will take. I'll share my task list with you."),
            prompt!("time-3", "Time Management", "⏰",
                "I have a big project to tackle. What's the best way to break it down into smaller, manageable steps?"),
        ],
    },
];

/// Iterate every preset prompt in display order
pub fn all_prompts() -> impl Iterator<Item = &'static PresetPrompt> {
    DEFAULT_PRESETS.iter().flat_map(|category| category.prompts.iter())
}

/// Look up a prompt by id
///
/// # Examples
///
/// ```
/// use chatlens::presets::find_prompt;
///
/// let prompt = find_prompt("comm-2").unwrap();
/// assert_eq!(prompt.category, "Communication");
/// assert!(find_prompt("nope").is_none());
/// ```
pub fn find_prompt(id: &str) -> Option<&'static PresetPrompt> {
    all_prompts().find(|prompt| prompt.id == id)
}

/// Look up a category by its display name or prompt category label, ignoring case
pub fn category(name: &str) -> Option<&'static PresetCategory> {
    let wanted = name.trim().to_lowercase();
    DEFAULT_PRESETS.iter().find(|category| {
        category.name.to_lowercase() == wanted
            || category
                .prompts
                .first()
                .is_some_and(|p| p.category.to_lowercase() == wanted)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_six_categories_of_three_prompts() {
        assert_eq!(DEFAULT_PRESETS.len(), 6);
        assert!(DEFAULT_PRESETS.iter().all(|c| c.prompts.len() == 3));
        assert_eq!(all_prompts().count(), 18);
    }

    #[test]
    fn test_prompt_ids_are_unique() {
        let ids: HashSet<&str> = all_prompts().map(|p| p.id).collect();
        assert_eq!(ids.len(), 18);
    }

    #[test]
    fn test_prompts_share_category_emoji() {
        for category in DEFAULT_PRESETS {
            for prompt in category.prompts {
                assert_eq!(prompt.emoji, category.emoji, "{}", prompt.id);
            }
        }
    }

    #[test]
    fn test_category_lookup_is_case_insensitive() {
        let by_name = category("daily planning & organization").unwrap();
        assert_eq!(by_name.emoji, "📅");

        let by_label = category("TIME MANAGEMENT").unwrap();
        assert_eq!(by_label.name, "Time Management & Productivity");

        assert!(category("gardening").is_none());
    }

    #[test]
    fn test_find_prompt() {
        let prompt = find_prompt("tasks-2").unwrap();
        assert!(prompt.text.contains("checklist"));
        assert!(find_prompt("").is_none());
    }

    #[test]
    fn test_presets_serialize() {
        let json = serde_json::to_value(DEFAULT_PRESETS).unwrap();
        assert_eq!(json[0]["prompts"][0]["id"], "decision-1");
    }
}
