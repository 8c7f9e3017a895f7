//! Mermaid `stateDiagram-v2` rendering for phase tables.
//!
//! Useful for documenting a flow or checking a custom configuration at
//! a glance: `stagecue diagram` renders every flow the config builds.

use crate::sequencer::PhaseTable;

const MAX_LABEL_LEN: usize = 40;

/// Renders a phase table as a Mermaid `stateDiagram-v2`.
#[must_use]
pub fn render(table: &PhaseTable) -> String {
    let mut lines = Vec::new();
    lines.push("stateDiagram-v2".to_string());

    let slugs: Vec<String> = table
        .phases()
        .iter()
        .enumerate()
        .map(|(i, p)| slugify(p.name(), i))
        .collect();

    lines.push(format!("    [*] --> {}", slugs[0]));

    for (i, phase) in table.phases().iter().enumerate() {
        let slug = &slugs[i];
        if slug != phase.name() {
            lines.push(format!("    state {} as {slug}", quote_label(phase.name())));
        }

        if let Some(auto) = phase.auto() {
            let label = format!("after {}", humantime::format_duration(auto.after));
            lines.push(format!(
                "    {slug} --> {} : {}",
                slugs[auto.target],
                quote_label(&label)
            ));
        }
        for (event, &target) in phase.transitions() {
            lines.push(format!(
                "    {slug} --> {} : {}",
                slugs[target],
                quote_label(event)
            ));
        }
        if phase.is_terminal() {
            lines.push(format!("    {slug} --> [*]"));
        }

        let effects: Vec<String> = phase
            .on_enter()
            .iter()
            .map(|e| truncate(&e.to_string(), MAX_LABEL_LEN))
            .collect();
        if !effects.is_empty() {
            lines.push(format!("    note right of {slug}"));
            for effect in effects {
                lines.push(format!("        on enter: {effect}"));
            }
            lines.push("    end note".to_string());
        }
    }

    lines.join("\n")
}

/// Turns a phase name into a slug safe for Mermaid identifiers. Falls
/// back to a positional name if nothing survives.
fn slugify(name: &str, index: usize) -> String {
    let slug: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    let slug = slug.trim_matches('_');
    if slug.is_empty() {
        format!("phase_{index}")
    } else {
        slug.to_string()
    }
}

fn quote_label(label: &str) -> String {
    let truncated = truncate(label, MAX_LABEL_LEN);
    format!("\"{}\"", truncated.replace('"', "#quot;"))
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenes;

    #[test]
    fn test_renders_linear_flow() {
        let table = scenes::countdown::table().unwrap();
        let out = render(&table);
        assert!(out.starts_with("stateDiagram-v2"));
        assert!(out.contains("[*] --> waiting"));
        assert!(out.contains("waiting --> expired : \"deadline\""));
        assert!(out.contains("done --> [*]"));
    }

    #[test]
    fn test_renders_auto_advance_label() {
        let table = scenes::chapter::table(&scenes::chapter::ChapterTimings::default()).unwrap();
        let out = render(&table);
        assert!(out.contains("after 2s"));
        assert!(out.contains("after 4s 500ms"));
    }

    #[test]
    fn test_hyphenated_names_get_aliases() {
        let table = scenes::intro::table(&scenes::intro::IntroTimings::default()).unwrap();
        let out = render(&table);
        assert!(out.contains("state \"message-1\" as message_1"));
    }

    #[test]
    fn test_effect_notes() {
        let table = scenes::bottle::table(&scenes::bottle::BottleTimings::default()).unwrap();
        let out = render(&table);
        assert!(out.contains("note right of opening"));
        assert!(out.contains("confetti-burst"));
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("message-1", 0), "message_1");
        assert_eq!(slugify("plain", 3), "plain");
        assert_eq!(slugify("---", 2), "phase_2");
    }

    #[test]
    fn test_truncate_long_labels() {
        let long = "x".repeat(60);
        let out = truncate(&long, 40);
        assert_eq!(out.chars().count(), 40);
        assert!(out.ends_with('…'));
    }
}
