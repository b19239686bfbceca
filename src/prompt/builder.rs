//! Fixed instructional templates for the three request kinds.
//!
//! Each builder returns a [`PromptParts`] pair: the system instruction sets
//! the model's role and the required output structure, the user query carries
//! the request-specific values.  `build_narrate` additionally yields the
//! prebuilt voice id bound to the chosen style.

use crate::prompt::params::EncounterParams;

// ---------------------------------------------------------------------------
// System instructions
// ---------------------------------------------------------------------------

/// Generate — casts the model as an encounter designer and mandates the
/// markdown structure: narrative hook, stat block list, balance justification.
const SYSTEM_INSTRUCTION_GENERATE: &str = "\
You are an expert tabletop RPG encounter designer for Dungeons & Dragons 5th Edition.
Task: Design one complete combat encounter for the party described by the user.

Rules:
1. Respect the party size, average level, and requested difficulty exactly.
2. Choose monsters that fit the given terrain and flavor.
3. Reply in markdown, in this exact order:
   - A '## Narrative Hook' section: 2-3 sentences of evocative scene-setting.
   - A '## Monsters' section: one bullet per monster with name, count, and a
     one-line stat summary (AC, HP, notable attack).
   - A '## Balance' section: a short justification of why this encounter
     matches the requested difficulty for this party.
4. Reply with ONLY the encounter markdown — no preamble, no explanation.";

/// Flesh-out — asks for three additional sections appended to an existing
/// encounter.
const SYSTEM_INSTRUCTION_FLESH_OUT: &str = "\
You are an expert tabletop RPG encounter designer for Dungeons & Dragons 5th Edition.
Task: Expand the existing encounter the user provides with additional detail.

Rules:
1. Do NOT repeat or rewrite the existing encounter text.
2. Reply in markdown with exactly three new sections, in this order:
   - A '## Tactics' section: how the monsters fight, round by round.
   - A '## Environment' section: terrain features, hazards, and cover.
   - A '## Treasure' section: loot appropriate to the monsters and party level.
3. Reply with ONLY the three new sections — no preamble, no explanation.";

/// Narrate (dramatic) — booming dungeon-master delivery.
const SYSTEM_INSTRUCTION_NARRATE_DRAMATIC: &str = "\
You are a dungeon master narrating aloud at the table.
Read the following opening line in a dramatic, booming voice, with weighty
pauses and rising tension. Speak only the text you are given.";

/// Narrate (monotone) — flat, fast delivery.
const SYSTEM_INSTRUCTION_NARRATE_MONOTONE: &str = "\
You are a bored dungeon master rushing through the session.
Read the following opening line in a flat, fast monotone, with no emphasis
and no pauses. Speak only the text you are given.";

// ---------------------------------------------------------------------------
// PromptParts / NarrationStyle
// ---------------------------------------------------------------------------

/// A system instruction + user query pair, ready for the wire layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptParts {
    pub system: String,
    pub user: String,
}

/// The two fixed narration styles, each bound to a distinct prebuilt voice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NarrationStyle {
    /// Slow, theatrical delivery.
    Dramatic,
    /// Flat and fast.
    Monotone,
}

impl NarrationStyle {
    /// The fixed prebuilt voice id sent in the speech config.
    pub fn voice_name(&self) -> &'static str {
        match self {
            NarrationStyle::Dramatic => "Charon",
            NarrationStyle::Monotone => "Puck",
        }
    }

    fn system_instruction(&self) -> &'static str {
        match self {
            NarrationStyle::Dramatic => SYSTEM_INSTRUCTION_NARRATE_DRAMATIC,
            NarrationStyle::Monotone => SYSTEM_INSTRUCTION_NARRATE_MONOTONE,
        }
    }
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

/// Build the generate prompt from request parameters.
///
/// The user query embeds every constraint; the enemy-count line appears only
/// when a count was requested.
///
/// ```rust
/// use encounter_forge::prompt::{build_generate, Difficulty, EncounterParams};
///
/// let params = EncounterParams {
///     party_size: 4,
///     average_level: 5,
///     difficulty: Difficulty::Medium,
///     terrain: "Forest Ruin".into(),
///     flavor: "guard duty".into(),
///     enemy_count: None,
/// };
/// let parts = build_generate(&params);
/// assert!(parts.user.contains("4 characters"));
/// assert!(parts.system.contains("Narrative Hook"));
/// ```
pub fn build_generate(params: &EncounterParams) -> PromptParts {
    let mut user = String::with_capacity(512);
    user.push_str(&format!(
        "Design a {} encounter for a party of {} characters of average level {}.\n",
        params.difficulty, params.party_size, params.average_level
    ));
    user.push_str(&format!("Terrain: {}\n", params.terrain));
    user.push_str(&format!("Flavor: {}\n", params.flavor));
    if let Some(count) = params.enemy_count {
        user.push_str(&format!("Use exactly {count} enemies.\n"));
    }

    PromptParts {
        system: SYSTEM_INSTRUCTION_GENERATE.to_string(),
        user,
    }
}

/// Build the flesh-out prompt from the current narrative.
///
/// The entire existing narrative is passed as context so the new sections
/// reference the monsters and scene already established.
pub fn build_flesh_out(narrative: &str) -> PromptParts {
    let user = format!(
        "Here is the existing encounter:\n\n{narrative}\n\n\
         Add the Tactics, Environment, and Treasure sections.\n"
    );

    PromptParts {
        system: SYSTEM_INSTRUCTION_FLESH_OUT.to_string(),
        user,
    }
}

/// Build the narrate prompt for the opening line of the narrative.
///
/// Only the first paragraph of the narrative is spoken; the style selects
/// both the delivery instruction and the fixed voice id.
pub fn build_narrate(narrative: &str, style: NarrationStyle) -> (PromptParts, &'static str) {
    let opening = first_paragraph(narrative);

    let parts = PromptParts {
        system: style.system_instruction().to_string(),
        user: opening.to_string(),
    };
    (parts, style.voice_name())
}

/// The text up to (not including) the first blank line.
///
/// Both LF and CRLF blank lines count as paragraph breaks.  Trailing
/// whitespace on the extracted paragraph is trimmed; a narrative with no
/// blank line is returned whole.
pub fn first_paragraph(text: &str) -> &str {
    let trimmed = text.trim_start_matches(['\r', '\n']);
    let end = match (trimmed.find("\n\n"), trimmed.find("\r\n\r\n")) {
        (Some(lf), Some(crlf)) => Some(lf.min(crlf)),
        (lf, crlf) => lf.or(crlf),
    };
    match end {
        Some(idx) => trimmed[..idx].trim_end(),
        None => trimmed.trim_end(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::params::Difficulty;

    fn params() -> EncounterParams {
        EncounterParams {
            party_size: 4,
            average_level: 5,
            difficulty: Difficulty::Medium,
            terrain: "Forest Ruin".into(),
            flavor: "guard duty".into(),
            enemy_count: None,
        }
    }

    // -----------------------------------------------------------------------
    // Generate
    // -----------------------------------------------------------------------

    #[test]
    fn generate_system_mandates_markdown_structure() {
        let parts = build_generate(&params());
        assert!(parts.system.contains("Narrative Hook"));
        assert!(parts.system.contains("Monsters"));
        assert!(parts.system.contains("Balance"));
        assert!(parts.system.contains("encounter designer"));
    }

    #[test]
    fn generate_user_embeds_all_constraints() {
        let parts = build_generate(&params());
        assert!(parts.user.contains("Medium"));
        assert!(parts.user.contains("4 characters"));
        assert!(parts.user.contains("average level 5"));
        assert!(parts.user.contains("Terrain: Forest Ruin"));
        assert!(parts.user.contains("Flavor: guard duty"));
    }

    #[test]
    fn generate_omits_enemy_count_when_absent() {
        let parts = build_generate(&params());
        assert!(!parts.user.contains("exactly"));
    }

    #[test]
    fn generate_includes_enemy_count_when_present() {
        let mut p = params();
        p.enemy_count = Some(6);
        let parts = build_generate(&p);
        assert!(parts.user.contains("exactly 6 enemies"));
    }

    /// The builder must be reproducible: same input, same output.
    #[test]
    fn generate_is_deterministic() {
        let p = params();
        assert_eq!(build_generate(&p), build_generate(&p));
    }

    // -----------------------------------------------------------------------
    // Flesh-out
    // -----------------------------------------------------------------------

    #[test]
    fn flesh_out_asks_for_three_sections() {
        let parts = build_flesh_out("## Narrative Hook\nGoblins.");
        assert!(parts.system.contains("Tactics"));
        assert!(parts.system.contains("Environment"));
        assert!(parts.system.contains("Treasure"));
    }

    #[test]
    fn flesh_out_embeds_current_narrative() {
        let parts = build_flesh_out("## Narrative Hook\nGoblins ambush the road.");
        assert!(parts.user.contains("Goblins ambush the road."));
    }

    // -----------------------------------------------------------------------
    // Narrate
    // -----------------------------------------------------------------------

    #[test]
    fn narrate_uses_only_first_paragraph() {
        let narrative = "The ruin looms ahead.\nCrows scatter.\n\n## Monsters\n- Goblin x4";
        let (parts, _) = build_narrate(narrative, NarrationStyle::Dramatic);
        assert_eq!(parts.user, "The ruin looms ahead.\nCrows scatter.");
        assert!(!parts.user.contains("Monsters"));
    }

    #[test]
    fn narrate_styles_bind_distinct_fixed_voices() {
        let (_, dramatic) = build_narrate("x", NarrationStyle::Dramatic);
        let (_, monotone) = build_narrate("x", NarrationStyle::Monotone);
        assert_eq!(dramatic, "Charon");
        assert_eq!(monotone, "Puck");
        assert_ne!(dramatic, monotone);
    }

    #[test]
    fn narrate_instructions_differ_by_style() {
        let (d, _) = build_narrate("x", NarrationStyle::Dramatic);
        let (m, _) = build_narrate("x", NarrationStyle::Monotone);
        assert!(d.system.contains("dramatic"));
        assert!(m.system.contains("monotone"));
        assert_ne!(d.system, m.system);
    }

    // -----------------------------------------------------------------------
    // first_paragraph
    // -----------------------------------------------------------------------

    #[test]
    fn first_paragraph_without_blank_line_is_whole_text() {
        assert_eq!(first_paragraph("single line"), "single line");
    }

    #[test]
    fn first_paragraph_stops_at_blank_line() {
        assert_eq!(first_paragraph("a\nb\n\nc"), "a\nb");
    }

    /// Model replies with Windows line endings must still stop at the first
    /// blank line instead of narrating the whole text.
    #[test]
    fn first_paragraph_stops_at_crlf_blank_line() {
        assert_eq!(
            first_paragraph("The ruin looms.\r\nCrows scatter.\r\n\r\n## Monsters"),
            "The ruin looms.\r\nCrows scatter."
        );
    }

    #[test]
    fn narrate_with_crlf_narrative_speaks_only_the_hook() {
        let (parts, _) = build_narrate("Hook.\r\n\r\n## Monsters\r\n- Goblin", NarrationStyle::Dramatic);
        assert_eq!(parts.user, "Hook.");
    }

    #[test]
    fn first_paragraph_skips_leading_newlines() {
        assert_eq!(first_paragraph("\n\nhook\n\nrest"), "hook");
    }

    #[test]
    fn first_paragraph_of_empty_text_is_empty() {
        assert_eq!(first_paragraph(""), "");
    }
}
