//! Blueprint -> audio prompt

use upop_core::Blueprint;

/// Render the sound-generation prompt for a blueprint
///
/// `Create a {sonic_vibe} instrumental track with {tempo_and_energy}. The mood
/// should capture {core_emotion}. {instruments}.` with every clause whose value
/// is empty left out. Never returns an empty string.
pub fn compile_prompt(blueprint: &Blueprint) -> String {
    let vibe = blueprint.sonic_vibe.trim();
    let tempo = blueprint.tempo_and_energy.trim();
    let emotion = blueprint.core_emotion.trim();
    let instruments: Vec<&str> = blueprint
        .instrumentation_ideas
        .iter()
        .map(|i| i.trim())
        .filter(|i| !i.is_empty())
        .collect();

    let mut prompt = if vibe.is_empty() {
        String::from("Create an instrumental track")
    } else {
        format!("Create a {} instrumental track", vibe)
    };
    if !tempo.is_empty() {
        prompt.push_str(" with ");
        prompt.push_str(tempo);
    }
    prompt.push('.');

    if !emotion.is_empty() {
        prompt.push_str(" The mood should capture ");
        prompt.push_str(emotion);
        prompt.push('.');
    }

    if !instruments.is_empty() {
        prompt.push(' ');
        prompt.push_str(&instruments.join(", "));
        prompt.push('.');
    }

    prompt
}
