use crate::types::ChatMessage;

pub const SPORTS_CONTEXT: &str = r#"You are a helpful sports assistant for a football (soccer) app called SoccerX.
You help users with:
- Football match information and schedules
- Player statistics and information
- Team details and standings
- League information
- General football questions

Keep responses concise, friendly, and informative. If you don't know specific current data,
suggest the user check the app's match listings or player database."#;

/// Flattens the system context, the most recent `window` history messages and
/// the new message into a single text prompt.
pub fn build_prompt(message: &str, history: &[ChatMessage], window: usize) -> String {
    let start = history.len().saturating_sub(window);
    let mut prompt = String::from(SPORTS_CONTEXT);
    prompt.push_str("\n\n");

    for msg in &history[start..] {
        let content = msg.content.trim();
        if content.is_empty() {
            continue;
        }
        prompt.push_str(msg.role.speaker());
        prompt.push_str(": ");
        prompt.push_str(content);
        prompt.push('\n');
    }

    prompt.push_str("User: ");
    prompt.push_str(message.trim());
    prompt.push_str("\nAssistant:");
    prompt
}
