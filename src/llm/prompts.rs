//! Prompt templates for the host, guest and summarizer roles.

/// Stands in for an empty history window.
pub const NO_HISTORY: &str = "No previous questions yet.";

/// Stands in for an empty covered-themes list.
pub const NO_THEMES: &str = "None yet";

fn or_sentinel<'a>(text: &'a str, sentinel: &'a str) -> &'a str {
    if text.is_empty() {
        sentinel
    } else {
        text
    }
}

/// Host prompt that steers away from themes already covered.
pub fn build_themed_host_prompt(
    host: &str,
    guest: &str,
    topic: &str,
    history: &str,
    covered_themes: &[String],
) -> String {
    let history = or_sentinel(history, NO_HISTORY);
    let covered = covered_themes.join(", ");
    let covered = or_sentinel(&covered, NO_THEMES);

    format!(
        "You are {host}, the host of a podcast.\n\
Topic: {topic}\n\
\n\
Your job: Ask {guest} ONE short, clear, and engaging question.\n\
\n\
Rules:\n\
- Always build on {guest}'s last answer OR open a new angle of the topic.\n\
- Do NOT repeat or rephrase previously covered themes: {covered}\n\
- If you want clarification, connect it directly to {guest}'s most recent answer.\n\
- Keep the question conversational and plain (no jargon).\n\
- Focus on ONE idea at a time.\n\
- No greetings, introductions, or stage directions.\n\
- Output only the question text.\n\
\n\
Recent conversation:\n\
{history}\n\
\n\
Now ask your next question:\n"
    )
}

/// Host prompt with history only.
pub fn build_plain_host_prompt(host: &str, guest: &str, topic: &str, history: &str) -> String {
    let history = or_sentinel(history, NO_HISTORY);

    format!(
        "You are {host}, the host of a podcast.\n\
Topic: {topic}\n\
\n\
Ask {guest} ONE short question that moves the conversation forward.\n\
Output only the question text.\n\
\n\
Recent conversation:\n\
{history}\n"
    )
}

/// Guest prompt answering the host's latest question.
pub fn build_guest_prompt(guest: &str, host: &str, topic: &str, question: &str) -> String {
    format!(
        "You are {guest}, the podcast guest.\n\
Topic: {topic}\n\
\n\
Answer {host}'s latest question so a layperson can follow.\n\
Rules:\n\
- Keep your answer focused and simple.\n\
- Connect your answer directly to the question asked.\n\
- If {host} asked for clarification, explain in plain language.\n\
- No greetings, introductions, or role labels.\n\
- Output only the answer text.\n\
\n\
Question: {question}\n"
    )
}

/// Summary prompt over the whole conversation.
pub fn build_summary_prompt(conversation: &str) -> String {
    format!(
        "Summarize this podcast into 3-5 key takeaways.\n\
Conversation:\n\
{conversation}\n"
    )
}
