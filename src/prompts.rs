//! Prompts for document summarisation.
//!
//! All prompt text lives here so it can be inspected in unit tests and tuned
//! without touching the retry or error-handling logic in
//! [`crate::summarize`]. Callers override the system prompt with
//! [`crate::config::SummaryConfig::system_prompt`].

/// System prompt asking for a summary in `language`.
///
/// The summary should be clear and easy to follow, focused on the main ideas
/// and key points of the document.
pub fn default_system_prompt(language: &str) -> String {
    format!(
        "You summarise documents. Write the summary in {language}, in clear and \
         easy-to-understand prose. Focus on the main ideas and the important points. \
         Do not invent facts that are not in the text. Return only the summary, \
         without a heading, preamble or code fences."
    )
}

/// User turn carrying the document text.
pub fn summary_user_message(text: &str) -> String {
    format!("TEXT:\n{text}\n\nSUMMARY:")
}
