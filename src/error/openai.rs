use thiserror::Error;

#[derive(Error, Debug)]
pub enum OpenAiError {
    /// The moderation endpoint flagged the latest user message.
    ///
    /// Never retried; the flags are shown to the user instead.
    #[error("Message flagged by moderation: {}", .0.join(", "))]
    ModerationFlagged(Vec<String>),

    /// The API answered without a usable completion.
    #[error("OpenAI response contained no completion")]
    EmptyCompletion,
}
