//! Splitting of text that exceeds Discord's message length limit.

use serenity::all::{ChannelId, MessageId};

use crate::{
    discord::{MessageSink, OutgoingMessage, SentMessage},
    error::AppError,
};

/// Maximum characters per message, leaving headroom below Discord's 2000 limit.
pub const MESSAGE_MAX_LENGTH: usize = 1900;

/// Invisible character used so Discord doesn't trim leading/trailing newlines.
const BLANK: &str = "\u{2800}";

/// Sends `content` as as few messages as possible, breaking on line boundaries.
///
/// Only the first message replies to `reply_to`.
///
/// # Returns
/// - `Ok(Vec<SentMessage>)` - Every message sent, in order (never empty for
///   non-empty content)
/// - `Err(AppError)` - A send failed; messages sent before it are not rolled back
pub async fn send_long_message(
    sink: &dyn MessageSink,
    channel_id: ChannelId,
    content: &str,
    reply_to: Option<MessageId>,
) -> Result<Vec<SentMessage>, AppError> {
    let mut sent = Vec::new();

    for (index, chunk) in split_message(content).into_iter().enumerate() {
        let mut message = OutgoingMessage::text(chunk);
        if index == 0 {
            message.reply_to = reply_to;
        }
        sent.push(sink.send(channel_id, message).await?);
    }

    Ok(sent)
}

/// Groups lines into chunks of at most [`MESSAGE_MAX_LENGTH`] characters,
/// counting the newlines that join them.
///
/// Lines longer than the limit are cut into pieces marked with ellipses.
pub fn split_message(content: &str) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current: Vec<String> = Vec::new();
    let mut current_len = 0;

    for line in split_lines(content) {
        // Empty lines count as one char since they may be padded with BLANK.
        let line_len = line.chars().count().max(1);
        let separator = usize::from(!current.is_empty());
        if current_len + separator + line_len > MESSAGE_MAX_LENGTH && !current.is_empty() {
            chunks.push(join_lines(&current));
            current.clear();
            current_len = 0;
        }
        current_len += usize::from(!current.is_empty()) + line_len;
        current.push(line);
    }

    if !current.is_empty() {
        chunks.push(join_lines(&current));
    }

    chunks
}

fn split_lines(content: &str) -> Vec<String> {
    let mut lines = Vec::new();

    for line in content.split('\n') {
        let chars: Vec<char> = line.chars().collect();
        if chars.len() <= MESSAGE_MAX_LENGTH {
            lines.push(line.to_string());
            continue;
        }

        let pieces: Vec<String> = chars
            .chunks(MESSAGE_MAX_LENGTH - 4)
            .map(|piece| piece.iter().collect())
            .collect();
        let last = pieces.len() - 1;
        for (index, piece) in pieces.into_iter().enumerate() {
            let piece = match index {
                0 => format!("{piece} …"),
                i if i == last => format!("… {piece}"),
                _ => format!("… {piece} …"),
            };
            lines.push(piece);
        }
    }

    lines
}

fn join_lines(lines: &[String]) -> String {
    let mut content = lines.join("\n");
    if content.starts_with('\n') {
        content.insert_str(0, BLANK);
    }
    if content.ends_with('\n') {
        content.push_str(BLANK);
    }
    content
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discord::testing::RecordingSink;

    #[test]
    fn short_content_is_one_chunk() {
        assert_eq!(split_message("hello\nworld"), vec!["hello\nworld"]);
    }

    #[test]
    fn chunks_break_on_line_boundaries() {
        let line = "a".repeat(1000);
        let content = format!("{line}\n{line}\n{line}");

        let chunks = split_message(&content);

        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|chunk| chunk.chars().count() <= MESSAGE_MAX_LENGTH));
    }

    #[test]
    fn overlong_line_is_cut_with_ellipses() {
        let content = "b".repeat(MESSAGE_MAX_LENGTH * 2);

        let chunks = split_message(&content);

        assert_eq!(chunks.len(), 3);
        assert!(chunks[0].ends_with(" …"));
        assert!(chunks[1].starts_with("… ") && chunks[1].ends_with(" …"));
        assert!(chunks[2].starts_with("… "));
    }

    /// Tests that the newlines joining many short lines count towards the limit.
    ///
    /// Expected: every chunk fits the limit and the chunks rejoin to the input
    #[test]
    fn many_short_lines_stay_within_limit() {
        let content = vec!["abcde"; 400].join("\n");

        let chunks = split_message(&content);

        assert_eq!(chunks.len(), 2);
        assert!(chunks.iter().all(|chunk| chunk.chars().count() <= MESSAGE_MAX_LENGTH));
        assert_eq!(chunks.join("\n"), content);
    }

    /// Tests that blank lines padded at chunk edges still fit the limit.
    ///
    /// Expected: no chunk exceeds the limit
    #[test]
    fn blank_lines_stay_within_limit() {
        let content = vec![""; 2500].join("\n");

        let chunks = split_message(&content);

        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|chunk| chunk.chars().count() <= MESSAGE_MAX_LENGTH));
    }

    /// Tests that only the first chunk replies to the original message.
    ///
    /// Expected: reply reference on the first sent message only
    #[tokio::test]
    async fn only_first_chunk_is_a_reply() {
        let sink = RecordingSink::new();
        let line = "c".repeat(1500);
        let content = format!("{line}\n{line}");

        let sent = send_long_message(&sink, ChannelId::new(1), &content, Some(MessageId::new(9)))
            .await
            .unwrap();

        assert_eq!(sent.len(), 2);
        let messages = sink.sent().await;
        assert_eq!(messages[0].1.reply_to, Some(MessageId::new(9)));
        assert_eq!(messages[1].1.reply_to, None);
    }
}
