//! UI utilities for the client.

use std::io::Write;

/// Prompt shown by the REPL: the current channel (shortened) or a dash.
pub fn prompt(current_channel: Option<&str>) -> String {
    match current_channel {
        Some(channel) => format!("{}> ", short_name(channel)),
        None => "-> ".to_string(),
    }
}

/// Generated channel names are 32 hex characters; shorten them for display.
pub fn short_name(name: &str) -> &str {
    if name.len() > 12 && name.chars().all(|c| c.is_ascii_hexdigit()) {
        &name[..8]
    } else {
        name
    }
}

/// Redisplay the prompt after printing a message.
pub fn redisplay_prompt(current_channel: Option<&str>) {
    print!("{}", prompt(current_channel));
    std::io::stdout().flush().ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_shows_current_channel() {
        // テスト項目: プロンプトに現在のチャンネルが表示される
        assert_eq!(prompt(Some("lobby")), "lobby> ");
        assert_eq!(prompt(None), "-> ");
    }

    #[test]
    fn test_short_name_truncates_generated_names() {
        // テスト項目: 生成名（32桁16進）は先頭8文字に短縮される
        assert_eq!(
            short_name("0123456789abcdef0123456789abcdef"),
            "01234567"
        );
        assert_eq!(short_name("lobby"), "lobby");
        assert_eq!(short_name("my-long-channel-name"), "my-long-channel-name");
    }
}
