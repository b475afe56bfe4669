//! Transcript rendering
//!
//! Logger lines already went through `env_logger` while the bot ran; only
//! print-channel output and the timer summary are written here.

use bot_engine::{Channel, Response};

/// Write a response's console output to stdout
pub fn print_response(label: &str, response: &Response) {
    for line in render_prints(response) {
        println!("{}", line);
    }

    for timer in &response.timers {
        log::info!(
            "[{}] requested timer '{}' in {}s (argument: '{}')",
            label,
            timer.callback.name,
            timer.seconds,
            timer.argument
        );
    }
}

/// Print-channel lines, in order
pub fn render_prints(response: &Response) -> Vec<&str> {
    response
        .lines
        .iter()
        .filter(|line| line.channel == Channel::Print)
        .map(|line| line.message.as_str())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bot_engine::LogLine;

    #[test]
    fn test_render_prints_skips_log_lines() {
        let response = Response {
            lines: vec![
                LogLine {
                    channel: Channel::Log(log::Level::Info),
                    message: "logged".to_string(),
                },
                LogLine {
                    channel: Channel::Print,
                    message: "Your 'Front Door' opened!".to_string(),
                },
            ],
            timers: Vec::new(),
        };

        assert_eq!(render_prints(&response), vec!["Your 'Front Door' opened!"]);
    }
}
