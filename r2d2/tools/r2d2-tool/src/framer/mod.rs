use crate::config::{BlankPolicy, FramerConfig};
use crate::detector::Symbol;

/// Accumulates confirmed keys into a message, ending the message once
/// enough blank symbols have been seen.
pub struct MessageFramer {
    message: String,
    blank_count: usize,
    config: FramerConfig,
}

impl MessageFramer {
    pub fn new(config: &FramerConfig) -> Self {
        Self {
            message: String::new(),
            blank_count: 0,
            config: config.clone(),
        }
    }

    pub fn feed(&mut self, symbol: Symbol) -> Option<String> {
        match symbol {
            Symbol::Blank => {
                self.blank_count += 1;

                if self.blank_count >= self.config.blank_limit && !self.message.is_empty() {
                    self.blank_count = 0;
                    return Some(std::mem::take(&mut self.message));
                }
            },
            Symbol::Key(key) => {
                self.message.push(key);

                if self.config.blank_policy == BlankPolicy::Trailing {
                    self.blank_count = 0;
                }
            },
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::detector::Symbol::{Blank, Key};

    fn frame(config: &FramerConfig, symbols: &[Symbol]) -> Vec<String> {
        let mut framer = MessageFramer::new(config);
        symbols.iter().filter_map(|&symbol| framer.feed(symbol)).collect()
    }

    #[test]
    fn five_blanks_end_message() {
        let symbols = [Key('1'), Key('2'), Blank, Blank, Blank, Blank, Blank, Key('3')];
        assert_eq!(frame(&FramerConfig::default(), &symbols), vec!["12"]);

        // "3" started a fresh message.
        let mut framer = MessageFramer::new(&FramerConfig::default());
        for symbol in symbols {
            framer.feed(symbol);
        }
        for _ in 0..4 {
            assert_eq!(framer.feed(Blank), None);
        }
        assert_eq!(framer.feed(Blank), Some("3".to_string()));
    }

    #[test]
    fn leading_blanks_are_ignored_but_counted() {
        let config = FramerConfig::default();
        let symbols = [Blank, Blank, Blank, Blank, Blank, Blank, Key('4'), Blank];
        assert_eq!(frame(&config, &symbols), vec!["4"]);
    }

    #[test]
    fn cumulative_blanks_split_messages() {
        let symbols = [
            Key('1'), Blank, Key('2'), Blank, Key('3'), Blank,
            Key('4'), Blank, Key('5'), Blank, Key('6'),
        ];
        assert_eq!(frame(&FramerConfig::default(), &symbols), vec!["12345"]);
    }

    #[test]
    fn trailing_policy_resets_on_key() {
        let config = FramerConfig {
            blank_policy: BlankPolicy::Trailing,
            ..FramerConfig::default()
        };
        let mut symbols = vec![
            Key('1'), Blank, Key('2'), Blank, Key('3'), Blank,
            Key('4'), Blank, Key('5'), Blank, Key('6'),
        ];
        assert_eq!(frame(&config, &symbols), Vec::<String>::new());

        symbols.extend([Blank; 5]);
        assert_eq!(frame(&config, &symbols), vec!["123456"]);
    }
}
