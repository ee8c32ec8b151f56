use crate::config::DebounceConfig;
use crate::detector::Symbol;

/// Collapses runs of repeated raw symbols into confirmed symbols.
///
/// A run of `run_length` identical readings is confirmed by the next reading,
/// whatever it is. A reading that continues the run starts counting again
/// from zero, so a long steady tone is re-emitted periodically.
pub struct Debouncer {
    // `None` until the first reading, so no real symbol can match it.
    current: Option<Symbol>,
    run_count: usize,
    run_length: usize,
}

impl Debouncer {
    pub fn new(config: &DebounceConfig) -> Self {
        Self {
            current: None,
            run_count: 0,
            run_length: config.run_length,
        }
    }

    pub fn feed(&mut self, code: Symbol) -> Option<Symbol> {
        let same = self.current == Some(code);

        if self.run_count == self.run_length {
            let confirmed = self.current;
            if same {
                self.run_count = 0;
            } else {
                self.current = Some(code);
                self.run_count = 1;
            }
            confirmed
        } else {
            if same {
                self.run_count += 1;
            } else {
                self.current = Some(code);
                self.run_count = 1;
            }
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::detector::Symbol::{Blank, Key};

    fn debounce(codes: &[Symbol]) -> Vec<Symbol> {
        let mut debouncer = Debouncer::new(&DebounceConfig::default());
        codes.iter().filter_map(|&code| debouncer.feed(code)).collect()
    }

    const A: Symbol = Key('A');
    const B: Symbol = Key('B');

    #[test]
    fn four_in_a_row() {
        assert_eq!(debounce(&[A, A, A]), Vec::<Symbol>::new());
        assert_eq!(debounce(&[A, A, A, A]), vec![A]);
    }

    #[test]
    fn steady_run_re_emits() {
        // The run restarts at zero after each confirmation, and the next
        // confirmation happens on the reading after three more.
        assert_eq!(debounce(&[A; 7]), vec![A]);
        assert_eq!(debounce(&[A; 8]), vec![A, A]);
        assert_eq!(debounce(&[A, A, A, A, A, A, A, B]), vec![A, A]);
    }

    #[test]
    fn interrupted_run_is_dropped() {
        assert_eq!(debounce(&[A, A, B, B, B, B]), vec![B]);
    }

    #[test]
    fn run_of_three_confirmed_by_change() {
        assert_eq!(debounce(&[A, A, A, B]), vec![A]);
        assert_eq!(debounce(&[A, A, A, Blank, Blank, B, B, B, Blank]), vec![A, B]);
    }

    #[test]
    fn blanks_debounce_too() {
        assert_eq!(debounce(&[Blank; 4]), vec![Blank]);
        assert_eq!(debounce(&[Blank, Blank, A, A, A, A, Blank, Blank]), vec![A]);
    }

    #[test]
    fn run_length_is_injected() {
        let mut debouncer = Debouncer::new(&DebounceConfig { run_length: 1 });
        let out: Vec<Symbol> = [A, A, B, B].iter().filter_map(|&c| debouncer.feed(c)).collect();
        assert_eq!(out, vec![A, B]);
    }
}
