use std::cell::RefCell;
use std::rc::Rc;

use reach_core::LabelDisplay;

/// Instruction texts paged through with a "next" button; closes after the last.
#[derive(Debug, Clone)]
pub struct TextPanel {
    texts: Vec<String>,
    index: usize,
}

impl TextPanel {
    pub fn new(texts: Vec<String>) -> Self {
        if let Some(first) = texts.first() {
            log::info!("panel: {first}");
        }
        Self { texts, index: 0 }
    }

    pub fn current(&self) -> Option<&str> {
        self.texts.get(self.index).map(String::as_str)
    }

    pub fn is_open(&self) -> bool {
        self.index < self.texts.len()
    }

    /// Returns whether the panel is still open afterwards.
    pub fn next(&mut self) -> bool {
        if !self.is_open() {
            return false;
        }
        self.index += 1;
        match self.current() {
            Some(text) => {
                log::info!("panel: {text}");
                true
            }
            None => {
                log::debug!("panel closed");
                false
            }
        }
    }
}

#[derive(Debug, Default)]
struct BoardState {
    label: Option<String>,
    timer_running: bool,
    label_changes: usize,
}

/// Target name text plus start-object color, logged instead of drawn.
#[derive(Debug, Clone, Default)]
pub struct LabelBoard(Rc<RefCell<BoardState>>);

impl LabelBoard {
    pub fn label(&self) -> Option<String> {
        self.0.borrow().label.clone()
    }

    pub fn timer_running(&self) -> bool {
        self.0.borrow().timer_running
    }

    pub fn label_changes(&self) -> usize {
        self.0.borrow().label_changes
    }
}

impl LabelDisplay for LabelBoard {
    fn show_label(&mut self, text: &str) {
        let mut state = self.0.borrow_mut();
        log::info!("target: {text}");
        state.label = Some(text.to_string());
        state.label_changes += 1;
    }

    fn show_timer_running(&mut self, running: bool) {
        log::debug!("start object {}", if running { "armed" } else { "idle" });
        self.0.borrow_mut().timer_running = running;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_then_closes() {
        let mut panel = TextPanel::new(vec!["one".into(), "two".into()]);
        assert_eq!(panel.current(), Some("one"));
        assert!(panel.next());
        assert_eq!(panel.current(), Some("two"));
        assert!(!panel.next());
        assert!(!panel.is_open());
        assert!(!panel.next());
    }

    #[test]
    fn empty_panel_starts_closed() {
        assert!(!TextPanel::new(Vec::new()).is_open());
    }

    #[test]
    fn board_tracks_display_calls() {
        let board = LabelBoard::default();
        let mut sink = board.clone();
        sink.show_label("Ant");
        sink.show_timer_running(true);
        assert_eq!(board.label().as_deref(), Some("Ant"));
        assert!(board.timer_running());
        assert_eq!(board.label_changes(), 1);
    }
}
