use timer_core::{DisplaySink, LogSink, PeriodicPresenter};

use crate::pump::DeadlinePump;

pub type Stopwatch = PeriodicPresenter<DeadlinePump, TimeLabel, LapLog>;

/// The big time readout.
#[derive(Default)]
pub struct TimeLabel {
    pub text: String,
}

impl DisplaySink for TimeLabel {
    fn show(&mut self, text: &str) {
        self.text.clear();
        self.text.push_str(text);
    }
}

/// Lap entries in recording order, viewed from the bottom.
///
/// `scroll_offset` counts lines above the newest entry; zero follows the tail.
#[derive(Default)]
pub struct LapLog {
    pub entries: Vec<String>,
    pub scroll_offset: usize,
}

impl LapLog {
    pub fn scroll_up(&mut self) {
        if self.scroll_offset + 1 < self.entries.len() {
            self.scroll_offset += 1;
        }
    }

    pub fn scroll_down(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_sub(1);
    }

    /// The `rows` entries to show, oldest first.
    pub fn visible(&self, rows: usize) -> &[String] {
        let end = self.entries.len().saturating_sub(self.scroll_offset);
        let start = end.saturating_sub(rows);
        &self.entries[start..end]
    }
}

impl LogSink for LapLog {
    fn append(&mut self, entry: &str) {
        self.entries.push(entry.to_string());
        self.scroll_offset = 0;
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.scroll_offset = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn log_with(n: usize) -> LapLog {
        let mut log = LapLog::default();
        for i in 1..=n {
            log.append(&format!("Lap {}: 00:00:0{}.000", i, i));
        }
        log
    }

    #[test]
    fn test_visible_follows_newest() {
        let log = log_with(5);
        assert_eq!(log.visible(2), ["Lap 4: 00:00:04.000", "Lap 5: 00:00:05.000"]);
        assert_eq!(log.visible(10).len(), 5);
    }

    #[test]
    fn test_scroll_and_append_snaps_back() {
        let mut log = log_with(5);
        log.scroll_up();
        log.scroll_up();
        assert_eq!(log.visible(2), ["Lap 2: 00:00:02.000", "Lap 3: 00:00:03.000"]);

        log.append("Lap 6: 00:00:06.000");
        assert_eq!(log.scroll_offset, 0);
        assert_eq!(log.visible(1), ["Lap 6: 00:00:06.000"]);
    }

    #[test]
    fn test_scroll_is_bounded() {
        let mut log = log_with(3);
        for _ in 0..10 {
            log.scroll_up();
        }
        assert_eq!(log.scroll_offset, 2);
        assert_eq!(log.visible(3), ["Lap 1: 00:00:01.000"]);
        for _ in 0..10 {
            log.scroll_down();
        }
        assert_eq!(log.scroll_offset, 0);

        let mut empty = LapLog::default();
        empty.scroll_up();
        assert!(empty.visible(4).is_empty());
    }

    #[test]
    fn test_label_replaces_text() {
        let mut label = TimeLabel::default();
        label.show("00:00:01.000");
        label.show("00:00:02.000");
        assert_eq!(label.text, "00:00:02.000");
    }

    #[test]
    fn test_reset_clears_lap_log() {
        let mut sw: Stopwatch = Stopwatch::new(
            DeadlinePump::new(),
            TimeLabel::default(),
            LapLog::default(),
            Duration::from_millis(50),
        );
        sw.start(Duration::ZERO);
        sw.lap();
        sw.log_mut().scroll_up();
        assert_eq!(sw.log().entries, vec!["Lap 1: 00:00:00.000"]);

        sw.reset();
        assert!(sw.log().entries.is_empty());
        assert_eq!(sw.display().text, "00:00:00.000");
        assert!(sw.scheduler().is_idle());
    }
}
