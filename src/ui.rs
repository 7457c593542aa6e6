use ratatui::layout::{Alignment, Constraint, Layout, Margin, Position, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::backdrop::{frost, Backdrop};
use crate::config::PanelStyle;
use crate::stopwatch::LapLog;

const BUTTON_WIDTH: u16 = 10;
const BUTTON_GAP: u16 = 2;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Button {
    StartStop,
    Reset,
    Lap,
}

/// What the panel shows for one frame.
pub struct StopwatchView<'a> {
    pub time: &'a str,
    pub running: bool,
    pub laps: &'a LapLog,
}

/// Where everything sits inside the terminal. Kept after drawing so mouse
/// clicks can be matched against the buttons.
#[derive(Clone, Copy, Debug)]
pub struct PanelLayout {
    pub panel: Rect,
    pub title: Rect,
    pub time: Rect,
    pub buttons: [(Button, Rect); 3],
    pub laps: Rect,
    pub footer: Rect,
}

impl PanelLayout {
    pub fn new(area: Rect, style: &PanelStyle) -> Self {
        let width = style.width.min(area.width);
        let height = style.height.min(area.height);
        let panel = Rect::new(
            area.x + (area.width - width) / 2,
            area.y + (area.height - height) / 2,
            width,
            height,
        );
        let inner = panel.inner(Margin::new(1, 0));
        let rows = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(inner);

        let row = rows[5];
        let total = BUTTON_WIDTH * 3 + BUTTON_GAP * 2;
        let left = row.x + row.width.saturating_sub(total) / 2;
        let button = |i: u16| {
            let x = left + i * (BUTTON_WIDTH + BUTTON_GAP);
            let w = BUTTON_WIDTH.min(row.right().saturating_sub(x));
            Rect::new(x.min(row.right()), row.y, w, row.height)
        };

        Self {
            panel,
            title: rows[1],
            time: rows[3],
            buttons: [
                (Button::StartStop, button(0)),
                (Button::Reset, button(1)),
                (Button::Lap, button(2)),
            ],
            laps: rows[7],
            footer: rows[8],
        }
    }

    pub fn hit(&self, column: u16, row: u16) -> Option<Button> {
        let pos = Position::new(column, row);
        self.buttons
            .iter()
            .find(|(_, rect)| rect.contains(pos))
            .map(|(button, _)| *button)
    }
}

pub fn draw_stopwatch(
    frame: &mut Frame,
    backdrop: &mut Backdrop,
    style: &PanelStyle,
    view: &StopwatchView,
) -> PanelLayout {
    let area = frame.area();
    backdrop.fit(area);
    frame.render_widget(&*backdrop, area);

    let layout = PanelLayout::new(area, style);
    frost(frame.buffer_mut(), layout.panel, style.color, style.opacity);

    let text = Style::default().fg(style.text);

    frame.render_widget(
        Paragraph::new("STOPWATCH")
            .style(text.add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center),
        layout.title,
    );

    frame.render_widget(
        Paragraph::new(view.time)
            .style(text.add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center),
        layout.time,
    );

    for (button, rect) in layout.buttons {
        let (label, color) = match button {
            Button::StartStop if view.running => ("Stop", style.stop),
            Button::StartStop => ("Start", style.start),
            Button::Reset => ("Reset", style.reset),
            Button::Lap => ("Lap", style.lap),
        };
        frame.render_widget(
            Paragraph::new(label)
                .style(Style::default().fg(style.button_text).bg(color))
                .alignment(Alignment::Center),
            rect,
        );
    }

    // Oldest at the top, newest at the bottom
    let lines: Vec<Line> = view
        .laps
        .visible(layout.laps.height as usize)
        .iter()
        .map(|entry| Line::from(entry.as_str()))
        .collect();
    frame.render_widget(Paragraph::new(lines).style(text), layout.laps);

    frame.render_widget(
        Paragraph::new("enter=start/stop l=lap r=reset q=quit")
            .style(text.add_modifier(Modifier::DIM))
            .alignment(Alignment::Center),
        layout.footer,
    );

    layout
}
