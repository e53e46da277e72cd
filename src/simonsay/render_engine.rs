use std::io::{self, stdout, Stdout};

use crossterm::{
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{prelude::*, widgets::*};

use super::{game_model::Pad, presenter::GameView};

type Tui = Terminal<CrosstermBackend<Stdout>>;

#[derive(Debug)]
pub struct RenderEngine {
    terminal: Tui,
}

impl RenderEngine {
    pub fn init_render_engine() -> Result<RenderEngine, io::Error> {
        enable_raw_mode()?;
        stdout().execute(EnterAlternateScreen)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout()));
        match terminal {
            Ok(terminal) => Ok(RenderEngine { terminal }),
            Err(e) => Err(e),
        }
    }

    pub fn deinit_render_engine(self) -> io::Result<()> {
        disable_raw_mode()?;
        stdout().execute(LeaveAlternateScreen)?;
        Ok(())
    }

    pub fn render<F>(&mut self, render_fn: F) -> io::Result<CompletedFrame>
    where
        F: FnOnce(&mut Frame),
    {
        self.terminal.draw(|frame| render_fn(frame))
    }
}

impl WidgetRef for GameView {
    fn render_ref(&self, area: Rect, buf: &mut Buffer) {
        let theme = self.theme();
        let block = Block::default()
            .border_style(Style::default().fg(theme.border()))
            .borders(Borders::ALL)
            .style(Style::default().bg(theme.background()))
            .title(Span::styled(
                self.score_line(),
                Style::default()
                    .add_modifier(Modifier::BOLD)
                    .fg(theme.text()),
            ))
            .title_alignment(Alignment::Center);
        let inner = block.inner(area);
        block.render(area, buf);

        let [pads_area, status_area, help_area] = Layout::vertical([
            Constraint::Min(8),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(inner);

        let [top, bottom] =
            Layout::vertical([Constraint::Percentage(50), Constraint::Percentage(50)])
                .areas(pads_area);
        let [top_left, top_right] =
            Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(top);
        let [bottom_left, bottom_right] =
            Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
                .areas(bottom);

        let cells = [
            (Pad::Green, top_left),
            (Pad::Red, top_right),
            (Pad::Yellow, bottom_left),
            (Pad::Blue, bottom_right),
        ];
        for (pad, cell) in cells {
            let lit = self.lit_pad() == Some(pad);
            let mut style = Style::default()
                .bg(theme.pad_color(pad, lit))
                .fg(Color::Black);
            if lit {
                style = style.add_modifier(Modifier::BOLD);
            }
            let label = format!("{} [{}]", pad.name(), pad.key_hint());
            Paragraph::new(label)
                .centered()
                .block(Block::default().borders(Borders::ALL))
                .style(style)
                .render(cell, buf);
        }

        Paragraph::new(self.status_text().to_string())
            .style(Style::default().fg(theme.text()))
            .centered()
            .render(status_area, buf);

        let control = |label: &str, enabled: bool| {
            let style = if enabled {
                Style::default().fg(theme.text())
            } else {
                Style::default().fg(theme.text()).add_modifier(Modifier::DIM)
            };
            Span::styled(label.to_string(), style)
        };
        let strict_label = if self.strict() { "strict on" } else { "strict off" };
        let help = Line::from(vec![
            control("Enter start", self.start_enabled()),
            Span::raw(" | "),
            control("s stop", self.stop_enabled()),
            Span::raw(format!(" | m {strict_label} | t theme | c clear | q quit")),
        ]);
        Paragraph::new(help)
            .style(Style::default().fg(theme.text()))
            .centered()
            .render(help_area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simonsay::presenter::Presenter;
    use crate::simonsay::theme::Theme;
    use std::time::{Duration, Instant};

    fn buffer_text(buf: &Buffer) -> String {
        let mut text = String::new();
        for y in buf.area.top()..buf.area.bottom() {
            for x in buf.area.left()..buf.area.right() {
                text.push_str(buf.get(x, y).symbol());
            }
            text.push('\n');
        }
        text
    }

    #[test]
    fn frame_shows_score_status_and_pads() {
        let mut view = GameView::new(4, false, Theme::Default);
        view.score(2, 4);
        view.status("Your turn! Repeat the sequence.");

        let area = Rect::new(0, 0, 60, 20);
        let mut buf = Buffer::empty(area);
        view.render_ref(area, &mut buf);

        let text = buffer_text(&buf);
        assert!(text.contains("Score: 2 (High: 4)"));
        assert!(text.contains("Your turn! Repeat the sequence."));
        assert!(text.contains("Green [1/h]"));
        assert!(text.contains("Blue [4/l]"));
    }

    #[test]
    fn lit_pad_is_drawn_brighter() {
        let mut view = GameView::new(0, false, Theme::Default);
        let now = Instant::now();
        view.highlight(Pad::Green, Duration::from_millis(300), now);

        let area = Rect::new(0, 0, 60, 20);
        let mut buf = Buffer::empty(area);
        view.render_ref(area, &mut buf);

        // inside the top-left (green) pad
        assert_eq!(buf.get(3, 2).style().bg, Some(Color::LightGreen));
        // the red pad stays unlit
        assert_eq!(buf.get(area.width - 4, 2).style().bg, Some(Color::Red));
    }
}
