//! Parameter list widget

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use wubfx::{Param, ParameterVector};

pub fn render_params(frame: &mut Frame, area: Rect, parameters: &ParameterVector, selected: usize) {
    let block = Block::default().title(" Controls ").borders(Borders::ALL);

    let lines: Vec<Line> = Param::ALL
        .iter()
        .enumerate()
        .map(|(i, &param)| {
            let spec = param.spec();
            let value = parameters.get(param);
            let style = if i == selected {
                Style::default().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            Line::from(vec![
                Span::styled(format!(" {:<14}", spec.name), style),
                Span::styled(
                    format!("{:>9} {:<2}", format_value(value, spec.step), spec.unit),
                    Style::default().fg(Color::Magenta),
                ),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Show as many decimals as the nudge step needs
fn format_value(value: f32, step: f32) -> String {
    let decimals = if step >= 1.0 {
        0
    } else if step >= 0.1 {
        1
    } else {
        2
    };
    format!("{:.*}", decimals, value)
}
