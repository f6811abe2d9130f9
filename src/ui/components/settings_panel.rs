use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::settings::SettingsState;
use crate::settings::bindings::{Section, SettingsField, SettingsForm};
use crate::ui::theme::Theme;

pub struct SettingsPanel<'a> {
    pub state: &'a SettingsState,
    pub form: &'a SettingsForm,
    pub theme: &'a Theme,
}

impl<'a> SettingsPanel<'a> {
    pub fn new(state: &'a SettingsState, form: &'a SettingsForm, theme: &'a Theme) -> Self {
        Self { state, form, theme }
    }

    fn field_line(&self, field: SettingsField) -> Line<'static> {
        let colors = &self.theme.colors;
        let is_selected = self.form.selected_field() == field;
        let enabled = field.is_enabled(self.state);
        let indicator = if is_selected { " > " } else { "   " };

        let label_style = Style::default()
            .fg(if is_selected { colors.accent() } else { colors.fg() })
            .add_modifier(if is_selected { Modifier::BOLD } else { Modifier::empty() });

        let mut spans = vec![Span::styled(
            format!("{indicator}{:<14}", field.label()),
            label_style,
        )];

        let editing = self
            .form
            .entry
            .as_ref()
            .filter(|entry| entry.field == Some(field));

        if let Some(entry) = editing {
            let style = if entry.invalid {
                Style::default().fg(colors.error())
            } else {
                Style::default().fg(colors.focused_key())
            };
            spans.push(Span::styled(format!("  {}_", entry.buffer), style));
            if entry.invalid {
                spans.push(Span::styled("  expected #rrggbb", Style::default().fg(colors.error())));
            }
            return Line::from(spans);
        }

        let value_style = Style::default().fg(if !enabled {
            colors.text_pending()
        } else if is_selected {
            colors.focused_key()
        } else {
            colors.fg()
        });
        let value = field.value_text(self.state);
        let value = if enabled {
            format!("  < {value} >")
        } else {
            format!("    {value}  (disabled)")
        };
        spans.push(Span::styled(value, value_style));

        if let Some(color) = field.color(self.state) {
            spans.push(Span::raw(" "));
            spans.push(Span::styled("  ", Style::default().bg(color.to_color())));
        }
        Line::from(spans)
    }
}

impl Widget for SettingsPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(" Settings ")
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let mut constraints: Vec<Constraint> = Section::ALL
            .iter()
            .map(|section| {
                let rows = SettingsField::ALL
                    .iter()
                    .filter(|f| f.section() == *section)
                    .count() as u16;
                Constraint::Length(rows + 2)
            })
            .collect();
        constraints.push(Constraint::Min(0));
        constraints.push(Constraint::Length(1));

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(inner);

        for (i, section) in Section::ALL.iter().enumerate() {
            let section_block = Block::bordered()
                .title(format!(" {} ", section.title()))
                .border_style(Style::default().fg(colors.border()));
            let section_inner = section_block.inner(layout[i]);
            section_block.render(layout[i], buf);

            let lines: Vec<Line> = SettingsField::ALL
                .iter()
                .filter(|f| f.section() == *section)
                .map(|f| self.field_line(*f))
                .collect();
            Paragraph::new(lines).render(section_inner, buf);
        }

        let help = if self.form.is_editing() {
            "  [Enter] Apply  [Esc] Cancel  [Bksp] Delete"
        } else {
            "  [↑↓] Select  [←→] Change  [e] Edit color  [q] Quit"
        };
        let footer = Paragraph::new(Line::from(Span::styled(
            help,
            Style::default().fg(colors.text_pending()),
        )));
        footer.render(layout[Section::ALL.len() + 1], buf);
    }
}
