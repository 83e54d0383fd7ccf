//! Per-step screen bodies
//!
//! Menus are rendered as plain lines with a `>` marker on the highlighted row;
//! text steps show a prompt, the buffer and any completion candidates.

use crate::theme::Theme;
use crate::types::InstallSource;
use crate::validate::InstallerInput;
use crate::wizard::{DirectoryStep, PackagePlan, Step, TextInput, Wizard};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

/// Candidates shown under a text input before eliding the rest
const MAX_CANDIDATES: usize = 8;

/// Render the body of the current step
pub fn render_step(f: &mut Frame, area: Rect, theme: &Theme, wizard: &Wizard) {
    let options = wizard.menu_options();
    match wizard.step() {
        Step::SelectOperation { cursor } => {
            let chunks = split_vertical(area, options.len() as u16 + 1);
            render_menu(f, chunks[0], theme, &options, *cursor);
            render_operation_context(f, chunks[1], theme, wizard);
        }
        Step::Review { plan, cursor } => {
            let details = review_lines(theme, plan);
            let chunks = split_vertical(area, details.len() as u16 + 3);
            let widget = Paragraph::new(details).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(theme.border())
                    .title("Package"),
            );
            f.render_widget(widget, chunks[0]);
            render_menu(f, chunks[1], theme, &options, *cursor);
        }
        Step::EnterName { input, .. } => {
            render_text_input(f, area, theme, "Package name: ", "application name", input, &[]);
        }
        Step::EnterInstaller {
            source,
            kind,
            name,
            input,
        } => {
            let (prompt, placeholder) = match source {
                InstallSource::LocalFile => ("Installer path: ", "C:\\path\\to\\installer"),
                InstallSource::DownloadUrl => ("Download URL: ", "https://"),
            };
            let context = [
                Line::from(vec![
                    Span::styled("Package: ", theme.label()),
                    Span::styled(name.clone(), theme.text()),
                ]),
                Line::from(vec![
                    Span::styled("Installer Type: ", theme.label()),
                    Span::styled(kind.to_string(), theme.text()),
                ]),
                Line::default(),
            ];
            render_text_input(f, area, theme, prompt, placeholder, input, &context);
        }
        Step::SetDirectory(DirectoryStep::Typing { input }) => {
            render_text_input(f, area, theme, "Packages directory: ", "", input, &[]);
        }
        step => {
            render_menu(f, area, theme, &options, step.cursor().unwrap_or(0));
        }
    }
}

fn split_vertical(area: Rect, first: u16) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(first), Constraint::Min(0)])
        .split(area)
}

/// Render a list of options with the cursor row highlighted
pub fn render_menu(f: &mut Frame, area: Rect, theme: &Theme, options: &[String], cursor: usize) {
    let lines: Vec<Line> = options
        .iter()
        .enumerate()
        .map(|(index, label)| {
            if index == cursor {
                Line::from(Span::styled(format!("> {label}"), theme.selected()))
            } else {
                Line::from(Span::styled(format!("  {label}"), theme.unselected()))
            }
        })
        .collect();
    f.render_widget(Paragraph::new(lines), area);
}

fn render_operation_context(f: &mut Frame, area: Rect, theme: &Theme, wizard: &Wizard) {
    let mut lines = vec![Line::from(vec![
        Span::styled("Packages Directory: ", theme.muted()),
        Span::styled(wizard.packages_dir().display().to_string(), theme.text()),
    ])];

    if !wizard.recent_packages().is_empty() {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled("Recent Packages:", theme.muted())));
        for name in wizard.recent_packages() {
            lines.push(Line::from(Span::styled(format!("  • {name}"), theme.text())));
        }
    }

    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), area);
}

fn render_text_input(
    f: &mut Frame,
    area: Rect,
    theme: &Theme,
    prompt: &str,
    placeholder: &str,
    input: &TextInput,
    context: &[Line],
) {
    let mut lines: Vec<Line> = context.to_vec();

    let value = if input.value.is_empty() {
        Span::styled(placeholder.to_string(), theme.muted())
    } else {
        Span::styled(input.value.clone(), theme.text())
    };
    lines.push(Line::from(vec![
        Span::styled(prompt.to_string(), theme.prompt()),
        value,
        Span::styled("█", theme.prompt()),
    ]));

    if !input.candidates.is_empty() {
        lines.push(Line::default());
        for candidate in input.candidates.iter().take(MAX_CANDIDATES) {
            lines.push(Line::from(Span::styled(format!("  {candidate}"), theme.muted())));
        }
        let hidden = input.candidates.len().saturating_sub(MAX_CANDIDATES);
        if hidden > 0 {
            lines.push(Line::from(Span::styled(
                format!("  … and {hidden} more"),
                theme.muted(),
            )));
        }
    }

    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), area);
}

/// Detail rows of the review screen
pub fn review_lines(theme: &Theme, plan: &PackagePlan) -> Vec<Line<'static>> {
    let row = |label: &str, value: String| {
        Line::from(vec![
            Span::styled(format!("{label}: "), theme.label()),
            Span::styled(value, theme.text()),
        ])
    };

    match plan {
        PackagePlan::New {
            name,
            kind,
            input,
            output_dir,
        } => {
            let (source, location) = match input {
                InstallerInput::Local(_) => (InstallSource::LocalFile, "Path"),
                InstallerInput::Remote(_) => (InstallSource::DownloadUrl, "URL"),
            };
            vec![
                row("Package Name", name.clone()),
                row("Installer Type", kind.to_string()),
                row("Source", source.to_string()),
                row(location, input.display()),
                row("Package Directory", output_dir.display().to_string()),
            ]
        }
        PackagePlan::Repackage { name, output_dir } => vec![
            row("Package Name", name.clone()),
            row("Package Directory", output_dir.display().to_string()),
        ],
    }
}
