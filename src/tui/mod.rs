//! TUI module - Terminal plan viewer with ratatui

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, List, ListItem, ListState, Paragraph, Row, Table},
};
use std::io::{stdout, Stdout};

use crate::db::{Database, Plan, PlanDetail};

type Tui = Terminal<CrosstermBackend<Stdout>>;

/// App state for TUI
pub struct App {
    db: Database,
    user_id: i64,
    plans: Vec<Plan>,
    selected: ListState,
    detail: Option<PlanDetail>,
    status: String,
    should_quit: bool,
}

impl App {
    pub fn new(db: Database, user_id: i64) -> Result<Self> {
        let mut app = Self {
            db,
            user_id,
            plans: Vec::new(),
            selected: ListState::default(),
            detail: None,
            status: String::new(),
            should_quit: false,
        };
        app.refresh()?;
        Ok(app)
    }

    /// Run the TUI application
    pub fn run(&mut self) -> Result<()> {
        let mut terminal = init_terminal()?;

        while !self.should_quit {
            terminal.draw(|frame| self.render(frame))?;
            self.handle_events()?;
        }

        restore_terminal()?;
        Ok(())
    }

    /// Reload plans, keeping the selection when possible
    fn refresh(&mut self) -> Result<()> {
        self.plans = self.db.list_plans(self.user_id)?;
        let index = match self.selected.selected() {
            _ if self.plans.is_empty() => None,
            Some(i) => Some(i.min(self.plans.len() - 1)),
            None => Some(0),
        };
        self.selected.select(index);
        self.load_detail()
    }

    fn load_detail(&mut self) -> Result<()> {
        self.detail = match self.selected_plan() {
            Some(plan) => Some(self.db.plan_detail(self.user_id, plan.id)?),
            None => None,
        };
        Ok(())
    }

    fn selected_plan(&self) -> Option<&Plan> {
        self.selected.selected().and_then(|i| self.plans.get(i))
    }

    fn select_next(&mut self) -> Result<()> {
        if self.plans.is_empty() {
            return Ok(());
        }
        let next = self.selected.selected().map_or(0, |i| (i + 1) % self.plans.len());
        self.selected.select(Some(next));
        self.load_detail()
    }

    fn select_previous(&mut self) -> Result<()> {
        if self.plans.is_empty() {
            return Ok(());
        }
        let len = self.plans.len();
        let previous = self.selected.selected().map_or(0, |i| (i + len - 1) % len);
        self.selected.select(Some(previous));
        self.load_detail()
    }

    fn activate_selected(&mut self) -> Result<()> {
        let Some(plan_id) = self.selected_plan().map(|p| p.id) else {
            return Ok(());
        };
        let plan = self.db.set_active_plan(self.user_id, plan_id)?;
        self.status = format!("Activated \"{}\"", plan.name);
        self.refresh()
    }

    fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(10),
                Constraint::Length(3),
            ])
            .split(area);

        // Header
        let header = Paragraph::new("fittrack - Training Plans")
            .style(Style::default().fg(Color::Cyan).bold())
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(header, chunks[0]);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
            .split(chunks[1]);

        // Plan list
        let items: Vec<ListItem> = self
            .plans
            .iter()
            .map(|p| {
                let marker = if p.is_active { "* " } else { "  " };
                ListItem::new(format!("{marker}{} ({}d)", p.name, p.days_per_week))
            })
            .collect();
        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title("Plans"))
            .highlight_style(Style::default().fg(Color::Yellow).bold())
            .highlight_symbol("> ");
        frame.render_stateful_widget(list, body[0], &mut self.selected);

        // Days and exercises of the selected plan
        let rows: Vec<Row> = self
            .detail
            .iter()
            .flat_map(|d| &d.days)
            .flat_map(|day| {
                let label = format!(
                    "Day {} {}",
                    day.day.day_number,
                    day.day.description.as_deref().unwrap_or_default()
                );
                let header = Row::new(vec![Cell::from(label).style(Style::default().fg(Color::Cyan)), Cell::from(""), Cell::from("")]);
                let exercises = day.exercises.iter().map(|e| {
                    let prescription = match (&e.base_duration, e.base_sets, e.base_reps) {
                        (Some(duration), _, _) => duration.clone(),
                        (None, Some(sets), Some(reps)) => format!("{sets}x{reps}"),
                        _ => String::new(),
                    };
                    Row::new(vec![
                        Cell::from(format!("  {}", e.name)),
                        Cell::from(e.primary_muscle.clone()),
                        Cell::from(prescription),
                    ])
                });
                std::iter::once(header).chain(exercises)
            })
            .collect();

        let title = self
            .detail
            .as_ref()
            .map(|d| d.plan.description.clone().unwrap_or_else(|| d.plan.name.clone()))
            .unwrap_or_else(|| "No plan selected".to_string());
        let table = Table::new(
            rows,
            [
                Constraint::Min(28),
                Constraint::Length(12),
                Constraint::Length(12),
            ],
        )
        .header(Row::new(vec!["Exercise", "Muscle", "Base"]).style(Style::default().bold()))
        .block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(table, body[1]);

        // Footer
        let help = "q: quit | j/k: select | a: activate | r: refresh";
        let footer_text = if self.status.is_empty() {
            help.to_string()
        } else {
            format!("{help} | {}", self.status)
        };
        let footer = Paragraph::new(footer_text)
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(footer, chunks[2]);
    }

    fn handle_events(&mut self) -> Result<()> {
        if event::poll(std::time::Duration::from_millis(100))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
                KeyCode::Char('j') | KeyCode::Down => self.select_next()?,
                KeyCode::Char('k') | KeyCode::Up => self.select_previous()?,
                KeyCode::Char('a') => self.activate_selected()?,
                KeyCode::Char('r') => self.refresh()?,
                _ => {}
            }
        }
        Ok(())
    }
}

fn init_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    Ok(terminal)
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::PlanDraft;

    fn app_with_plans(count: usize) -> App {
        let db = Database::open(":memory:").unwrap();
        let user = db.create_user("testuser1", "test1@example.com").unwrap();
        for i in 0..count {
            let draft = PlanDraft {
                name: format!("Plan {}", i + 1),
                days_per_week: 3,
                ..Default::default()
            };
            let plan = db.create_plan(user, &draft).unwrap();
            db.create_plan_day(user, plan.id, 1, Some("Push Day")).unwrap();
        }
        App::new(db, user).unwrap()
    }

    #[test]
    fn test_empty_app() {
        let app = app_with_plans(0);
        assert!(app.selected_plan().is_none());
        assert!(app.detail.is_none());
    }

    #[test]
    fn test_selection_wraps() {
        let mut app = app_with_plans(3);
        assert_eq!(app.selected.selected(), Some(0));
        app.select_previous().unwrap();
        assert_eq!(app.selected.selected(), Some(2));
        app.select_next().unwrap();
        assert_eq!(app.selected.selected(), Some(0));
        assert_eq!(app.detail.as_ref().unwrap().plan.name, "Plan 1");
    }

    #[test]
    fn test_activate_selected() {
        let mut app = app_with_plans(2);
        app.select_next().unwrap();
        app.activate_selected().unwrap();
        assert!(app.plans[1].is_active);
        assert!(!app.plans[0].is_active);
        assert_eq!(app.selected.selected(), Some(1));
        assert_eq!(app.detail.as_ref().unwrap().days.len(), 1);
    }

    #[test]
    fn test_render_does_not_panic() {
        let mut app = app_with_plans(1);
        let mut terminal = Terminal::new(ratatui::backend::TestBackend::new(100, 30)).unwrap();
        terminal.draw(|frame| app.render(frame)).unwrap();
    }
}
