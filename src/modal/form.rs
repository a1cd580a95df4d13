//! Inquiry form modal.
//!
//! Submission runs through three states:
//!
//! ```text
//! Idle --submit--> Submitting --ok--> Success --delay--> closed (Idle)
//!                      |
//!                      +--error--> Idle (values kept)
//! ```
//!
//! While not idle the form is inert: keys are swallowed, the backdrop does
//! not dismiss and nothing can be edited or submitted again.

mod caret;
pub mod field;
pub mod values;

use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Margin, Position, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio_util::sync::CancellationToken;

use crate::Theme;
use crate::commands::{Command, SubmitFormCmd};
use crate::config::{DEFAULT_SUCCESS_DELAY, FormAction, KeyResolver};
use crate::modal::{Hit, ModalController, ModalHandle, render_backdrop};
use crate::submit::SubmitHandler;
use crate::ui::{Component, EventResult, Keybinding, Modal, Result, Spinner};

use caret::{Caret, Edit};
pub use field::{FieldSpec, FormDefinition, InputKind, Violation};
pub use values::FormValues;

const MAX_PANEL_WIDTH: u16 = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionStatus {
    #[default]
    Idle,
    Submitting,
    Success,
}

/// Messages delivered to the form from work it started.
pub enum FormMsg {
    SubmitFinished { session: u64, result: Result<()> },
    AutoCloseElapsed { session: u64 },
}

pub enum FormOutput {
    /// Side effect the App should spawn.
    Run(Box<dyn Command>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Field(usize),
    Cancel,
    Submit,
}

pub struct FormModal {
    controller: ModalController<()>,
    definition: FormDefinition,
    values: FormValues,
    status: SubmissionStatus,
    focus: Focus,
    carets: Vec<Caret>,
    invalid: Option<(usize, Violation)>,
    handler: Arc<dyn SubmitHandler>,
    success_delay: Duration,
    auto_close: Option<CancellationToken>,
    spinner: Spinner,
    resolver: Arc<KeyResolver>,
    msg_tx: UnboundedSender<FormMsg>,
    msg_rx: UnboundedReceiver<FormMsg>,
    layout: Option<FormLayout>,
}

impl FormModal {
    pub fn new(
        definition: FormDefinition,
        handler: Arc<dyn SubmitHandler>,
        resolver: Arc<KeyResolver>,
    ) -> Result<Self> {
        definition.validate()?;
        let (msg_tx, msg_rx) = mpsc::unbounded_channel();
        Ok(Self {
            controller: ModalController::new(),
            values: FormValues::new(&definition.fields),
            status: SubmissionStatus::Idle,
            focus: first_focus(&definition),
            carets: vec![Caret::default(); definition.fields.len()],
            invalid: None,
            handler,
            success_delay: DEFAULT_SUCCESS_DELAY,
            auto_close: None,
            spinner: Spinner::new("Sending..."),
            resolver,
            msg_tx,
            msg_rx,
            layout: None,
            definition,
        })
    }

    #[must_use]
    pub fn with_success_delay(mut self, delay: Duration) -> Self {
        self.success_delay = delay;
        self
    }

    #[must_use]
    pub fn with_on_close(mut self, notifier: impl FnMut() + Send + 'static) -> Self {
        self.controller = std::mem::take(&mut self.controller).with_on_close(notifier);
        self
    }

    pub const fn status(&self) -> SubmissionStatus {
        self.status
    }

    #[cfg(test)]
    pub const fn values(&self) -> &FormValues {
        &self.values
    }

    pub const fn definition(&self) -> &FormDefinition {
        &self.definition
    }

    /// User-initiated dismissal. Only honoured while idle.
    pub fn cancel(&mut self) -> bool {
        if self.is_open() && self.status == SubmissionStatus::Idle {
            self.close();
            true
        } else {
            false
        }
    }

    #[cfg(test)]
    /// Replace one field's value, as typing into it would.
    ///
    /// Returns `Ok(false)` when the form is closed or busy.
    pub fn edit_field(&mut self, name: &str, value: impl Into<String>) -> Result<bool> {
        if !self.accepts_input() {
            return Ok(false);
        }
        let Some(index) = self.definition.position(name) else {
            color_eyre::eyre::bail!("Unknown form field '{name}'");
        };
        let value = value.into();
        self.carets[index] = Caret::end_of(&value);
        self.store(index, value)?;
        Ok(true)
    }

    /// Start a submission if the form is idle and every field passes its check.
    ///
    /// On success the returned command must be spawned; its outcome arrives
    /// through [`FormModal::update`].
    pub fn submit(&mut self) -> Option<Box<dyn Command>> {
        if !self.accepts_input() {
            return None;
        }

        for (index, field) in self.definition.fields.iter().enumerate() {
            if let Err(violation) = field.check(self.values.value(&field.name)) {
                tracing::debug!(field = %field.name, ?violation, "Submission blocked");
                self.invalid = Some((index, violation));
                self.focus = Focus::Field(index);
                return None;
            }
        }

        self.invalid = None;
        self.status = SubmissionStatus::Submitting;
        tracing::debug!(form = %self.definition.title, "Submitting");
        Some(Box::new(SubmitFormCmd::new(
            self.handler.clone(),
            self.values.clone(),
            self.controller.session(),
            self.msg_tx.clone(),
        )))
    }

    /// Apply results of finished work. Call after every event.
    pub fn update(&mut self) {
        while let Ok(msg) = self.msg_rx.try_recv() {
            match msg {
                FormMsg::SubmitFinished { session, result } => {
                    self.finish_submission(session, result);
                }
                FormMsg::AutoCloseElapsed { session } => {
                    if session == self.controller.session()
                        && self.status == SubmissionStatus::Success
                    {
                        self.close();
                    }
                }
            }
        }
    }

    fn finish_submission(&mut self, session: u64, result: Result<()>) {
        if session != self.controller.session() || self.status != SubmissionStatus::Submitting {
            tracing::debug!(session, "Dropping result of an abandoned submission");
            return;
        }

        match result {
            Ok(()) => {
                self.status = SubmissionStatus::Success;
                self.values.clear();
                self.carets.fill(Caret::default());
                self.schedule_auto_close();
            }
            Err(error) => {
                self.status = SubmissionStatus::Idle;
                tracing::error!(
                    form = %self.definition.title,
                    error = %format!("{error:#}"),
                    "Submission failed"
                );
            }
        }
    }

    fn schedule_auto_close(&mut self) {
        self.cancel_auto_close();

        let token = CancellationToken::new();
        let cancelled = token.clone();
        let tx = self.msg_tx.clone();
        let delay = self.success_delay;
        let session = self.controller.session();
        tokio::spawn(async move {
            tokio::select! {
                () = cancelled.cancelled() => {}
                () = tokio::time::sleep(delay) => {
                    let _ = tx.send(FormMsg::AutoCloseElapsed { session });
                }
            }
        });
        self.auto_close = Some(token);
    }

    fn cancel_auto_close(&mut self) {
        if let Some(token) = self.auto_close.take() {
            token.cancel();
        }
    }

    fn reset(&mut self) {
        self.cancel_auto_close();
        self.values.clear();
        self.status = SubmissionStatus::Idle;
        self.focus = first_focus(&self.definition);
        self.carets.fill(Caret::default());
        self.invalid = None;
        self.layout = None;
    }

    fn accepts_input(&self) -> bool {
        self.is_open() && self.status == SubmissionStatus::Idle
    }

    fn store(&mut self, index: usize, value: String) -> Result<()> {
        self.values.set(&self.definition.fields[index].name, value)?;
        if matches!(self.invalid, Some((i, _)) if i == index) {
            self.invalid = None;
        }
        Ok(())
    }

    fn focus_order(&self) -> Vec<Focus> {
        (0..self.definition.fields.len())
            .map(Focus::Field)
            .chain([Focus::Cancel, Focus::Submit])
            .collect()
    }

    fn move_focus(&mut self, forward: bool) {
        let order = self.focus_order();
        let current = order.iter().position(|f| *f == self.focus).unwrap_or(0);
        let next = if forward {
            (current + 1) % order.len()
        } else {
            (current + order.len() - 1) % order.len()
        };
        self.focus = order[next];
    }

    /// Run the focused field's editor against `edit`, storing the result if it changed.
    fn edit_focused(&mut self, edit: impl FnOnce(&mut Caret, &mut String) -> Edit) -> Result<()> {
        let Focus::Field(index) = self.focus else {
            return Ok(());
        };
        let mut text = self
            .values
            .value(&self.definition.fields[index].name)
            .to_string();
        if edit(&mut self.carets[index], &mut text) == Edit::Changed {
            self.store(index, text)?;
        }
        Ok(())
    }

    fn activate(&mut self, target: Focus) -> EventResult<FormOutput> {
        self.focus = target;
        match target {
            Focus::Field(_) => EventResult::Consumed,
            Focus::Cancel => {
                self.cancel();
                EventResult::Consumed
            }
            Focus::Submit => self.submit_result(),
        }
    }

    fn submit_result(&mut self) -> EventResult<FormOutput> {
        self.submit()
            .map_or(EventResult::Consumed, |cmd| FormOutput::Run(cmd).into())
    }
}

fn first_focus(definition: &FormDefinition) -> Focus {
    if definition.fields.is_empty() {
        Focus::Submit
    } else {
        Focus::Field(0)
    }
}

impl ModalHandle for FormModal {
    type Payload = ();

    fn open(&mut self, (): ()) {
        self.reset();
        self.controller.show(None);
        tracing::debug!(form = %self.definition.title, "Form opened");
    }

    fn close(&mut self) {
        self.reset();
        self.controller.hide();
        tracing::debug!(form = %self.definition.title, "Form closed");
    }

    fn is_open(&self) -> bool {
        self.controller.is_open()
    }
}

impl Drop for FormModal {
    fn drop(&mut self) {
        self.cancel_auto_close();
    }
}

impl Modal for FormModal {
    type Output = FormOutput;

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<Self::Output>> {
        if !self.is_open() {
            return Ok(EventResult::Ignored);
        }
        if self.status != SubmissionStatus::Idle {
            return Ok(EventResult::Consumed);
        }

        if self.resolver.matches_form(&key, FormAction::Cancel) {
            self.cancel();
            return Ok(EventResult::Consumed);
        }
        if self.resolver.matches_form(&key, FormAction::Submit) {
            return Ok(self.submit_result());
        }
        if self.resolver.matches_form(&key, FormAction::NextField) {
            self.move_focus(true);
            return Ok(EventResult::Consumed);
        }
        if self.resolver.matches_form(&key, FormAction::PreviousField) {
            self.move_focus(false);
            return Ok(EventResult::Consumed);
        }

        if key.code == KeyCode::Enter && key.modifiers == KeyModifiers::NONE {
            return Ok(match self.focus {
                Focus::Field(index) if self.definition.fields[index].kind.is_multiline() => {
                    self.edit_focused(|caret, text| {
                        caret.insert_str(text, "\n");
                        Edit::Changed
                    })?;
                    EventResult::Consumed
                }
                Focus::Field(_) | Focus::Submit => self.submit_result(),
                Focus::Cancel => self.activate(Focus::Cancel),
            });
        }

        self.edit_focused(|caret, text| caret.handle_key(text, &key))?;
        Ok(EventResult::Consumed)
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) -> Result<EventResult<Self::Output>> {
        if !self.is_open() {
            return Ok(EventResult::Ignored);
        }

        match self.controller.hit(&mouse) {
            Hit::Backdrop => {
                self.cancel();
            }
            Hit::Content if self.status == SubmissionStatus::Idle => {
                let target = self
                    .layout
                    .as_ref()
                    .and_then(|layout| layout.target_at(Position::new(mouse.column, mouse.row)));
                if let Some(target) = target {
                    return Ok(self.activate(target));
                }
            }
            Hit::Content | Hit::Miss => {}
        }
        Ok(EventResult::Consumed)
    }

    fn handle_paste(&mut self, text: &str) -> Result<EventResult<Self::Output>> {
        if !self.is_open() {
            return Ok(EventResult::Ignored);
        }
        if !self.accepts_input() {
            return Ok(EventResult::Consumed);
        }

        let multiline = matches!(self.focus, Focus::Field(i) if self.definition.fields[i].kind.is_multiline());
        let pasted: String = if multiline {
            text.replace("\r\n", "\n")
        } else {
            text.chars()
                .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
                .collect()
        };
        self.edit_focused(|caret, value| {
            caret.insert_str(value, &pasted);
            Edit::Changed
        })?;
        Ok(EventResult::Consumed)
    }

    fn handle_tick(&mut self) {
        if self.status == SubmissionStatus::Submitting {
            self.spinner.handle_tick();
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        if !self.is_open() {
            return;
        }

        render_backdrop(frame, area);
        let layout = FormLayout::compute(area, &self.definition);
        self.controller.set_panel(layout.panel);
        frame.render_widget(Clear, layout.panel);

        let block = Block::default()
            .title(format!(" {} ", self.definition.title))
            .title_style(Style::default().fg(theme.mauve()).add_modifier(Modifier::BOLD))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme.mauve()))
            .style(Style::default().bg(theme.base()).fg(theme.text()));
        frame.render_widget(block, layout.panel);

        if let (Some(subtitle), Some(rect)) = (&self.definition.subtitle, layout.subtitle) {
            frame.render_widget(
                Paragraph::new(subtitle.as_str())
                    .style(Style::default().fg(theme.subtext0()))
                    .wrap(Wrap { trim: true }),
                rect,
            );
        }

        let idle = self.status == SubmissionStatus::Idle;
        for (index, field) in self.definition.fields.iter().enumerate() {
            let invalid = self.invalid.filter(|(i, _)| *i == index).map(|(_, v)| v);
            frame.render_widget(
                Paragraph::new(label_line(field, invalid, theme)),
                layout.labels[index],
            );

            let focused = idle && self.focus == Focus::Field(index);
            let cursor = render_input(
                frame,
                layout.inputs[index],
                field,
                self.values.value(&field.name),
                self.carets[index],
                InputStyle {
                    focused,
                    invalid: invalid.is_some(),
                    enabled: idle,
                },
                theme,
            );
            if let Some(position) = cursor {
                frame.set_cursor_position(position);
            }
        }

        let cancel_style = if idle {
            Style::default().fg(theme.text())
        } else {
            Style::default().fg(theme.overlay0())
        };
        render_button(
            frame,
            layout.cancel,
            Line::from("Cancel"),
            cancel_style,
            idle && self.focus == Focus::Cancel,
            theme,
        );

        match self.status {
            SubmissionStatus::Idle => render_button(
                frame,
                layout.submit,
                Line::from(self.definition.button_text.as_str()),
                Style::default()
                    .fg(theme.base())
                    .bg(theme.mauve())
                    .add_modifier(Modifier::BOLD),
                self.focus == Focus::Submit,
                theme,
            ),
            SubmissionStatus::Submitting => {
                render_button(frame, layout.submit, Line::default(), Style::default(), false, theme);
                self.spinner
                    .render(frame, layout.submit.inner(Margin::new(1, 1)), theme);
            }
            SubmissionStatus::Success => render_button(
                frame,
                layout.submit,
                Line::from("✓ Sent"),
                Style::default().fg(theme.green()).add_modifier(Modifier::BOLD),
                false,
                theme,
            ),
        }

        self.layout = Some(layout);
    }

    fn keybindings(&self) -> Vec<Keybinding> {
        match self.status {
            SubmissionStatus::Idle => vec![
                Keybinding::new(self.resolver.display_form(FormAction::Submit), "Send"),
                Keybinding::new(self.resolver.display_form(FormAction::NextField), "Next field"),
                Keybinding::new(self.resolver.display_form(FormAction::Cancel), "Cancel"),
            ],
            SubmissionStatus::Submitting => vec![Keybinding::new("…", "Sending")],
            SubmissionStatus::Success => vec![Keybinding::new("✓", "Sent")],
        }
    }
}

fn label_line<'a>(field: &'a FieldSpec, invalid: Option<Violation>, theme: &Theme) -> Line<'a> {
    let mut spans = vec![Span::styled(
        field.label.as_str(),
        Style::default().fg(theme.text()).add_modifier(Modifier::BOLD),
    )];
    if field.required {
        spans.push(Span::styled(" *", Style::default().fg(theme.red())));
    }
    if let Some(violation) = invalid {
        spans.push(Span::styled(
            format!("  {}", field.hint(violation)),
            Style::default().fg(theme.red()).add_modifier(Modifier::ITALIC),
        ));
    }
    Line::from(spans)
}

#[derive(Clone, Copy)]
struct InputStyle {
    focused: bool,
    invalid: bool,
    enabled: bool,
}

/// Draw one input box. Returns where the terminal cursor belongs, if anywhere.
fn render_input(
    frame: &mut Frame,
    area: Rect,
    field: &FieldSpec,
    value: &str,
    caret: Caret,
    style: InputStyle,
    theme: &Theme,
) -> Option<Position> {
    let border = if style.invalid {
        theme.red()
    } else if style.focused {
        theme.mauve()
    } else {
        theme.surface2()
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.width == 0 || inner.height == 0 {
        return None;
    }

    if value.is_empty() {
        frame.render_widget(
            Paragraph::new(field.placeholder.as_str()).style(
                Style::default()
                    .fg(theme.overlay0())
                    .add_modifier(Modifier::ITALIC),
            ),
            inner,
        );
        return style.focused.then(|| Position::new(inner.x, inner.y));
    }

    let pos = caret.position(value);
    let before: String = value.chars().take(pos).collect();
    let row = before.matches('\n').count();
    let col = before.rsplit('\n').next().map_or(0, |line| line.chars().count());
    let row_offset = row.saturating_sub(usize::from(inner.height) - 1);
    let col_offset = col.saturating_sub(usize::from(inner.width) - 1);

    let text_style = if style.enabled {
        Style::default().fg(theme.text())
    } else {
        Style::default().fg(theme.overlay0())
    };
    frame.render_widget(
        Paragraph::new(value)
            .style(text_style)
            .scroll((cells(row_offset), cells(col_offset))),
        inner,
    );

    style.focused.then(|| {
        Position::new(
            inner.x + cells(col - col_offset),
            inner.y + cells(row - row_offset),
        )
    })
}

fn render_button(
    frame: &mut Frame,
    area: Rect,
    label: Line<'_>,
    style: Style,
    focused: bool,
    theme: &Theme,
) {
    let border = if focused {
        Style::default().fg(theme.lavender()).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.surface2())
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(border);
    frame.render_widget(
        Paragraph::new(label)
            .style(style)
            .alignment(Alignment::Center)
            .block(block),
        area,
    );
}

fn cells(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}

/// Where each part of the form was drawn. Also used for pointer hit-testing.
#[derive(Debug, Clone, PartialEq, Eq)]
struct FormLayout {
    panel: Rect,
    subtitle: Option<Rect>,
    labels: Vec<Rect>,
    inputs: Vec<Rect>,
    cancel: Rect,
    submit: Rect,
}

impl FormLayout {
    fn compute(area: Rect, definition: &FormDefinition) -> Self {
        let subtitle_rows: u16 = if definition.subtitle.is_some() { 2 } else { 0 };
        let field_rows: u16 = definition
            .fields
            .iter()
            .map(|f| 1 + f.kind.height())
            .sum();
        let height = (2 + subtitle_rows + field_rows + 1 + 3).min(area.height);
        let width = MAX_PANEL_WIDTH.min(area.width.saturating_sub(4));
        let panel = area.centered(Constraint::Length(width), Constraint::Length(height));

        let mut constraints = Vec::with_capacity(definition.fields.len() * 2 + 3);
        if definition.subtitle.is_some() {
            constraints.push(Constraint::Length(2));
        }
        for field in &definition.fields {
            constraints.push(Constraint::Length(1));
            constraints.push(Constraint::Length(field.kind.height()));
        }
        constraints.push(Constraint::Length(1));
        constraints.push(Constraint::Length(3));

        let rows = Layout::vertical(constraints).split(panel.inner(Margin::new(2, 1)));
        let mut rows = rows.iter().copied();

        let subtitle = definition.subtitle.as_ref().and_then(|_| rows.next());
        let mut labels = Vec::with_capacity(definition.fields.len());
        let mut inputs = Vec::with_capacity(definition.fields.len());
        for _ in &definition.fields {
            labels.push(rows.next().unwrap_or_default());
            inputs.push(rows.next().unwrap_or_default());
        }
        let _spacer = rows.next();
        let buttons_row = rows.next().unwrap_or_default();
        let [cancel, submit] =
            Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
                .spacing(2)
                .areas(buttons_row);

        Self {
            panel,
            subtitle,
            labels,
            inputs,
            cancel,
            submit,
        }
    }

    fn target_at(&self, position: Position) -> Option<Focus> {
        if self.cancel.contains(position) {
            return Some(Focus::Cancel);
        }
        if self.submit.contains(position) {
            return Some(Focus::Submit);
        }
        self.labels
            .iter()
            .zip(&self.inputs)
            .position(|(label, input)| label.contains(position) || input.contains(position))
            .map(Focus::Field)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use color_eyre::eyre::bail;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use tokio::time::sleep;

    use super::*;
    use crate::app::AppMessage;
    use crate::modal::tests::press;

    #[derive(Default)]
    struct ScriptedHandler {
        delay: Duration,
        fail: bool,
        calls: Mutex<Vec<FormValues>>,
    }

    impl ScriptedHandler {
        fn resolving_after(ms: u64) -> Arc<Self> {
            Arc::new(Self {
                delay: Duration::from_millis(ms),
                ..Self::default()
            })
        }

        fn rejecting_after(ms: u64) -> Arc<Self> {
            Arc::new(Self {
                delay: Duration::from_millis(ms),
                fail: true,
                ..Self::default()
            })
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl SubmitHandler for ScriptedHandler {
        async fn submit(&self, values: FormValues) -> Result<()> {
            sleep(self.delay).await;
            self.calls.lock().unwrap().push(values);
            if self.fail {
                bail!("inbox unavailable");
            }
            Ok(())
        }
    }

    fn definition() -> FormDefinition {
        FormDefinition::new(
            "Book a talk",
            vec![
                FieldSpec::new("email", "Email", InputKind::Email).required(),
                FieldSpec::new("message", "Message", InputKind::Multiline),
            ],
        )
    }

    fn form(handler: Arc<ScriptedHandler>) -> FormModal {
        FormModal::new(definition(), handler, Arc::new(KeyResolver::default()))
            .unwrap()
            .with_success_delay(Duration::from_millis(1500))
    }

    fn counted(form: FormModal) -> (FormModal, Arc<AtomicUsize>) {
        let closes = Arc::new(AtomicUsize::new(0));
        let counter = closes.clone();
        let form = form.with_on_close(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        (form, closes)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(form: &mut FormModal, text: &str) {
        for c in text.chars() {
            form.handle_key(key(KeyCode::Char(c))).unwrap();
        }
    }

    fn spawn(cmd: Box<dyn Command>) {
        let (app_tx, _app_rx) = mpsc::unbounded_channel::<AppMessage>();
        tokio::spawn(async move { cmd.execute(app_tx).await });
    }

    fn draw(form: &mut FormModal) {
        let mut terminal = Terminal::new(TestBackend::new(100, 40)).unwrap();
        let theme = Theme::default();
        terminal
            .draw(|frame| form.render(frame, frame.area(), &theme))
            .unwrap();
    }

    #[test]
    fn test_reopen_starts_empty() {
        let mut form = form(ScriptedHandler::resolving_after(0));
        form.open(());
        type_text(&mut form, "a@b.com");
        assert_eq!(form.values().get("email"), Some("a@b.com"));

        form.close();
        form.open(());
        assert!(form.values().is_empty());
        assert_eq!(form.status(), SubmissionStatus::Idle);
    }

    #[test]
    fn test_required_field_blocks_submit() {
        let handler = ScriptedHandler::resolving_after(0);
        let mut form = form(handler.clone());
        form.open(());

        assert!(form.submit().is_none());
        assert_eq!(form.status(), SubmissionStatus::Idle);
        assert_eq!(form.invalid, Some((0, Violation::Missing)));
        assert_eq!(handler.call_count(), 0);

        // Fixing the field clears the complaint.
        form.edit_field("email", "a@b.com").unwrap();
        assert_eq!(form.invalid, None);
    }

    #[test]
    fn test_malformed_email_blocks_submit() {
        let mut form = form(ScriptedHandler::resolving_after(0));
        form.open(());
        form.edit_field("email", "not-an-address").unwrap();
        assert!(form.submit().is_none());
        assert_eq!(form.invalid, Some((0, Violation::Malformed)));
    }

    #[test]
    fn test_closed_form_cannot_submit_or_edit() {
        let mut form = form(ScriptedHandler::resolving_after(0));
        assert!(!form.edit_field("email", "a@b.com").unwrap());
        assert!(form.submit().is_none());
        assert!(!form.handle_key(key(KeyCode::Char('x'))).unwrap().is_consumed());
    }

    #[test]
    fn test_unknown_field_is_an_error() {
        let mut form = form(ScriptedHandler::resolving_after(0));
        form.open(());
        assert!(form.edit_field("budget", "lots").is_err());
        assert!(form.values().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_successful_submission_closes_after_delay() {
        let handler = ScriptedHandler::resolving_after(50);
        let closes = Arc::new(AtomicUsize::new(0));
        let counter = closes.clone();
        let mut form = form(handler.clone()).with_on_close(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        form.open(());
        form.edit_field("email", "a@b.com").unwrap();
        assert_eq!(form.status(), SubmissionStatus::Idle);

        let cmd = form.submit().unwrap();
        assert_eq!(form.status(), SubmissionStatus::Submitting);
        assert!(form.submit().is_none());
        spawn(cmd);

        sleep(Duration::from_millis(10)).await;
        form.update();
        assert_eq!(form.status(), SubmissionStatus::Submitting);

        sleep(Duration::from_millis(50)).await;
        form.update();
        assert_eq!(form.status(), SubmissionStatus::Success);
        assert!(form.values().is_empty());
        assert!(form.is_open());
        assert_eq!(handler.calls.lock().unwrap()[0].get("email"), Some("a@b.com"));

        sleep(Duration::from_millis(1400)).await;
        form.update();
        assert!(form.is_open());
        assert_eq!(closes.load(Ordering::SeqCst), 0);

        sleep(Duration::from_millis(200)).await;
        form.update();
        assert!(!form.is_open());
        assert_eq!(form.status(), SubmissionStatus::Idle);
        assert!(form.values().is_empty());
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejected_submission_keeps_values() {
        let handler = ScriptedHandler::rejecting_after(20);
        let mut form = form(handler.clone());
        form.open(());
        form.edit_field("email", "a@b.com").unwrap();

        spawn(form.submit().unwrap());
        sleep(Duration::from_millis(30)).await;
        form.update();

        assert_eq!(handler.call_count(), 1);
        assert_eq!(form.status(), SubmissionStatus::Idle);
        assert!(form.is_open());
        assert_eq!(form.values().get("email"), Some("a@b.com"));
        assert_eq!(form.values().len(), 1);

        // A retry is allowed straight away.
        assert!(form.submit().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_input_is_ignored_while_submitting() {
        let mut form = form(ScriptedHandler::resolving_after(100));
        form.open(());
        form.edit_field("email", "a@b.com").unwrap();
        spawn(form.submit().unwrap());

        assert!(form.handle_key(key(KeyCode::Char('x'))).unwrap().is_consumed());
        assert!(form.handle_key(key(KeyCode::Esc)).unwrap().is_consumed());
        assert!(!form.cancel());
        assert!(!form.edit_field("email", "other@b.com").unwrap());
        form.handle_paste("pasted").unwrap();

        assert!(form.is_open());
        assert_eq!(form.values().get("email"), Some("a@b.com"));
        assert_eq!(form.status(), SubmissionStatus::Submitting);

        draw(&mut form);
        let panel = form.controller.panel().unwrap();
        form.handle_mouse(press(panel.x.saturating_sub(1), panel.y)).unwrap();
        assert!(form.is_open());
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_result_after_close_is_dropped() {
        let handler = ScriptedHandler::resolving_after(50);
        let mut form = form(handler.clone());
        form.open(());
        form.edit_field("email", "a@b.com").unwrap();
        spawn(form.submit().unwrap());

        form.close();
        form.open(());
        sleep(Duration::from_millis(100)).await;
        form.update();

        assert_eq!(handler.call_count(), 1);
        assert!(form.is_open());
        assert_eq!(form.status(), SubmissionStatus::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_auto_close() {
        let mut form = form(ScriptedHandler::resolving_after(0));
        form.open(());
        form.edit_field("email", "a@b.com").unwrap();
        spawn(form.submit().unwrap());
        sleep(Duration::from_millis(1)).await;
        form.update();
        assert_eq!(form.status(), SubmissionStatus::Success);

        let token = form.auto_close.clone().unwrap();
        assert!(!token.is_cancelled());
        drop(form);
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_backdrop_closes_but_content_does_not() {
        let (mut form, closes) = counted(form(ScriptedHandler::resolving_after(0)));
        form.open(());
        form.edit_field("email", "a@b.com").unwrap();
        draw(&mut form);

        let panel = form.controller.panel().unwrap();
        form.handle_mouse(press(panel.x + 1, panel.y + 1)).unwrap();
        assert!(form.is_open());
        assert_eq!(form.values().get("email"), Some("a@b.com"));
        assert_eq!(closes.load(Ordering::SeqCst), 0);

        form.handle_mouse(press(0, 0)).unwrap();
        assert!(!form.is_open());
        assert!(form.values().is_empty());
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_click_on_input_moves_focus() {
        let (mut form, closes) = counted(form(ScriptedHandler::resolving_after(0)));
        form.open(());
        draw(&mut form);

        let message = form.layout.as_ref().unwrap().inputs[1];
        form.handle_mouse(press(message.x + 1, message.y + 1)).unwrap();
        assert_eq!(form.focus, Focus::Field(1));

        let cancel = form.layout.as_ref().unwrap().cancel;
        form.handle_mouse(press(cancel.x + 1, cancel.y + 1)).unwrap();
        assert!(!form.is_open());
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_typing_edits_only_the_focused_field() {
        let mut form = form(ScriptedHandler::resolving_after(0));
        form.open(());
        type_text(&mut form, "a@b.co");
        assert_eq!(form.values().get("email"), Some("a@b.co"));
        assert_eq!(form.values().get("message"), None);

        form.handle_key(key(KeyCode::Tab)).unwrap();
        type_text(&mut form, "hi");
        form.handle_key(key(KeyCode::Enter)).unwrap();
        type_text(&mut form, "yo");

        assert_eq!(form.values().get("email"), Some("a@b.co"));
        assert_eq!(form.values().get("message"), Some("hi\nyo"));
        assert_eq!(form.status(), SubmissionStatus::Idle);
    }

    #[test]
    fn test_enter_in_single_line_field_submits() {
        let mut form = form(ScriptedHandler::resolving_after(0));
        form.open(());
        type_text(&mut form, "a@b.com");
        let result = form.handle_key(key(KeyCode::Enter)).unwrap();
        assert!(matches!(result, EventResult::Event(FormOutput::Run(_))));
        assert_eq!(form.status(), SubmissionStatus::Submitting);
    }

    #[test]
    fn test_escape_cancels() {
        let (mut form, closes) = counted(form(ScriptedHandler::resolving_after(0)));
        form.open(());
        type_text(&mut form, "a@b");
        form.handle_key(key(KeyCode::Esc)).unwrap();
        assert!(!form.is_open());
        assert_eq!(closes.load(Ordering::SeqCst), 1);

        form.handle_key(key(KeyCode::Esc)).unwrap();
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_paste_flattens_newlines_in_single_line_fields() {
        let mut form = form(ScriptedHandler::resolving_after(0));
        form.open(());
        form.handle_paste("a@b\n.com").unwrap();
        assert_eq!(form.values().get("email"), Some("a@b .com"));

        form.handle_key(key(KeyCode::Tab)).unwrap();
        form.handle_paste("line one\r\nline two").unwrap();
        assert_eq!(form.values().get("message"), Some("line one\nline two"));
    }

    #[test]
    fn test_layout_fits_small_terminals() {
        let layout = FormLayout::compute(Rect::new(0, 0, 30, 12), &definition());
        assert!(layout.panel.width <= 26);
        assert!(layout.panel.height <= 12);
        assert_eq!(layout.inputs.len(), 2);
    }
}
