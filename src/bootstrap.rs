use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::io::Write;
use tracing::debug;

use crate::api::Tracker;
use crate::config::{DesiredState, StoryConfig};
use crate::error::{BootstrapError, BootstrapResult};
use crate::journal::{Journal, JournalAction, JournalEvent};
use crate::model::payload::{
    EpicPayload, IterationPayload, MilestonePayload, Payload, ProjectPayload, StoryPayload,
    TaskPayload,
};
use crate::model::record::RemoteRecord;
use crate::reconcile::{create_task, upsert};
use crate::util::week::iteration_window;

#[derive(Clone, Copy)]
pub enum Mode<'a> {
    /// Reconcile against the remote service.
    Live(&'a dyn Tracker),
    /// Print intended actions; no network calls, every remote id is 0.
    DryRun,
}

impl Mode<'_> {
    fn tag(&self) -> &'static str {
        match self {
            Mode::Live(_) => "[ok]",
            Mode::DryRun => "[dry-run]",
        }
    }
}

/// What one run touched, counted per configured entity.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Summary {
    pub projects: usize,
    pub milestones: usize,
    pub epics: usize,
    pub iterations: usize,
    pub stories: usize,
    pub tasks: usize,
}

/// Runs the stages in dependency order, threading remote ids from parents
/// into children. The first error ends the run.
pub struct Bootstrapper<'a, W: Write> {
    mode: Mode<'a>,
    out: W,
    journal: Option<Journal>,
    now: DateTime<Utc>,
}

impl<'a, W: Write> Bootstrapper<'a, W> {
    pub fn new(mode: Mode<'a>, out: W) -> Self {
        Self {
            mode,
            out,
            journal: None,
            now: Utc::now(),
        }
    }

    pub fn with_journal(mut self, journal: Option<Journal>) -> Self {
        self.journal = journal;
        self
    }

    /// Fix "now" for the iteration window.
    #[cfg(test)]
    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.out
    }

    pub async fn run(&mut self, state: &DesiredState) -> BootstrapResult<Summary> {
        let mut summary = Summary::default();

        let projects = self.projects_stage(state, &mut summary).await?;
        let milestone = self.milestone_stage(state, &mut summary).await?;
        let epics = self.epics_stage(state, milestone.id, &mut summary).await?;
        let iteration = self.iteration_stage(state, &mut summary).await?;
        self.stories_stage(state, &projects, &epics, iteration.as_ref(), &mut summary)
            .await?;

        Ok(summary)
    }

    async fn projects_stage(
        &mut self,
        state: &DesiredState,
        summary: &mut Summary,
    ) -> BootstrapResult<HashMap<String, RemoteRecord>> {
        let mut by_name = HashMap::new();
        for cfg in &state.projects {
            let record = self.reconcile(&ProjectPayload::from(cfg)).await?;
            match self.mode {
                Mode::DryRun => self.line(format_args!(
                    "upsert project: {} ({})",
                    cfg.name, cfg.external_id
                ))?,
                Mode::Live(_) => self.line(format_args!(
                    "project: {} id={}",
                    record.display_name(),
                    record.id
                ))?,
            }
            by_name.insert(cfg.name.clone(), record);
            summary.projects += 1;
        }
        Ok(by_name)
    }

    async fn milestone_stage(
        &mut self,
        state: &DesiredState,
        summary: &mut Summary,
    ) -> BootstrapResult<RemoteRecord> {
        let cfg = state.milestone()?;
        let record = self.reconcile(&MilestonePayload::from(cfg)).await?;
        match self.mode {
            Mode::DryRun => self.line(format_args!("upsert milestone: {}", cfg.name))?,
            Mode::Live(_) => self.line(format_args!(
                "milestone: {} id={}",
                record.display_name(),
                record.id
            ))?,
        }
        summary.milestones += 1;
        Ok(record)
    }

    async fn epics_stage(
        &mut self,
        state: &DesiredState,
        milestone_id: i64,
        summary: &mut Summary,
    ) -> BootstrapResult<HashMap<String, RemoteRecord>> {
        let mut by_name = HashMap::new();
        for cfg in &state.epics {
            let record = self.reconcile(&EpicPayload::new(cfg, milestone_id)).await?;
            match self.mode {
                Mode::DryRun => self.line(format_args!("upsert epic: {}", cfg.name))?,
                Mode::Live(_) => self.line(format_args!(
                    "epic: {} id={}",
                    record.display_name(),
                    record.id
                ))?,
            }
            by_name.insert(cfg.name.clone(), record);
            summary.epics += 1;
        }
        Ok(by_name)
    }

    async fn iteration_stage(
        &mut self,
        state: &DesiredState,
        summary: &mut Summary,
    ) -> BootstrapResult<Option<RemoteRecord>> {
        let Some(cfg) = &state.iteration else {
            debug!("No iteration configured");
            return Ok(None);
        };

        let (start, end) = iteration_window(cfg, &state.org, self.now)?;
        let record = self
            .reconcile(&IterationPayload::new(cfg, start, end))
            .await?;
        match self.mode {
            Mode::DryRun => self.line(format_args!(
                "upsert iteration: {} {start}..{end}",
                cfg.name
            ))?,
            Mode::Live(_) => self.line(format_args!(
                "iteration: {} id={}",
                record.display_name(),
                record.id
            ))?,
        }
        summary.iterations += 1;
        Ok(Some(record))
    }

    async fn stories_stage(
        &mut self,
        state: &DesiredState,
        projects: &HashMap<String, RemoteRecord>,
        epics: &HashMap<String, RemoteRecord>,
        iteration: Option<&RemoteRecord>,
        summary: &mut Summary,
    ) -> BootstrapResult<()> {
        // Resolve every reference up front so a bad name aborts before any
        // story is written.
        let resolved = state
            .stories
            .iter()
            .map(|story| resolve_story(story, projects, epics))
            .collect::<BootstrapResult<Vec<_>>>()?;

        let iteration_id = iteration.map(|it| it.id);
        for (cfg, project_id, epic_id) in resolved {
            let payload = StoryPayload::new(cfg, project_id, epic_id, iteration_id);
            let story = self.reconcile(&payload).await?;
            match self.mode {
                Mode::DryRun => self.line(format_args!(
                    "upsert story: {} (proj '{}', epic '{}')",
                    cfg.name, cfg.project, cfg.epic
                ))?,
                Mode::Live(_) => self.line(format_args!(
                    "story: {} id={}",
                    story.display_name(),
                    story.id
                ))?,
            }
            summary.stories += 1;

            for (idx, description) in cfg.tasks.iter().enumerate() {
                let task = TaskPayload::for_story(
                    &state.org.namespace,
                    description,
                    story.id,
                    &cfg.external_id,
                    idx + 1,
                );
                self.task(&task).await?;
                summary.tasks += 1;
            }
        }
        Ok(())
    }

    async fn task(&mut self, task: &TaskPayload) -> BootstrapResult<()> {
        match self.mode {
            Mode::DryRun => {
                self.log_event(task, 0, JournalAction::Planned)?;
                self.line(format_args!("  task: {}", task.description))
            }
            Mode::Live(tracker) => {
                let record = create_task(tracker, task).await?;
                self.log_event(task, record.id, JournalAction::Created)?;
                self.line(format_args!(
                    "  task id={} - {}",
                    record.id, task.description
                ))
            }
        }
    }

    async fn reconcile<P: Payload>(&mut self, payload: &P) -> BootstrapResult<RemoteRecord> {
        match self.mode {
            Mode::DryRun => {
                self.log_event(payload, 0, JournalAction::Planned)?;
                Ok(RemoteRecord::placeholder())
            }
            Mode::Live(tracker) => {
                let upserted = upsert(tracker, payload).await?;
                self.log_event(payload, upserted.record.id, upserted.action.into())?;
                Ok(upserted.record)
            }
        }
    }

    fn log_event<P: Payload>(
        &self,
        payload: &P,
        remote_id: i64,
        action: JournalAction,
    ) -> BootstrapResult<()> {
        if let Some(journal) = &self.journal {
            journal.append(&JournalEvent::new(
                P::KIND,
                payload.external_id(),
                payload.name(),
                remote_id,
                action,
            ))?;
        }
        Ok(())
    }

    fn line(&mut self, args: std::fmt::Arguments<'_>) -> BootstrapResult<()> {
        let tag = self.mode.tag();
        writeln!(self.out, "{tag} {args}")?;
        Ok(())
    }
}

fn resolve_story<'s>(
    story: &'s StoryConfig,
    projects: &HashMap<String, RemoteRecord>,
    epics: &HashMap<String, RemoteRecord>,
) -> BootstrapResult<(&'s StoryConfig, i64, i64)> {
    match (projects.get(&story.project), epics.get(&story.epic)) {
        (Some(project), Some(epic)) => Ok((story, project.id, epic.id)),
        _ => Err(BootstrapError::UnresolvedStory {
            story: story.name.clone(),
            project: story.project.clone(),
            epic: story.epic.clone(),
        }),
    }
}
