use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::core::PlaybackTiming;
use crate::error::{TransformError, TransformResult};
use crate::host::{EditorHost, UndoTag};

use super::marshal::{ScriptResult, SetupPayload, build_setup_payload, extract_result};
use super::sandbox::{Sandbox, SandboxLimits};

pub const WORKER_THREAD_NAME: &str = "track-script";

/// One asynchronous script execution.
///
/// The job moves into the worker thread at start and comes back inside the
/// completion event, so its result fields can only be read after delivery.
#[derive(Debug)]
pub(crate) struct ScriptJob {
    sandbox: Sandbox,
    prelude_path: Option<PathBuf>,
    setup_payload: Option<SetupPayload>,
    script_path: PathBuf,
    target_track_index: usize,
    result: Option<TransformResult<ScriptResult>>,
}

impl ScriptJob {
    fn new(
        sandbox: Sandbox,
        prelude_path: Option<PathBuf>,
        setup_payload: SetupPayload,
        script_path: PathBuf,
        target_track_index: usize,
    ) -> Self {
        Self {
            sandbox,
            prelude_path,
            setup_payload: Some(setup_payload),
            script_path,
            target_track_index,
            result: None,
        }
    }

    fn execute(&mut self) -> TransformResult<ScriptResult> {
        let payload = self.setup_payload.take().ok_or_else(|| {
            TransformError::EnvironmentFault("setup payload already consumed".to_owned())
        })?;

        if let Some(path) = self.prelude_path.as_deref().filter(|path| path.is_file()) {
            let started = Instant::now();
            match self.sandbox.load_prelude(path) {
                Ok(()) => debug!(elapsed_ms = elapsed_ms(started), "prelude finished"),
                Err(err) => warn!(error = %err, path = %path.display(), "prelude script failed"),
            }
        }

        info!(lines = payload.line_count(), "loading track into sandbox");
        let started = Instant::now();
        self.sandbox
            .run_setup(payload.as_str())
            .inspect_err(|err| error!(error = %err, "sandbox setup failed"))?;
        info!(elapsed_ms = elapsed_ms(started), "setup finished");

        info!(path = %self.script_path.display(), "running script");
        let started = Instant::now();
        self.sandbox
            .run_script_file(&self.script_path)
            .inspect_err(|err| error!(error = %err, "script failed"))?;
        info!(elapsed_ms = elapsed_ms(started), "script finished");

        extract_result(&self.sandbox)
            .inspect_err(|err| error!(error = %err, "result extraction failed"))
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobState {
    Idle,
    Running,
}

/// How a delivered job ended.
#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    /// Results replaced the target track.
    CompletedOk {
        target: usize,
        points: usize,
        selected: usize,
        cursor_ms: f64,
    },
    /// The job faulted; no host state was touched.
    CompletedError(TransformError),
}

impl JobOutcome {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::CompletedOk { .. })
    }

    #[must_use]
    pub fn error(&self) -> Option<&TransformError> {
        match self {
            Self::CompletedOk { .. } => None,
            Self::CompletedError(err) => Some(err),
        }
    }
}

/// Runs at most one script job at a time on a detached worker thread.
///
/// Completion events are queued on a channel and applied only when the owning
/// thread calls [`ScriptJobRunner::process_events`].
pub struct ScriptJobRunner {
    limits: SandboxLimits,
    prelude: Option<PathBuf>,
    state: JobState,
    last_outcome: Option<JobOutcome>,
    sender: Sender<ScriptJob>,
    receiver: Receiver<ScriptJob>,
}

impl ScriptJobRunner {
    #[must_use]
    pub fn new(limits: SandboxLimits, prelude: Option<PathBuf>) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            limits,
            prelude,
            state: JobState::Idle,
            last_outcome: None,
            sender,
            receiver,
        }
    }

    #[must_use]
    pub fn state(&self) -> JobState {
        self.state
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state == JobState::Running
    }

    #[must_use]
    pub fn last_outcome(&self) -> Option<&JobOutcome> {
        self.last_outcome.as_ref()
    }

    /// Starts `script_path` against a snapshot of the host's active track.
    ///
    /// Returns `Ok(false)` without doing anything while a job is running.
    pub fn run(
        &mut self,
        host: &dyn EditorHost,
        script_path: impl Into<PathBuf>,
    ) -> TransformResult<bool> {
        let script_path = script_path.into();
        if self.is_running() {
            debug!(path = %script_path.display(), "script already running, ignoring run request");
            return Ok(false);
        }

        let target = host.active_track_index();
        let track = host
            .track(target)
            .ok_or(TransformError::InvalidTarget { index: target })?;

        let sandbox = Sandbox::new(&self.limits);
        let timing = PlaybackTiming {
            current_position_ms: host.clock().current_position_ms(),
            frame_time_ms: host.clock().frame_time_ms(),
        };
        let payload = build_setup_payload(&track.capture_snapshot(), host.clipboard(), timing);
        let job = ScriptJob::new(sandbox, self.prelude.clone(), payload, script_path, target);

        self.state = JobState::Running;
        self.last_outcome = None;
        let sender = self.sender.clone();
        let spawned = thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_owned())
            .spawn(move || run_worker(job, &sender));
        if let Err(err) = spawned {
            self.state = JobState::Idle;
            return Err(TransformError::EnvironmentFault(format!(
                "failed to spawn script worker: {err}"
            )));
        }
        Ok(true)
    }

    /// Applies every queued completion. Call on the owning thread only.
    ///
    /// Returns the outcome of the last delivered job, if any.
    pub fn process_events(&mut self, host: &mut dyn EditorHost) -> Option<JobOutcome> {
        let mut outcome = None;
        while let Ok(job) = self.receiver.try_recv() {
            outcome = Some(self.complete(job, host));
        }
        outcome
    }

    /// Blocks until the running job completes or `timeout` passes, then
    /// applies it. Meant for headless hosts that have no event loop.
    pub fn wait_for_completion(
        &mut self,
        host: &mut dyn EditorHost,
        timeout: Duration,
    ) -> Option<JobOutcome> {
        if !self.is_running() {
            return None;
        }
        match self.receiver.recv_timeout(timeout) {
            Ok(job) => Some(self.complete(job, host)),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => {
                warn!("script result channel disconnected");
                None
            }
        }
    }

    fn complete(&mut self, job: ScriptJob, host: &mut dyn EditorHost) -> JobOutcome {
        let ScriptJob {
            sandbox,
            target_track_index,
            result,
            ..
        } = job;

        let outcome = match result {
            Some(Ok(result)) => apply_result(host, target_track_index, result),
            Some(Err(err)) => JobOutcome::CompletedError(err),
            None => JobOutcome::CompletedError(TransformError::EnvironmentFault(
                "job delivered without a result".to_owned(),
            )),
        };
        if let Some(err) = outcome.error().filter(|err| err.is_job_fault()) {
            warn!(error = %err, track = target_track_index, "script job left track untouched");
        }

        // the sandbox is torn down on the owning thread
        drop(sandbox);
        self.state = JobState::Idle;
        self.last_outcome = Some(outcome.clone());
        outcome
    }
}

impl std::fmt::Debug for ScriptJobRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptJobRunner")
            .field("limits", &self.limits)
            .field("prelude", &self.prelude)
            .field("state", &self.state)
            .field("last_outcome", &self.last_outcome)
            .finish_non_exhaustive()
    }
}

fn run_worker(mut job: ScriptJob, sender: &Sender<ScriptJob>) {
    let result = panic::catch_unwind(AssertUnwindSafe(|| job.execute())).unwrap_or_else(|_| {
        Err(TransformError::ScriptExecutionFault(
            "script worker panicked".to_owned(),
        ))
    });
    job.result = Some(result);
    if sender.send(job).is_err() {
        warn!("script runner dropped before the job finished; result discarded");
    }
}

fn apply_result(host: &mut dyn EditorHost, target: usize, result: ScriptResult) -> JobOutcome {
    let Some(track) = host.track_mut(target) else {
        debug!(track = target, "target track closed while script was running");
        return JobOutcome::CompletedError(TransformError::InvalidTarget { index: target });
    };

    let out_of_range = result
        .points
        .iter()
        .filter(|action| !action.is_valid())
        .count();
    if out_of_range > 0 {
        debug!(track = target, out_of_range, "script produced out-of-range actions");
    }

    track.snapshot(UndoTag::CustomScript);
    track.select_all();
    track.remove_selected();
    for action in &result.points {
        track.add_action(*action);
    }
    for action in &result.selection {
        track.set_selection(*action, true);
    }
    let points = track.actions().len();
    let selected = track.selection_size();

    host.clock_mut().set_position(result.cursor_ms);
    info!(
        track = target,
        points,
        selected,
        cursor_ms = result.cursor_ms,
        "script result applied"
    );

    JobOutcome::CompletedOk {
        target,
        points,
        selected,
        cursor_ms: result.cursor_ms,
    }
}
