//! The playback controller aggregate.
//!
//! [`PlaybackController`] is the single owner of scope, mode, prefetch queue,
//! history, the current clip and the advance timer. Every mutation goes
//! through its `&mut self` methods, which makes it the only writer of that
//! state. Background work (refill passes, timers, warm-ups) never touches the
//! state directly: it reports back over an internal channel that only the
//! controller drains, via [`pump`](PlaybackController::pump),
//! [`next_event`](PlaybackController::next_event) or the actor loop in
//! [`run`](PlaybackController::run).

use std::sync::Arc;

use cliploop_common::{CacheStatus, ClipDescriptor, Scope, TreeNode};
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::backend::{ClipError, ClipRequest, ClipSource};
use crate::config::PlaybackConfig;
use crate::sync::{annotate_upcoming, UpcomingEntry};

use super::events::ControllerEvent;
use super::history::History;
use super::mode::Mode;
use super::queue::{PrefetchQueue, DEFAULT_CAPACITY};
use super::surface::PlaybackSurface;
use super::timer::{delay_from_secs, AdvanceTimer, Ticket};
use super::ControlError;

/// Buffered commands waiting for the actor loop.
const COMMAND_CAPACITY: usize = 32;

/// Buffered notifications per subscriber before the oldest are dropped.
const EVENT_CAPACITY: usize = 64;

/// Tunables for one controller.
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerOptions {
    pub queue_capacity: usize,
    pub preferred_duration: Option<u32>,
    pub preview_prefetch: bool,
    pub warm_prefetch: bool,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_CAPACITY,
            preferred_duration: None,
            preview_prefetch: true,
            warm_prefetch: true,
        }
    }
}

impl From<&PlaybackConfig> for ControllerOptions {
    fn from(config: &PlaybackConfig) -> Self {
        Self {
            queue_capacity: config.queue_capacity,
            preferred_duration: config.preferred_duration_secs,
            preview_prefetch: config.preview_prefetch,
            warm_prefetch: config.warm_prefetch,
        }
    }
}

/// Result of one advance request.
#[derive(Debug, Clone, PartialEq)]
pub enum AdvanceOutcome {
    /// A new clip is now current.
    Presented(ClipDescriptor),
    /// The held clip was restarted.
    Replayed(ClipDescriptor),
    /// Nothing could be fetched; the previous clip stays current.
    Unavailable(ClipError),
    /// The mode does not advance (whole-file playback).
    Ignored,
}

impl AdvanceOutcome {
    pub fn clip(&self) -> Option<&ClipDescriptor> {
        match self {
            Self::Presented(clip) | Self::Replayed(clip) => Some(clip),
            Self::Unavailable(_) | Self::Ignored => None,
        }
    }
}

/// Point-in-time copy of the controller state.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ControllerSnapshot {
    pub scope: Scope,
    pub mode: Mode,
    pub current: Option<ClipDescriptor>,
    pub history: Vec<ClipDescriptor>,
    pub history_index: Option<usize>,
    pub queue: Vec<ClipDescriptor>,
    pub preferred_duration: Option<u32>,
    pub status: Option<String>,
    pub timer_armed: bool,
    /// Seconds until the armed timer advances.
    pub next_advance_secs: Option<f64>,
    pub paused: bool,
}

/// Completions reported by background tasks.
#[derive(Debug)]
enum Internal {
    Prefetched { generation: u64, clip: ClipDescriptor },
    RefillDone { generation: u64, complete: bool },
    TimerElapsed { ticket: Ticket },
}

pub struct PlaybackController<S: ClipSource, P: PlaybackSurface> {
    source: Arc<S>,
    surface: P,
    options: ControllerOptions,

    scope: Scope,
    mode: Mode,
    preferred_duration: Option<u32>,
    /// Bumped whenever queued clips stop matching scope or duration.
    generation: u64,
    /// Generation of the refill pass in flight, if any.
    refilling: Option<u64>,

    queue: PrefetchQueue,
    history: History,
    current: Option<ClipDescriptor>,
    timer: AdvanceTimer,
    paused: bool,
    status: Option<String>,

    events: broadcast::Sender<ControllerEvent>,
    internal_tx: mpsc::UnboundedSender<Internal>,
    internal_rx: mpsc::UnboundedReceiver<Internal>,
}

impl<S: ClipSource, P: PlaybackSurface> PlaybackController<S, P> {
    pub fn new(source: Arc<S>, surface: P, options: ControllerOptions) -> Self {
        let (internal_tx, internal_rx) = mpsc::unbounded_channel();
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Self {
            source,
            surface,
            queue: PrefetchQueue::new(options.queue_capacity),
            preferred_duration: options.preferred_duration.filter(|d| *d > 0),
            options,
            scope: Scope::Root,
            mode: Mode::FolderLoop,
            generation: 0,
            refilling: None,
            history: History::new(),
            current: None,
            timer: AdvanceTimer::new(),
            paused: false,
            status: None,
            events,
            internal_tx,
            internal_rx,
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn current(&self) -> Option<&ClipDescriptor> {
        self.current.as_ref()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn queue(&self) -> &PrefetchQueue {
        &self.queue
    }

    pub fn preferred_duration(&self) -> Option<u32> {
        self.preferred_duration
    }

    /// Diagnostic left by the last failed advance.
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_timer_armed(&self) -> bool {
        self.timer.is_armed()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn surface(&self) -> &P {
        &self.surface
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ControllerEvent> {
        self.events.subscribe()
    }

    /// Queued clips annotated with the latest cache status.
    pub fn upcoming(&self, status: Option<&CacheStatus>) -> Vec<UpcomingEntry> {
        annotate_upcoming(self.queue.iter(), status)
    }

    pub fn snapshot(&self) -> ControllerSnapshot {
        ControllerSnapshot {
            scope: self.scope.clone(),
            mode: self.mode.clone(),
            current: self.current.clone(),
            history: self.history.entries().to_vec(),
            history_index: self.history.index(),
            queue: self.queue.snapshot(),
            preferred_duration: self.preferred_duration,
            status: self.status.clone(),
            timer_armed: self.timer.is_armed(),
            next_advance_secs: self.timer.remaining().map(|d| d.as_secs_f64()),
            paused: self.paused,
        }
    }

    // ------------------------------------------------------------------
    // Advance
    // ------------------------------------------------------------------

    /// Move on to whatever the current mode says comes next.
    pub async fn advance(&mut self) -> AdvanceOutcome {
        self.timer.cancel();

        match &self.mode {
            Mode::FullFile { file } => {
                debug!(file = %file, "Advance ignored during whole-file playback");
                return AdvanceOutcome::Ignored;
            }
            Mode::ClipHold { held } => {
                let held = held.clone();
                self.surface.present(&held, false);
                self.current = Some(held.clone());
                self.paused = false;
                self.emit(ControllerEvent::ClipReplayed { clip: held.clone() });
                return AdvanceOutcome::Replayed(held);
            }
            Mode::FolderLoop | Mode::FileLoop => {}
        }

        let clip = match self.queue.take_next() {
            Some(clip) => {
                debug!(file = %clip.file, remaining = self.queue.len(), "Took clip from prefetch queue");
                self.emit(ControllerEvent::QueueChanged {
                    len: self.queue.len(),
                });
                clip
            }
            None => {
                let request = ClipRequest::new(self.scope.clone(), self.preferred_duration);
                match self.source.fetch_clip(&request).await {
                    Ok(clip) => self.fit_to_preferred(clip),
                    Err(e) => {
                        warn!(scope = %self.scope, error = %e, "No clip available; staying on current clip");
                        self.status = Some(e.to_string());
                        self.emit(ControllerEvent::Unavailable {
                            scope: self.scope.clone(),
                            reason: e.to_string(),
                        });
                        return AdvanceOutcome::Unavailable(e);
                    }
                }
            }
        };

        self.history.push(clip.clone());
        self.present(clip.clone());
        self.refill();

        AdvanceOutcome::Presented(clip)
    }

    /// Show `clip` and arm the timer when the mode auto-advances.
    fn present(&mut self, clip: ClipDescriptor) {
        self.timer.cancel();
        self.surface.present(&clip, clip.is_unbounded());
        self.paused = false;
        self.status = None;

        if self.mode.auto_advances() {
            if let Some(secs) = clip.length.seconds() {
                self.arm_timer(secs);
            }
        }

        info!(file = %clip.file, start = clip.start, length = %clip.length, mode = %self.mode, "Clip started");
        self.current = Some(clip.clone());
        self.emit(ControllerEvent::ClipStarted {
            clip,
            history_index: self.history.index(),
        });
    }

    /// Backends may ignore the requested duration, so the preferred one is
    /// applied locally as well.
    fn fit_to_preferred(&self, clip: ClipDescriptor) -> ClipDescriptor {
        match self.preferred_duration {
            Some(secs) => clip.fit_to(f64::from(secs)),
            None => clip,
        }
    }

    fn arm_timer(&mut self, secs: f64) {
        let ticket = self.timer.arm(
            delay_from_secs(secs),
            self.internal_tx.clone(),
            |ticket| Internal::TimerElapsed { ticket },
        );
        debug!(ticket = %ticket, secs, "Auto-advance scheduled");
    }

    // ------------------------------------------------------------------
    // Prefetch
    // ------------------------------------------------------------------

    /// Top the queue up in the background. No-op when full, when a pass for
    /// the current generation is already running, or outside looping modes.
    fn refill(&mut self) {
        if !self.mode.picks_clips() || self.refilling == Some(self.generation) {
            return;
        }
        let missing = self.queue.room();
        if missing == 0 {
            return;
        }

        let generation = self.generation;
        self.refilling = Some(generation);

        let mut request = ClipRequest::new(self.scope.clone(), self.preferred_duration);
        if self.options.preview_prefetch {
            request = request.preview();
        }
        let source = self.source.clone();
        let tx = self.internal_tx.clone();

        debug!(generation, missing, scope = %self.scope, "Starting refill pass");
        tokio::spawn(async move {
            let mut complete = true;
            for _ in 0..missing {
                match source.fetch_clip(&request).await {
                    Ok(clip) => {
                        if tx.send(Internal::Prefetched { generation, clip }).is_err() {
                            return;
                        }
                    }
                    Err(e) => {
                        debug!(generation, error = %e, "Refill pass stopped early");
                        complete = false;
                        break;
                    }
                }
            }
            let _ = tx.send(Internal::RefillDone {
                generation,
                complete,
            });
        });
    }

    /// Drop queued clips; anything still in flight for them becomes stale.
    fn invalidate_queue(&mut self) {
        self.generation += 1;
        self.queue.clear();
        self.emit(ControllerEvent::QueueChanged { len: 0 });
    }

    fn on_prefetched(&mut self, generation: u64, clip: ClipDescriptor) {
        if generation != self.generation {
            debug!(generation, current = self.generation, file = %clip.file, "Dropping stale prefetched clip");
            return;
        }
        let clip = self.fit_to_preferred(clip);
        let file = clip.file.clone();
        if !self.queue.push(clip) {
            return;
        }

        if self.options.warm_prefetch {
            let source = self.source.clone();
            tokio::spawn(async move {
                if let Err(e) = source.warm(&file).await {
                    debug!(file = %file, error = %e, "Warm-up failed; clip will load cold");
                }
            });
        }
        self.emit(ControllerEvent::QueueChanged {
            len: self.queue.len(),
        });
    }

    fn on_refill_done(&mut self, generation: u64, complete: bool) {
        if self.refilling != Some(generation) {
            return;
        }
        self.refilling = None;
        // Clips consumed while the pass ran leave room for another one.
        if generation == self.generation && complete && !self.queue.is_full() {
            self.refill();
        }
    }

    // ------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------

    /// Loop random clips from every video below `path`.
    pub async fn enter_folder(&mut self, path: impl Into<String>) -> AdvanceOutcome {
        self.change_scope(Scope::Folder(path.into())).await
    }

    /// Loop random sub-clips of one file.
    pub async fn enter_file(&mut self, path: impl Into<String>) -> AdvanceOutcome {
        self.change_scope(Scope::File(path.into())).await
    }

    /// Back to random clips from the whole library.
    pub async fn reset_to_root(&mut self) -> AdvanceOutcome {
        self.change_scope(Scope::Root).await
    }

    /// Scope to a node picked from the library tree.
    pub async fn select(&mut self, node: &TreeNode) -> AdvanceOutcome {
        self.change_scope(Scope::from_node(node)).await
    }

    async fn change_scope(&mut self, scope: Scope) -> AdvanceOutcome {
        self.timer.cancel();
        info!(from = %self.scope, to = %scope, "Scope changed");

        self.mode = Mode::looping(&scope);
        self.scope = scope;
        self.invalidate_queue();
        self.history.clear();
        self.emit_mode();

        self.advance().await
    }

    /// Keep replaying the current clip instead of picking new ones.
    pub fn hold_current(&mut self) -> Result<ClipDescriptor, ControlError> {
        let held = self.current.clone().ok_or(ControlError::NoCurrentClip)?;
        self.timer.cancel();
        self.mode = Mode::ClipHold { held: held.clone() };
        info!(file = %held.file, start = held.start, "Holding current clip");
        self.emit_mode();
        Ok(held)
    }

    /// Play the current clip's file from the start with no end bound.
    pub fn play_whole_file(&mut self) -> Result<ClipDescriptor, ControlError> {
        let current = self.current.as_ref().ok_or(ControlError::NoCurrentClip)?;
        let whole =
            ClipDescriptor::whole_file(current.file.clone()).with_media_duration(current.media_duration);

        self.timer.cancel();
        self.mode = Mode::FullFile {
            file: whole.file.clone(),
        };
        self.emit_mode();

        self.history.push(whole.clone());
        self.present(whole.clone());
        Ok(whole)
    }

    /// Leave hold or whole-file playback and resume looping the scope.
    pub async fn release(&mut self) -> Result<AdvanceOutcome, ControlError> {
        if self.mode.picks_clips() {
            return Err(ControlError::invalid_transition("release", &self.mode));
        }
        self.mode = Mode::looping(&self.scope);
        self.emit_mode();
        Ok(self.advance().await)
    }

    /// Change the requested clip length. `None` lets the backend choose.
    pub fn set_preferred_duration(&mut self, duration: Option<u32>) -> Result<(), ControlError> {
        if !self.mode.picks_clips() {
            return Err(ControlError::invalid_transition("change clip duration", &self.mode));
        }
        if duration == Some(0) {
            return Err(ControlError::InvalidInput("clip duration must be at least 1s".into()));
        }
        if duration == self.preferred_duration {
            return Ok(());
        }

        info!(duration = ?duration, "Preferred clip duration changed");
        self.preferred_duration = duration;
        self.invalidate_queue();
        self.refill();
        Ok(())
    }

    /// Re-present the previous history entry. Returns `None` at the start of
    /// history, in which case nothing changes.
    pub fn step_back(&mut self) -> Option<ClipDescriptor> {
        if !self.history.can_step_back() {
            return None;
        }
        let clip = self.history.step_back()?.clone();

        let next_mode = if clip.is_unbounded() {
            Mode::FullFile {
                file: clip.file.clone(),
            }
        } else {
            match &self.mode {
                Mode::ClipHold { .. } => Mode::ClipHold { held: clip.clone() },
                _ => Mode::looping(&self.scope),
            }
        };
        if next_mode != self.mode {
            self.mode = next_mode;
            self.emit_mode();
        }

        debug!(file = %clip.file, index = ?self.history.index(), "Stepped back");
        self.present(clip.clone());
        Some(clip)
    }

    /// Pause playback; the pending advance is cancelled.
    pub fn pause(&mut self) {
        if self.paused || self.current.is_none() {
            return;
        }
        self.timer.cancel();
        self.surface.pause();
        self.paused = true;
    }

    /// Resume playback and re-arm the advance for the time left in the clip.
    pub async fn resume(&mut self) {
        if !self.paused {
            return;
        }
        self.surface.resume();
        self.paused = false;

        if !self.mode.auto_advances() {
            return;
        }
        let position = self.surface.position();
        let Some(remaining) = self.current.as_ref().and_then(|c| c.remaining_at(position)) else {
            return;
        };

        if remaining > 0.0 {
            self.arm_timer(remaining);
        } else {
            self.advance().await;
        }
    }

    fn emit_mode(&self) {
        self.emit(ControllerEvent::ModeChanged {
            mode: self.mode.clone(),
            scope: self.scope.clone(),
        });
    }

    fn emit(&self, event: ControllerEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    // ------------------------------------------------------------------
    // Driving
    // ------------------------------------------------------------------

    async fn handle_internal(&mut self, event: Internal) {
        match event {
            Internal::Prefetched { generation, clip } => self.on_prefetched(generation, clip),
            Internal::RefillDone {
                generation,
                complete,
            } => self.on_refill_done(generation, complete),
            Internal::TimerElapsed { ticket } => {
                if self.timer.take_fired(ticket) {
                    debug!(ticket = %ticket, "Clip finished; advancing");
                    self.advance().await;
                } else {
                    debug!(ticket = %ticket, "Ignoring stale timer");
                }
            }
        }
    }

    /// Handle every completion already reported, without waiting.
    /// Returns how many were handled.
    pub async fn pump(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.internal_rx.try_recv() {
            self.handle_internal(event).await;
            handled += 1;
        }
        handled
    }

    /// Wait for the next background completion and handle it.
    pub async fn next_event(&mut self) {
        if let Some(event) = self.internal_rx.recv().await {
            self.handle_internal(event).await;
        }
    }

    /// Move the controller into its own task and return a handle to it.
    pub fn spawn(self) -> (ControllerHandle, tokio::task::JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(COMMAND_CAPACITY);
        let handle = ControllerHandle {
            tx,
            events: self.events.clone(),
        };
        let task = tokio::spawn(self.run(rx));
        (handle, task)
    }

    /// Actor loop: one command or completion at a time, each to the end.
    ///
    /// Returns when every handle is gone or on [`Command::Shutdown`].
    pub async fn run(mut self, mut commands: mpsc::Receiver<Command>) {
        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(Command::Shutdown) | None => break,
                    Some(command) => self.handle_command(command).await,
                },
                Some(event) = self.internal_rx.recv() => self.handle_internal(event).await,
            }
        }
        self.timer.cancel();
        debug!("Playback controller stopped");
    }

    async fn handle_command(&mut self, command: Command) {
        // A dropped reply receiver just means the caller stopped waiting.
        match command {
            Command::Advance(reply) => {
                let _ = reply.send(self.advance().await);
            }
            Command::EnterFolder(path, reply) => {
                let _ = reply.send(self.enter_folder(path).await);
            }
            Command::EnterFile(path, reply) => {
                let _ = reply.send(self.enter_file(path).await);
            }
            Command::ResetToRoot(reply) => {
                let _ = reply.send(self.reset_to_root().await);
            }
            Command::Hold(reply) => {
                let _ = reply.send(self.hold_current());
            }
            Command::PlayWholeFile(reply) => {
                let _ = reply.send(self.play_whole_file());
            }
            Command::Release(reply) => {
                let _ = reply.send(self.release().await);
            }
            Command::SetDuration(duration, reply) => {
                let _ = reply.send(self.set_preferred_duration(duration));
            }
            Command::StepBack(reply) => {
                let _ = reply.send(self.step_back());
            }
            Command::Pause(reply) => {
                self.pause();
                let _ = reply.send(());
            }
            Command::Resume(reply) => {
                self.resume().await;
                let _ = reply.send(());
            }
            Command::Snapshot(reply) => {
                let _ = reply.send(Box::new(self.snapshot()));
            }
            Command::Shutdown => {}
        }
    }
}

/// Requests accepted by [`PlaybackController::run`].
#[derive(Debug)]
pub enum Command {
    Advance(oneshot::Sender<AdvanceOutcome>),
    EnterFolder(String, oneshot::Sender<AdvanceOutcome>),
    EnterFile(String, oneshot::Sender<AdvanceOutcome>),
    ResetToRoot(oneshot::Sender<AdvanceOutcome>),
    Hold(oneshot::Sender<Result<ClipDescriptor, ControlError>>),
    PlayWholeFile(oneshot::Sender<Result<ClipDescriptor, ControlError>>),
    Release(oneshot::Sender<Result<AdvanceOutcome, ControlError>>),
    SetDuration(Option<u32>, oneshot::Sender<Result<(), ControlError>>),
    StepBack(oneshot::Sender<Option<ClipDescriptor>>),
    Pause(oneshot::Sender<()>),
    Resume(oneshot::Sender<()>),
    Snapshot(oneshot::Sender<Box<ControllerSnapshot>>),
    Shutdown,
}

/// Cloneable front door to a spawned controller.
#[derive(Clone)]
pub struct ControllerHandle {
    tx: mpsc::Sender<Command>,
    events: broadcast::Sender<ControllerEvent>,
}

impl ControllerHandle {
    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, ControlError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(make(reply_tx))
            .await
            .map_err(|_| ControlError::Closed)?;
        reply_rx.await.map_err(|_| ControlError::Closed)
    }

    pub async fn advance(&self) -> Result<AdvanceOutcome, ControlError> {
        self.request(Command::Advance).await
    }

    pub async fn enter_folder(&self, path: impl Into<String>) -> Result<AdvanceOutcome, ControlError> {
        let path = path.into();
        self.request(|reply| Command::EnterFolder(path, reply)).await
    }

    pub async fn enter_file(&self, path: impl Into<String>) -> Result<AdvanceOutcome, ControlError> {
        let path = path.into();
        self.request(|reply| Command::EnterFile(path, reply)).await
    }

    pub async fn reset_to_root(&self) -> Result<AdvanceOutcome, ControlError> {
        self.request(Command::ResetToRoot).await
    }

    pub async fn hold_current(&self) -> Result<ClipDescriptor, ControlError> {
        self.request(Command::Hold).await?
    }

    pub async fn play_whole_file(&self) -> Result<ClipDescriptor, ControlError> {
        self.request(Command::PlayWholeFile).await?
    }

    pub async fn release(&self) -> Result<AdvanceOutcome, ControlError> {
        self.request(Command::Release).await?
    }

    pub async fn set_preferred_duration(&self, duration: Option<u32>) -> Result<(), ControlError> {
        self.request(|reply| Command::SetDuration(duration, reply)).await?
    }

    pub async fn step_back(&self) -> Result<Option<ClipDescriptor>, ControlError> {
        self.request(Command::StepBack).await
    }

    pub async fn pause(&self) -> Result<(), ControlError> {
        self.request(Command::Pause).await
    }

    pub async fn resume(&self) -> Result<(), ControlError> {
        self.request(Command::Resume).await
    }

    pub async fn snapshot(&self) -> Result<ControllerSnapshot, ControlError> {
        self.request(Command::Snapshot).await.map(|s| *s)
    }

    pub async fn shutdown(&self) {
        let _ = self.tx.send(Command::Shutdown).await;
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ControllerEvent> {
        self.events.subscribe()
    }
}
