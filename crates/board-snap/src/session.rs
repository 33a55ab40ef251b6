//! Drives the reducer: feeds it user events, runs the effects it returns
//! and routes async completions (analysis results, timers, pastes) back in.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use snap_core::{
    reduce, AppState, CandidateFile, Channel, ClipboardItem, Effect, Event, IngestionRouter,
    PositionPolicy, PreviewStore, ViewState,
};

use crate::clients::Analyzer;
use crate::clipboard::ClipboardSink;
use crate::paste::{PasteHub, PasteSubscription};

pub struct Session<A, P, K> {
    state: AppState,
    router: IngestionRouter<P>,
    analyzer: Arc<A>,
    clipboard: K,
    copy_window: Option<Duration>,
    tx: mpsc::UnboundedSender<Event>,
    rx: mpsc::UnboundedReceiver<Event>,
    in_flight: usize,
    timers: usize,
    paste: Option<PasteSubscription>,
}

enum Inbound {
    Event(Event),
    Paste(Option<Vec<ClipboardItem>>),
}

impl<A, P, K> Session<A, P, K>
where
    A: Analyzer,
    P: PreviewStore,
    K: ClipboardSink,
{
    pub fn new(analyzer: A, router: IngestionRouter<P>, clipboard: K) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            state: AppState::new(),
            router,
            analyzer: Arc::new(analyzer),
            clipboard,
            copy_window: None,
            tx,
            rx,
            in_flight: 0,
            timers: 0,
            paste: None,
        }
    }

    pub fn with_position_policy(mut self, policy: PositionPolicy) -> Self {
        self.state = self.state.with_position_policy(policy);
        self
    }

    pub fn with_copy_window(mut self, window: Duration) -> Self {
        self.copy_window = Some(window);
        self
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn view(&self) -> ViewState {
        self.state.view()
    }

    pub fn router(&self) -> &IngestionRouter<P> {
        &self.router
    }

    pub fn clipboard(&self) -> &K {
        &self.clipboard
    }

    /// Analysis requests spawned but not yet settled, stale ones included.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn offer_files(&mut self, files: Vec<CandidateFile>, channel: Channel) {
        if let Some(event) = self.router.offer_files(files, channel) {
            self.dispatch(event);
        }
    }

    pub fn paste(&mut self, items: Vec<ClipboardItem>) {
        if let Some(event) = self.router.offer_paste(items) {
            self.dispatch(event);
        }
    }

    pub fn attach_paste(&mut self, hub: &PasteHub) {
        if self.paste.replace(hub.subscribe()).is_some() {
            debug!("Replaced existing paste subscription");
        }
    }

    pub fn detach_paste(&mut self) {
        self.paste = None;
    }

    pub fn is_paste_attached(&self) -> bool {
        self.paste.is_some()
    }

    pub fn toggle_orientation(&mut self) {
        self.dispatch(Event::ToggleOrientation);
    }

    pub fn copy_position(&mut self) {
        self.dispatch(Event::CopyRequested);
    }

    /// The preview of the current image has been drawn.
    pub fn preview_rendered(&mut self) {
        if let Some(id) = self.state.uploaded_image.as_ref().map(|image| image.id()) {
            self.dispatch(Event::PreviewRendered(id));
        }
    }

    pub fn dispatch(&mut self, event: Event) {
        let effects = reduce(&mut self.state, event);
        self.execute(effects);
    }

    /// Wait for one async completion or paste and apply it. Returns `false`
    /// when nothing could ever arrive.
    pub async fn pump(&mut self) -> bool {
        if self.in_flight == 0 && self.timers == 0 && self.paste.is_none() {
            return false;
        }

        let inbound = {
            let rx = &mut self.rx;
            let paste = self.paste.as_mut();
            tokio::select! {
                Some(event) = rx.recv() => Inbound::Event(event),
                items = next_paste(paste) => Inbound::Paste(items),
            }
        };

        match inbound {
            Inbound::Event(event) => {
                match &event {
                    Event::AnalysisSettled { .. } => {
                        self.in_flight = self.in_flight.saturating_sub(1)
                    }
                    Event::CopyWindowElapsed { .. } => self.timers = self.timers.saturating_sub(1),
                    _ => {}
                }
                self.dispatch(event);
            }
            Inbound::Paste(Some(items)) => self.paste(items),
            Inbound::Paste(None) => {
                debug!("Paste hub closed, detaching");
                self.paste = None;
            }
        }
        true
    }

    /// Pump until every spawned analysis has reported back.
    pub async fn settle(&mut self) {
        while self.in_flight > 0 {
            self.pump().await;
        }
    }

    /// Tear down the paste subscription and release any outstanding preview.
    pub fn shutdown(&mut self) {
        self.detach_paste();
        self.dispatch(Event::SessionEnded);
    }

    fn execute(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::StartAnalysis { request, file } => {
                    self.in_flight += 1;
                    let analyzer = Arc::clone(&self.analyzer);
                    let tx = self.tx.clone();
                    tokio::spawn(async move {
                        let outcome = analyzer.analyze(file).await;
                        let _ = tx.send(Event::AnalysisSettled { request, outcome });
                    });
                }
                Effect::ReleasePreview(url) => {
                    if let Err(e) = self.router.release_preview(&url) {
                        warn!("Preview release failed: {e}");
                    }
                }
                Effect::WriteClipboard(text) => {
                    if let Err(e) = self.clipboard.write_text(&text) {
                        warn!("Copy failed: {e}");
                    }
                }
                Effect::ScheduleCopyReset { token, after } => {
                    self.timers += 1;
                    let after = self.copy_window.unwrap_or(after);
                    let tx = self.tx.clone();
                    tokio::spawn(async move {
                        tokio::time::sleep(after).await;
                        let _ = tx.send(Event::CopyWindowElapsed { token });
                    });
                }
            }
        }
    }
}

async fn next_paste(sub: Option<&mut PasteSubscription>) -> Option<Vec<ClipboardItem>> {
    match sub {
        Some(sub) => sub.recv().await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::MemoryClipboard;
    use snap_core::{AnalysisError, AnalysisResult, MemoryPreviewStore, Phase, UploadPolicy};

    /// Answers after a delay chosen by the first byte of the upload.
    struct ScriptedAnalyzer;

    impl Analyzer for ScriptedAnalyzer {
        async fn analyze(&self, file: CandidateFile) -> Result<AnalysisResult, AnalysisError> {
            let tag = file.bytes.first().copied().unwrap_or(0);
            tokio::time::sleep(Duration::from_millis(100 * tag as u64)).await;
            Ok(AnalysisResult {
                position: board_for(tag).to_string(),
                cropped_preview_url: format!("https://x/{tag}.png"),
            })
        }
    }

    fn board_for(tag: u8) -> &'static str {
        match tag {
            1 => "4k3/8/8/8/8/8/8/4K3",
            2 => "8/8/8/8/8/8/8/8",
            _ => "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR",
        }
    }

    const KINGS_ONLY: &str = "4k3/8/8/8/8/8/8/4K3 w KQkq - 0 1";

    fn session() -> Session<ScriptedAnalyzer, MemoryPreviewStore, MemoryClipboard> {
        let router = IngestionRouter::new(UploadPolicy::default(), MemoryPreviewStore::new());
        Session::new(ScriptedAnalyzer, router, MemoryClipboard::new())
    }

    fn jpeg(tag: u8) -> CandidateFile {
        CandidateFile::new(vec![tag; 16], "image/jpeg", Channel::Picker)
    }

    #[tokio::test(start_paused = true)]
    async fn test_upload_to_success() {
        let mut session = session();
        session.offer_files(vec![jpeg(1)], Channel::Picker);
        assert_eq!(session.view().phase, Phase::Analyzing);

        session.settle().await;
        let view = session.view();
        assert_eq!(view.phase, Phase::Success);
        assert_eq!(view.position.as_deref(), Some(KINGS_ONLY));
        assert_eq!(view.cropped_preview_url.as_deref(), Some("https://x/1.png"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_first_request_does_not_win() {
        let mut session = session();
        session.offer_files(vec![jpeg(5)], Channel::Drop);
        session.offer_files(vec![jpeg(1)], Channel::Drop);
        assert_eq!(session.in_flight(), 2);

        session.settle().await;
        assert_eq!(session.in_flight(), 0);
        assert_eq!(session.state().position, KINGS_ONLY);
        // The superseded preview was released on supersession.
        assert_eq!(session.router().previews().live_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_validation_rejection_never_calls_analyzer() {
        let mut session = session();
        let gif = CandidateFile::new(vec![1; 4], "image/gif", Channel::Picker);
        session.offer_files(vec![gif], Channel::Picker);

        assert_eq!(session.in_flight(), 0);
        assert_eq!(session.view().phase, Phase::Failed);
        assert!(!session.pump().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_copy_confirmation_resets_after_window() {
        let mut session = session();
        session.copy_position();
        assert!(!session.state().copy_confirmed);
        assert_eq!(session.clipboard().writes(), 0);

        session.offer_files(vec![jpeg(1)], Channel::Picker);
        session.settle().await;

        session.copy_position();
        assert!(session.state().copy_confirmed);
        assert_eq!(session.clipboard().contents(), Some(KINGS_ONLY));

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(session.state().copy_confirmed);

        assert!(session.pump().await);
        assert!(!session.state().copy_confirmed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_render_then_shutdown_releases_once() {
        let mut session = session();
        session.offer_files(vec![jpeg(1)], Channel::Picker);
        assert_eq!(session.router().previews().live_count(), 1);

        session.preview_rendered();
        assert_eq!(session.router().previews().live_count(), 0);

        session.shutdown();
        session.settle().await;
        assert_eq!(session.router().previews().live_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_paste_subscription_lifecycle() {
        let hub = PasteHub::new();
        let mut session = session();

        session.attach_paste(&hub);
        assert_eq!(hub.listener_count(), 1);
        hub.publish(vec![
            ClipboardItem::new("text/plain", b"hi".to_vec()),
            ClipboardItem::new("image/png", vec![2; 8]),
        ]);
        assert!(session.pump().await);
        assert_eq!(session.view().phase, Phase::Analyzing);
        assert_eq!(
            session.state().uploaded_image.as_ref().unwrap().file().channel,
            Channel::Paste
        );
        session.settle().await;

        session.detach_paste();
        assert_eq!(hub.listener_count(), 0);
        let before = session.state().clone();
        assert_eq!(hub.publish(vec![ClipboardItem::new("image/png", vec![3; 8])]), 0);
        assert!(!session.pump().await);
        assert_eq!(session.state(), &before);
    }
}
