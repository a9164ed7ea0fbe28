use std::sync::Arc;
use std::sync::mpsc::TrySendError;
use std::time::{Duration, Instant};

use engine::{
    AnimationHandle, ChartLayout, Command, CommandKind, Event, FrameSample, GeoPosition, MapHost,
    MarkerIcon, PathSegment, PositionAnimator, RequestId, SegmentLocator, Tick, VideoDescriptor,
    VideoId, average_quality_percent, current_position, navigate_command,
};
use iced::widget::{button, canvas, column, container, row, text};
use iced::{Element, Length, Subscription, Task, time, window};
use tracing::{debug, info, warn};

use crate::bridge::{BridgeEvent, EngineCommandSender, engine_subscription};
use crate::config::Config;
use crate::playback::PlaybackClock;
use crate::widgets::track::{TrackCamera, coordinate_label};
use crate::widgets::{quality_chart, segment, track, video};

const PLAYBACK_TICK: Duration = Duration::from_millis(250);

/// UI messages handled by the iced app update loop.
#[derive(Debug, Clone)]
pub enum Message {
    Bridge(BridgeEvent),
    RefreshRoads,
    ChartHovered(Option<usize>),
    ChartClicked(usize),
    MapClicked(GeoPosition),
    MapPointerMoved(GeoPosition),
    MapZoomed(i8),
    VideoSelected(VideoId),
    VideoClosed,
    TogglePlayback,
    PlaybackTick(Instant),
    PlaybackScrubbed(f64),
    AnimationFrame(AnimationHandle, Instant),
}

/// Data owned by one panel, fetched through the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum Loadable<T> {
    Loading,
    Ready(T),
    Failed(String),
}

/// The open video and its playback state.
#[derive(Debug, Clone)]
pub struct VideoSession {
    pub video_id: VideoId,
    pub filename: String,
    /// Known once the engine has answered for this video.
    pub file_url: Option<String>,
    pub frames: Loadable<Arc<[FrameSample]>>,
    pub clock: PlaybackClock,
}

impl VideoSession {
    fn frames(&self) -> &[FrameSample] {
        match &self.frames {
            Loadable::Ready(frames) => frames,
            Loadable::Loading | Loadable::Failed(_) => &[],
        }
    }
}

/// Root UI state.
pub struct AppState {
    engine_tx: Option<EngineCommandSender>,
    config: Config,
    chart_layout: ChartLayout,
    roads: Loadable<Arc<[PathSegment]>>,
    roads_request: RequestId,
    videos: Loadable<Vec<VideoDescriptor>>,
    video: Option<VideoSession>,
    hovered_sample: Option<usize>,
    locator: SegmentLocator,
    animator: PositionAnimator,
    camera: TrackCamera,
    pointer: Option<GeoPosition>,
    chart_cache: canvas::Cache,
    track_cache: canvas::Cache,
    status: String,
}

impl AppState {
    fn with_config(config: Config, engine_tx: Option<EngineCommandSender>) -> Self {
        Self {
            engine_tx,
            chart_layout: config.layout.chart_layout(),
            locator: SegmentLocator::new(config.search_radius),
            config,
            roads: Loadable::Loading,
            roads_request: 0,
            videos: Loadable::Loading,
            video: None,
            hovered_sample: None,
            animator: PositionAnimator::new(),
            camera: TrackCamera::default(),
            pointer: None,
            chart_cache: canvas::Cache::new(),
            track_cache: canvas::Cache::new(),
            status: String::from("starting engine bridge"),
        }
    }

    /// Boots the app. The engine bridge starts with the subscription.
    pub fn boot(config: Config) -> (Self, Task<Message>) {
        (Self::with_config(config, None), Task::none())
    }

    /// Handles one UI message.
    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Bridge(BridgeEvent::Ready(sender)) => {
                self.engine_tx = Some(sender);
                self.status = String::from("engine ready");
                self.request_initial_data();
            }
            Message::Bridge(BridgeEvent::Event(event)) => {
                self.apply_engine_event(event, Instant::now());
            }
            Message::Bridge(BridgeEvent::Disconnected) => {
                self.status = String::from("engine event channel closed");
                self.engine_tx = None;
                self.fail_pending();
            }
            Message::RefreshRoads => {
                self.load_roads();
            }
            Message::ChartHovered(index) => {
                self.hovered_sample = index;
            }
            Message::ChartClicked(index) => {
                let command = match &self.roads {
                    Loadable::Ready(segments) => segments.get(index).and_then(navigate_command),
                    _ => None,
                };
                match command {
                    Some(command) => {
                        command.apply(&mut self.camera);
                        self.track_cache.clear();
                    }
                    None => debug!(index, "chart sample has no start position"),
                }
            }
            Message::MapClicked(position) => {
                let request = self.locator.begin(position);
                self.camera
                    .place_marker(MarkerIcon::ClickPosition, self.locator.click_position());
                if !self.send_command(Command::Locate(request)) {
                    self.locator.resolve(request.id, Err(self.status.clone()));
                }
            }
            Message::MapPointerMoved(position) => {
                self.pointer = Some(position);
            }
            Message::MapZoomed(delta) => {
                self.camera.zoom_by(delta);
                self.track_cache.clear();
            }
            Message::VideoSelected(video_id) => {
                self.open_video(video_id, Instant::now());
            }
            Message::VideoClosed => {
                self.video = None;
                self.sync_video_marker(Instant::now());
                self.track_cache.clear();
            }
            Message::TogglePlayback => {
                let now = Instant::now();
                if let Some(session) = &mut self.video {
                    session.clock.toggle(now);
                }
                self.sync_video_marker(now);
            }
            Message::PlaybackTick(now) => {
                if let Some(session) = &mut self.video {
                    session.clock.advance(now);
                }
                self.sync_video_marker(now);
            }
            Message::PlaybackScrubbed(seconds) => {
                let now = Instant::now();
                if let Some(session) = &mut self.video {
                    session.clock.seek(seconds, now);
                }
                self.sync_video_marker(now);
            }
            Message::AnimationFrame(handle, now) => {
                if let Tick::Advanced(position) | Tick::Finished(position) =
                    self.animator.tick(handle, now)
                {
                    self.camera
                        .place_marker(MarkerIcon::VideoPosition, Some(position));
                }
            }
        }

        Task::none()
    }

    fn request_initial_data(&mut self) {
        self.load_roads();
        self.videos = Loadable::Loading;
        if !self.send_command(Command::ListVideos) {
            self.videos = Loadable::Failed(self.status.clone());
        }
    }

    /// Issues a new roads request. Answers to earlier ones are ignored.
    fn load_roads(&mut self) {
        self.roads_request += 1;
        self.roads = Loadable::Loading;
        let request_id = self.roads_request;
        if !self.send_command(Command::LoadRoads { request_id }) {
            self.roads = Loadable::Failed(self.status.clone());
        }
    }

    /// Fails every panel still waiting on the engine.
    fn fail_pending(&mut self) {
        let message = self.status.clone();
        if matches!(self.roads, Loadable::Loading) {
            self.roads = Loadable::Failed(message.clone());
        }
        if matches!(self.videos, Loadable::Loading) {
            self.videos = Loadable::Failed(message.clone());
        }
        if let Some(session) = &mut self.video {
            if matches!(session.frames, Loadable::Loading) {
                session.frames = Loadable::Failed(message.clone());
            }
        }
        if let Some(request_id) = self.locator.pending() {
            self.locator.resolve(request_id, Err(message));
        }
    }

    fn send_command(&mut self, command: Command) -> bool {
        if let Some(sender) = &self.engine_tx {
            match sender.try_send(command) {
                Ok(()) => true,
                Err(TrySendError::Full(_)) => {
                    self.status = String::from("engine command queue is full");
                    false
                }
                Err(TrySendError::Disconnected(_)) => {
                    self.status = String::from("engine command channel closed");
                    self.engine_tx = None;
                    false
                }
            }
        } else {
            self.status = String::from("engine is not ready");
            false
        }
    }

    fn open_video(&mut self, video_id: VideoId, now: Instant) {
        let filename = match &self.videos {
            Loadable::Ready(videos) => videos
                .iter()
                .find(|video| video.id == video_id)
                .map(|video| video.filename.clone()),
            _ => None,
        }
        .unwrap_or_else(|| format!("video {video_id}"));

        self.video = Some(VideoSession {
            video_id,
            filename,
            file_url: None,
            frames: Loadable::Loading,
            clock: PlaybackClock::new(0, self.config.seconds_per_frame),
        });
        self.sync_video_marker(now);
        self.track_cache.clear();

        if !self.send_command(Command::SelectVideo { video_id }) {
            let status = self.status.clone();
            if let Some(session) = &mut self.video {
                session.frames = Loadable::Failed(status);
            }
        }
    }

    /// Publishes the frame under the playback clock as the marker target.
    fn sync_video_marker(&mut self, now: Instant) {
        let target = self
            .video
            .as_ref()
            .and_then(|session| current_position(&session.clock, session.frames()));
        self.animator.set_target(target, now);
        self.camera
            .place_marker(MarkerIcon::VideoPosition, self.animator.rendered());
    }

    fn apply_engine_event(&mut self, event: Event, now: Instant) {
        match event {
            Event::RoadsLoaded {
                request_id,
                segments,
            } => {
                if request_id != self.roads_request {
                    debug!(request_id, latest = self.roads_request, "stale roads dropped");
                    return;
                }
                info!(
                    segments = segments.len(),
                    average = average_quality_percent(&segments),
                    "roads ready"
                );
                self.roads = Loadable::Ready(segments);
                self.hovered_sample = None;
                self.chart_cache.clear();
                self.track_cache.clear();
            }
            Event::VideosListed(videos) => {
                self.videos = Loadable::Ready(videos);
            }
            Event::VideoFramesReady {
                video_id,
                file_url,
                frames,
            } => {
                let Some(session) = self
                    .video
                    .as_mut()
                    .filter(|session| session.video_id == video_id)
                else {
                    debug!(video_id, "frames for closed video ignored");
                    return;
                };
                session.clock = PlaybackClock::new(frames.len(), self.config.seconds_per_frame);
                session.file_url = Some(file_url);
                session.frames = Loadable::Ready(frames);
                self.sync_video_marker(now);
                self.track_cache.clear();
            }
            Event::SegmentLocated {
                request_id,
                outcome,
            } => {
                self.locator.resolve(request_id, Ok(outcome));
            }
            Event::Error(error) => {
                warn!(
                    origin = ?error.origin,
                    kind = ?error.kind,
                    message = %error.message,
                    "engine error"
                );
                match error.origin {
                    CommandKind::LoadRoads { request_id } if request_id == self.roads_request => {
                        self.roads = Loadable::Failed(error.message);
                    }
                    CommandKind::LoadRoads { request_id } => {
                        debug!(request_id, "stale roads error dropped");
                    }
                    CommandKind::ListVideos => self.videos = Loadable::Failed(error.message),
                    CommandKind::SelectVideo { video_id } => {
                        if let Some(session) = self
                            .video
                            .as_mut()
                            .filter(|session| session.video_id == video_id)
                        {
                            session.frames = Loadable::Failed(error.message);
                        }
                    }
                    CommandKind::Locate { request_id } => {
                        self.locator.resolve(request_id, Err(error.message));
                    }
                }
            }
        }
    }

    fn segments(&self) -> &[PathSegment] {
        match &self.roads {
            Loadable::Ready(segments) => segments,
            Loadable::Loading | Loadable::Failed(_) => &[],
        }
    }

    /// Renders the UI tree.
    pub fn view(&self) -> Element<'_, Message> {
        let segments = self.segments();

        let roads_status = match &self.roads {
            Loadable::Loading => String::from("Loading road segments..."),
            Loadable::Ready(segments) => format!(
                "{} segments, average quality {:.1}%",
                segments.len(),
                average_quality_percent(segments)
            ),
            Loadable::Failed(message) => format!("Road segments unavailable: {message}"),
        };

        let chart = quality_chart::view(
            self.chart_layout,
            segments,
            self.hovered_sample,
            &self.chart_cache,
            Message::ChartHovered,
            Message::ChartClicked,
        );

        let route = self.video.as_ref().map(VideoSession::frames).unwrap_or(&[]);
        let map = track::view(
            &self.camera,
            segments,
            route,
            &self.track_cache,
            Message::MapClicked,
            Message::MapPointerMoved,
            Message::MapZoomed,
        );

        let pointer = self
            .pointer
            .map(coordinate_label)
            .unwrap_or_default();
        let marker = self
            .animator
            .rendered()
            .map(|position| format!("Video position {}", coordinate_label(position)))
            .unwrap_or_default();

        let left = column![
            row![
                text(roads_status).width(Length::Fill),
                button("Reload").on_press(Message::RefreshRoads),
            ]
            .spacing(8),
            chart,
            map,
            text(pointer).size(12),
            text(marker).size(12),
        ]
        .spacing(8)
        .width(Length::FillPortion(3));

        let right = column![
            segment::view(self.locator.state()),
            video::view(
                &self.videos,
                self.video.as_ref(),
                Message::VideoSelected,
                Message::VideoClosed,
                Message::TogglePlayback,
                Message::PlaybackScrubbed,
            ),
            text(format!("Status: {}", self.status)).size(12),
        ]
        .spacing(12)
        .width(Length::FillPortion(2));

        container(row![left, right].spacing(16))
            .padding(16)
            .into()
    }

    /// Subscribes to engine events, playback ticks, and animation frames.
    pub fn subscription(&self) -> Subscription<Message> {
        let mut subscriptions =
            vec![engine_subscription(self.config.api_url.clone()).map(Message::Bridge)];

        if self
            .video
            .as_ref()
            .is_some_and(|session| session.clock.is_playing())
        {
            subscriptions.push(time::every(PLAYBACK_TICK).map(Message::PlaybackTick));
        }
        if let Some(handle) = self.animator.active_handle() {
            subscriptions.push(
                window::frames()
                    .with(handle)
                    .map(|(handle, now)| Message::AnimationFrame(handle, now)),
            );
        }

        Subscription::batch(subscriptions)
    }

    #[cfg(test)]
    fn from_sender_for_test(engine_tx: EngineCommandSender) -> Self {
        let mut app = Self::with_config(Config::default(), Some(engine_tx));
        app.status = String::from("idle");
        app
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::mpsc;
    use std::time::{Duration, Instant};

    use engine::{
        AnimatorState, Command, CommandKind, EngineErrorEvent, EngineErrorKind, Event,
        FrameSample, GeoPosition, LocateOutcome, LocatorState, MarkerIcon, PathSegment,
        VideoDescriptor,
    };

    use crate::bridge::BridgeEvent;

    use super::{AppState, Loadable, Message};

    fn at(latitude: f64, longitude: f64) -> GeoPosition {
        GeoPosition {
            latitude,
            longitude,
        }
    }

    fn engine_event(app: &mut AppState, event: Event) {
        let _ = app.update(Message::Bridge(BridgeEvent::Event(event)));
    }

    fn video_file(video_id: u64) -> String {
        format!("http://localhost:8000/videos/{video_id}/file")
    }

    fn roads_loaded(app: &mut AppState, segments: Vec<PathSegment>) {
        let request_id = app.roads_request;
        engine_event(
            app,
            Event::RoadsLoaded {
                request_id,
                segments: Arc::from(segments),
            },
        );
    }

    fn frames(count: usize) -> Arc<[FrameSample]> {
        [28.6, 28.61, 28.62, 28.63]
            .into_iter()
            .take(count)
            .map(|latitude| FrameSample {
                latitude,
                longitude: 77.2,
            })
            .collect()
    }

    #[test]
    fn ready_bridge_requests_roads_and_videos() {
        let (command_tx, command_rx) = mpsc::sync_channel(8);
        let mut app = AppState::from_sender_for_test(command_tx.clone());

        let _ = app.update(Message::Bridge(BridgeEvent::Ready(command_tx)));

        assert_eq!(
            command_rx.recv().expect("roads command"),
            Command::LoadRoads { request_id: 1 }
        );
        assert_eq!(command_rx.recv().expect("videos command"), Command::ListVideos);
    }

    #[test]
    fn refresh_with_closed_engine_fails_roads_panel() {
        let (command_tx, command_rx) = mpsc::sync_channel(8);
        let mut app = AppState::from_sender_for_test(command_tx);
        roads_loaded(&mut app, vec![PathSegment::new(1)]);
        drop(command_rx);

        let _ = app.update(Message::RefreshRoads);

        assert_eq!(
            app.roads,
            Loadable::Failed("engine command channel closed".to_owned())
        );
    }

    #[test]
    fn older_roads_answer_does_not_replace_newer_one() {
        let (command_tx, command_rx) = mpsc::sync_channel(8);
        let mut app = AppState::from_sender_for_test(command_tx);
        let _ = app.update(Message::RefreshRoads);
        let _ = app.update(Message::RefreshRoads);
        let Command::LoadRoads { request_id: first } = command_rx.recv().expect("first") else {
            panic!("expected Command::LoadRoads");
        };
        let Command::LoadRoads { request_id: second } = command_rx.recv().expect("second") else {
            panic!("expected Command::LoadRoads");
        };

        engine_event(
            &mut app,
            Event::RoadsLoaded {
                request_id: second,
                segments: Arc::from(vec![PathSegment::new(2), PathSegment::new(3)]),
            },
        );
        engine_event(
            &mut app,
            Event::RoadsLoaded {
                request_id: first,
                segments: Arc::from(vec![PathSegment::new(1)]),
            },
        );
        engine_event(
            &mut app,
            Event::Error(EngineErrorEvent {
                origin: CommandKind::LoadRoads { request_id: first },
                kind: EngineErrorKind::Network,
                message: "timed out".to_owned(),
            }),
        );

        assert_eq!(
            app.segments().iter().map(|segment| segment.id).collect::<Vec<_>>(),
            vec![2, 3]
        );
    }

    #[test]
    fn disconnect_fails_every_waiting_panel() {
        let (command_tx, _command_rx) = mpsc::sync_channel(8);
        let mut app = AppState::from_sender_for_test(command_tx);
        let _ = app.update(Message::VideoSelected(4));
        let _ = app.update(Message::MapClicked(at(28.6, 77.2)));

        let _ = app.update(Message::Bridge(BridgeEvent::Disconnected));

        let closed = "engine event channel closed".to_owned();
        assert_eq!(app.roads, Loadable::Failed(closed.clone()));
        assert_eq!(app.videos, Loadable::Failed(closed.clone()));
        let session = app.video.as_ref().expect("player stays open");
        assert_eq!(session.frames, Loadable::Failed(closed.clone()));
        assert_eq!(
            app.locator.state(),
            &LocatorState::Failed { message: closed }
        );
    }

    #[test]
    fn disconnect_keeps_loaded_panels() {
        let (command_tx, _command_rx) = mpsc::sync_channel(8);
        let mut app = AppState::from_sender_for_test(command_tx);
        roads_loaded(&mut app, vec![PathSegment::new(1)]);

        let _ = app.update(Message::Bridge(BridgeEvent::Disconnected));

        assert!(matches!(app.roads, Loadable::Ready(_)));
        assert_eq!(app.locator.state(), &LocatorState::Idle);
    }

    #[test]
    fn map_click_dispatches_locate_with_configured_radius() {
        let (command_tx, command_rx) = mpsc::sync_channel(8);
        let mut app = AppState::from_sender_for_test(command_tx);

        let _ = app.update(Message::MapClicked(at(28.61, 77.21)));

        let Command::Locate(request) = command_rx.recv().expect("locate command") else {
            panic!("expected Command::Locate");
        };
        assert_eq!(request.position, at(28.61, 77.21));
        assert_eq!(request.radius, 200.0);
        assert_eq!(app.locator.state(), &LocatorState::Loading);
        assert_eq!(
            app.camera.marker(MarkerIcon::ClickPosition),
            Some(at(28.61, 77.21))
        );
    }

    #[test]
    fn stale_locate_response_is_ignored() {
        let (command_tx, command_rx) = mpsc::sync_channel(8);
        let mut app = AppState::from_sender_for_test(command_tx);
        let _ = app.update(Message::MapClicked(at(1.0, 1.0)));
        let _ = app.update(Message::MapClicked(at(2.0, 2.0)));
        let Command::Locate(first) = command_rx.recv().expect("first locate") else {
            panic!("expected Command::Locate");
        };
        let Command::Locate(second) = command_rx.recv().expect("second locate") else {
            panic!("expected Command::Locate");
        };

        engine_event(
            &mut app,
            Event::SegmentLocated {
                request_id: second.id,
                outcome: LocateOutcome::NotFound { message: None },
            },
        );
        engine_event(
            &mut app,
            Event::SegmentLocated {
                request_id: first.id,
                outcome: LocateOutcome::Found(Box::new(PathSegment::new(1))),
            },
        );

        assert_eq!(
            app.locator.state(),
            &LocatorState::NotFound { message: None }
        );
    }

    #[test]
    fn locate_error_only_affects_segment_panel() {
        let (command_tx, command_rx) = mpsc::sync_channel(8);
        let mut app = AppState::from_sender_for_test(command_tx);
        roads_loaded(&mut app, vec![PathSegment::new(1)]);
        let _ = app.update(Message::MapClicked(at(1.0, 1.0)));
        let Command::Locate(request) = command_rx.recv().expect("locate") else {
            panic!("expected Command::Locate");
        };

        engine_event(
            &mut app,
            Event::Error(EngineErrorEvent {
                origin: CommandKind::Locate {
                    request_id: request.id,
                },
                kind: EngineErrorKind::Network,
                message: "connection refused".to_owned(),
            }),
        );

        assert_eq!(
            app.locator.state(),
            &LocatorState::Failed {
                message: "connection refused".to_owned()
            }
        );
        assert!(matches!(app.roads, Loadable::Ready(_)));
    }

    #[test]
    fn chart_click_recenters_camera_on_segment_start() {
        let (command_tx, _command_rx) = mpsc::sync_channel(8);
        let mut app = AppState::from_sender_for_test(command_tx);
        let mut segment = PathSegment::new(5);
        segment.start = Some(at(12.9, 77.6));
        roads_loaded(&mut app, vec![PathSegment::new(4), segment]);

        let _ = app.update(Message::ChartClicked(0));
        assert_eq!(app.camera.zoom(), 13);

        let _ = app.update(Message::ChartClicked(1));
        assert_eq!(app.camera.center(), at(12.9, 77.6));
        assert_eq!(app.camera.zoom(), 16);
    }

    #[test]
    fn selecting_video_opens_player_and_loads_frames() {
        let (command_tx, command_rx) = mpsc::sync_channel(8);
        let mut app = AppState::from_sender_for_test(command_tx);
        engine_event(
            &mut app,
            Event::VideosListed(vec![VideoDescriptor {
                id: 7,
                filename: "nh48.mp4".to_owned(),
            }]),
        );

        let _ = app.update(Message::VideoSelected(7));

        assert_eq!(
            command_rx.recv().expect("select command"),
            Command::SelectVideo { video_id: 7 }
        );
        let session = app.video.as_ref().expect("video session");
        assert_eq!(session.filename, "nh48.mp4");
        assert_eq!(session.file_url, None);
        assert_eq!(session.frames, Loadable::Loading);

        engine_event(
            &mut app,
            Event::VideoFramesReady {
                video_id: 7,
                file_url: video_file(7),
                frames: frames(4),
            },
        );

        assert_eq!(app.animator.rendered(), Some(at(28.6, 77.2)));
        assert_eq!(app.animator.state(), AnimatorState::Snapped);
        assert_eq!(
            app.video.as_ref().and_then(|session| session.file_url.as_deref()),
            Some("http://localhost:8000/videos/7/file")
        );
    }

    #[test]
    fn failed_frame_fetch_keeps_player_open() {
        let (command_tx, _command_rx) = mpsc::sync_channel(8);
        let mut app = AppState::from_sender_for_test(command_tx);
        let _ = app.update(Message::VideoSelected(9));

        engine_event(
            &mut app,
            Event::Error(EngineErrorEvent {
                origin: CommandKind::SelectVideo { video_id: 9 },
                kind: EngineErrorKind::NotFound,
                message: "video not found: 9".to_owned(),
            }),
        );

        let session = app.video.as_ref().expect("player stays open");
        assert_eq!(
            session.frames,
            Loadable::Failed("video not found: 9".to_owned())
        );
        assert_eq!(app.animator.rendered(), None);
    }

    #[test]
    fn playback_tick_starts_marker_animation() {
        let (command_tx, _command_rx) = mpsc::sync_channel(8);
        let mut app = AppState::from_sender_for_test(command_tx);
        let _ = app.update(Message::VideoSelected(3));
        engine_event(
            &mut app,
            Event::VideoFramesReady {
                video_id: 3,
                file_url: video_file(3),
                frames: frames(3),
            },
        );
        let start = Instant::now();
        if let Some(session) = &mut app.video {
            session.clock.play(start);
        }

        let _ = app.update(Message::PlaybackTick(start + Duration::from_secs(4)));

        let handle = app.animator.active_handle().expect("marker animating");
        assert_eq!(app.animator.target(), Some(at(28.61, 77.2)));

        let _ = app.update(Message::AnimationFrame(
            handle,
            start + Duration::from_secs(5),
        ));
        assert_eq!(
            app.camera.marker(MarkerIcon::VideoPosition),
            Some(at(28.61, 77.2))
        );
    }

    #[test]
    fn closing_video_clears_marker() {
        let (command_tx, _command_rx) = mpsc::sync_channel(8);
        let mut app = AppState::from_sender_for_test(command_tx);
        let _ = app.update(Message::VideoSelected(3));
        engine_event(
            &mut app,
            Event::VideoFramesReady {
                video_id: 3,
                file_url: video_file(3),
                frames: frames(2),
            },
        );

        let _ = app.update(Message::VideoClosed);

        assert!(app.video.is_none());
        assert_eq!(app.animator.state(), AnimatorState::Idle);
        assert_eq!(app.camera.marker(MarkerIcon::VideoPosition), None);
    }

    #[test]
    fn frames_for_closed_video_are_ignored() {
        let (command_tx, _command_rx) = mpsc::sync_channel(8);
        let mut app = AppState::from_sender_for_test(command_tx);
        let _ = app.update(Message::VideoSelected(1));
        let _ = app.update(Message::VideoSelected(2));

        engine_event(
            &mut app,
            Event::VideoFramesReady {
                video_id: 1,
                file_url: video_file(1),
                frames: frames(2),
            },
        );

        let session = app.video.as_ref().expect("video session");
        assert_eq!(session.video_id, 2);
        assert_eq!(session.frames, Loadable::Loading);
    }

    #[test]
    fn roads_error_is_shown_in_roads_panel() {
        let (command_tx, _command_rx) = mpsc::sync_channel(8);
        let mut app = AppState::from_sender_for_test(command_tx);

        engine_event(
            &mut app,
            Event::Error(EngineErrorEvent {
                origin: CommandKind::LoadRoads { request_id: 0 },
                kind: EngineErrorKind::Network,
                message: "status 500".to_owned(),
            }),
        );

        assert_eq!(app.roads, Loadable::Failed("status 500".to_owned()));
        assert_eq!(app.videos, Loadable::Loading);
    }
}
