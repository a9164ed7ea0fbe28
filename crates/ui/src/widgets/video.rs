use engine::{VideoDescriptor, VideoHost, VideoId, frame_index_at};
use iced::widget::{Column, button, column, container, row, slider, text};
use iced::{Element, Length};

use crate::app::{Loadable, VideoSession};
use crate::playback::clock_label;

/// Frame readout for the playback panel, `None` without coordinates.
pub fn frame_label(session: &VideoSession) -> Option<String> {
    let Loadable::Ready(frames) = &session.frames else {
        return None;
    };
    let index = frame_index_at(
        session.clock.current_time(),
        session.clock.duration(),
        frames.len(),
    )?;
    Some(format!("Frame {} / {}", index + 1, frames.len()))
}

fn player<'a, Message>(
    session: &'a VideoSession,
    on_close: Message,
    on_toggle: Message,
    on_scrub: fn(f64) -> Message,
) -> Element<'a, Message>
where
    Message: Clone + 'a,
{
    let coordinates = match &session.frames {
        Loadable::Loading => text("Loading coordinates...").size(12),
        Loadable::Ready(frames) => text(format!("{} geocoded frames", frames.len())).size(12),
        Loadable::Failed(message) => text(format!("Coordinates unavailable: {message}")).size(12),
    };

    let duration = session.clock.duration();
    let playing = session.clock.is_playing();
    let toggle = button(if playing { "Pause" } else { "Play" });
    let toggle = if duration > 0.0 {
        toggle.on_press(on_toggle)
    } else {
        toggle
    };

    column![
        row![
            text(&session.filename).size(14).width(Length::Fill),
            button("Close").on_press(on_close),
        ]
        .spacing(8),
        text(session.file_url.as_deref().unwrap_or_default()).size(11),
        coordinates,
        row![
            toggle,
            slider(0.0..=duration.max(0.0), session.clock.current_time(), on_scrub).step(0.1),
            text(format!(
                "{} / {}",
                clock_label(session.clock.current_time()),
                clock_label(duration)
            ))
            .size(12),
        ]
        .spacing(8),
        text(frame_label(session).unwrap_or_default()).size(12),
    ]
    .spacing(6)
    .into()
}

/// Renders the video list and, when a video is open, its playback panel.
pub fn view<'a, Message>(
    videos: &'a Loadable<Vec<VideoDescriptor>>,
    session: Option<&'a VideoSession>,
    on_select: fn(VideoId) -> Message,
    on_close: Message,
    on_toggle: Message,
    on_scrub: fn(f64) -> Message,
) -> Element<'a, Message>
where
    Message: Clone + 'a,
{
    let content: Element<'a, Message> = if let Some(session) = session {
        player(session, on_close, on_toggle, on_scrub)
    } else {
        match videos {
            Loadable::Loading => text("Loading videos...").into(),
            Loadable::Failed(message) => text(format!("Videos unavailable: {message}")).into(),
            Loadable::Ready(videos) if videos.is_empty() => text("No videos uploaded").into(),
            Loadable::Ready(videos) => {
                let mut list = Column::new().spacing(4).push(text("Videos").size(14));
                for video in videos {
                    list = list.push(
                        button(text(&video.filename).size(12))
                            .width(Length::Fill)
                            .on_press(on_select(video.id)),
                    );
                }
                list.into()
            }
        }
    };

    container(content).padding(8).width(Length::Fill).into()
}
