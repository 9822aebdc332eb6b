use async_trait::async_trait;
use course_core::model::{PlayerEvent, PlayerState, VideoRef};
use dioxus::document::eval;
use serde::Deserialize;
use services::{SurfaceError, VideoSurface};

/// DOM id of the element the `YouTube` player replaces.
pub const PLAYER_ELEMENT_ID: &str = "player";

/// Messages posted by the bootstrap script through `dioxus.send`.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PlayerMessage {
    Ready,
    State { code: i32 },
    /// The iframe API script failed to load.
    Unavailable,
}

impl PlayerMessage {
    /// Unknown state codes are dropped.
    #[must_use]
    pub fn into_event(self) -> Option<PlayerEvent> {
        match self {
            Self::Ready => Some(PlayerEvent::Ready),
            Self::State { code } => PlayerState::from_code(code).map(PlayerEvent::StateChanged),
            Self::Unavailable => None,
        }
    }
}

/// Drives the player created by [`bootstrap_script`].
#[derive(Debug, Clone, Copy, Default)]
pub struct YoutubeSurface;

#[async_trait(?Send)]
impl VideoSurface for YoutubeSurface {
    async fn load(&mut self, video: &VideoRef) -> Result<(), SurfaceError> {
        match eval(&load_video_script(video)).join::<bool>().await {
            Ok(true) => Ok(()),
            Ok(false) => Err(SurfaceError::Unavailable("player is not mounted".into())),
            Err(err) => Err(SurfaceError::Unavailable(format!("{err:?}"))),
        }
    }
}

/// Resolves to `false` when the player object is missing.
pub(super) fn load_video_script(video: &VideoRef) -> String {
    format!(
        r#"
        const player = window.__elearnPlayer;
        if (!player || typeof player.loadVideoById !== "function") {{
            return false;
        }}
        player.loadVideoById({id:?});
        return true;
        "#,
        id = video.as_str(),
    )
}

/// Loads the iframe API once, creates an empty player and reports its
/// lifecycle back to Rust. The first video arrives through the surface once
/// `ready` has been sent.
pub(super) fn bootstrap_script() -> String {
    format!(
        r#"
        const send = (message) => dioxus.send(message);
        const create = () => {{
            window.__elearnPlayer = new YT.Player({element:?}, {{
                width: "100%",
                height: "100%",
                events: {{
                    onReady: () => send({{ kind: "ready" }}),
                    onStateChange: (event) => send({{ kind: "state", code: event.data }}),
                }},
            }});
        }};
        if (window.YT && window.YT.Player) {{
            create();
        }} else {{
            window.onYouTubeIframeAPIReady = create;
            const tag = document.createElement("script");
            tag.src = "https://www.youtube.com/iframe_api";
            tag.onerror = () => send({{ kind: "unavailable" }});
            document.body.appendChild(tag);
        }}
        await new Promise(() => {{}});
        "#,
        element = PLAYER_ELEMENT_ID,
    )
}
