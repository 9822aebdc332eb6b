mod course;
mod player;
mod state;

#[cfg(test)]
mod intent_smoke;
#[cfg(test)]
mod test_harness;
#[cfg(test)]
mod view_smoke;

pub use course::CourseView;
pub use player::{PLAYER_ELEMENT_ID, PlayerMessage, YoutubeSurface};
pub use state::ViewError;
