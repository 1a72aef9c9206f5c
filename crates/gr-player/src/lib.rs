/// Pilote de lecture : session, boucle worker, conduit d'événements et
/// contrôleur côté interface.
pub mod controller;
pub mod driver;
pub mod event;
pub mod session;
pub mod sink;

#[cfg(test)]
mod mock;

pub use controller::{Player, PollUpdate};
pub use driver::run_session;
pub use event::{Outcome, PlaybackEvent, SessionState};
pub use session::{CancelToken, PlaybackSession, SessionConfig};
pub use sink::{ChannelSink, EventReceiver, EventSink};
