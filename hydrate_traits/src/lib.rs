pub mod clock;
pub mod http;
pub mod player;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use http::{Headers, HttpClient, HttpError, Response};
pub use player::{AnimationPlayer, LightMode};
