pub mod events;
pub mod health;
pub mod places;

pub use events::stream_events;
pub use health::{health_check, root};
pub use places::{place_details, search_places};
