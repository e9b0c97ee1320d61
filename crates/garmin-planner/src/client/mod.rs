pub mod api;
pub mod session;
pub mod tokens;

pub use api::{GarminClient, WorkoutService};
pub use session::Session;
pub use tokens::SessionToken;
