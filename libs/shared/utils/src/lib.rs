pub mod extractor;
pub mod json;
pub mod jwt;
pub mod state;
pub mod test_utils;

pub use json::AppJson;
pub use state::AppState;
