mod model;
mod normalize;
mod table;

pub use model::{Speaker, Turn};
pub use normalize::{flow_from_intent, is_no_match_intent, normalize_text};
pub use table::TurnTable;
