pub mod item;
pub mod text;

pub use item::{BillItem, ParsedLineItem};
pub use text::plausibility_score;
