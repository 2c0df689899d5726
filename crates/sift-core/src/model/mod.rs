pub mod item;
pub mod item_id;

pub use item::{Item, ItemRecord, State};
pub use item_id::ItemId;
