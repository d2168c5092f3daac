pub mod browse;
pub mod constants;
pub mod item;
pub mod literal;
pub mod navigation;
pub mod parse;
pub mod presence;
pub mod record;
pub mod render;
pub mod resolver;
pub mod schema;
pub mod session;
pub mod table;

pub use item::{Entry, FieldValue, Item, Scalar};
pub use parse::{parse, parse_text};
pub use presence::{Presence, is_present};
pub use record::Record;
pub use resolver::{Row, resolve, resolve_column, resolve_or};
