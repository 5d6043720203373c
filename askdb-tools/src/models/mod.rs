mod check_constraint;
mod column;
mod database;
mod foreign_key;
mod index;
mod table;

pub use check_constraint::*;
pub use column::*;
pub use database::*;
pub use foreign_key::*;
pub use index::*;
pub use table::*;
