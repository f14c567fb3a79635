pub mod assign;
pub mod get;
pub mod list;
pub mod unassign;
