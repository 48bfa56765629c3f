pub mod completion;
pub mod header;
pub mod prayers;
pub mod statusbar;
pub mod streak;
