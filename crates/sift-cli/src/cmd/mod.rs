pub mod add;
pub mod completions;
pub mod init;
pub mod list;
pub mod merge;
pub mod remove;
pub mod show;
pub mod title;
pub mod toggle;
