pub mod config;
pub mod events;
pub mod flow;
pub mod navigation;
pub mod pager;
pub mod registry;
pub mod shared;
