pub mod cell;
pub mod data_model;
pub mod edit_session;
pub mod focus_ledger;
pub mod grid;
pub mod navigation;
pub mod selection;
pub mod source;
pub mod task;
