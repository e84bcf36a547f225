pub mod data_model;
pub mod events;
pub mod keyboard;
pub mod options;
pub mod pagination;
pub mod scheduler;
pub mod selection;
pub mod selectors;
pub mod sorting;
pub mod store;
pub mod virtualization;
