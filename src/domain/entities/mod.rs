pub mod company;
pub mod filters;
pub mod notification;
pub mod sorting;
pub mod stats;
