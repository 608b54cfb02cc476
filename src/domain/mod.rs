pub mod calendar;
pub mod grouping;
pub mod models;
pub mod reorder;
