pub mod color;
pub mod config;
pub mod conflict;
pub mod dates;
pub mod grouping;
pub mod hash;
pub mod limits;
pub mod model;
pub mod naming;
pub mod observability;
pub mod planner;
