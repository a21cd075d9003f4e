pub mod analysis;
pub mod annotation;
pub mod capture;
pub mod catalog;
pub mod pipeline;
pub mod shared;
