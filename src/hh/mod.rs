pub mod client;
pub mod error;
pub mod types;

pub use client::{HhClient, VacancySource};
pub use error::HhError;
pub use types::VacancyItem;
