pub mod classifier;
pub mod directory;
pub mod etl;
pub mod extract;
pub mod overrides;
pub mod patterns;
pub mod pipeline;
pub mod reference;
pub mod schedule;

pub use crate::domain::model::{HallRecord, TransformResult};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
