mod error;
mod manager;
mod template;

pub use error::PmError;
pub use manager::{PromptManager, README_TEMPLATE};
pub use template::PromptTemplate;
