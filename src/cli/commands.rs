pub mod catalog;
pub mod forecast;
pub mod planning;
pub mod render;
pub mod serve;

pub use catalog::{catalog, metrics};
pub use forecast::forecast;
pub use planning::{insights, plan, scenarios};
pub use serve::serve;
