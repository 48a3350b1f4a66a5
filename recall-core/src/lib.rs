pub mod clock;
pub mod errors;
pub mod filters;
pub mod models;
pub mod repo;
pub mod scheduler;
pub mod session;
pub mod stats;
pub mod store;
pub mod trainer;

pub use clock::*;
pub use errors::*;
pub use filters::*;
pub use models::*;
pub use repo::*;
pub use scheduler::*;
pub use session::*;
pub use stats::*;
pub use store::*;
pub use trainer::*;
