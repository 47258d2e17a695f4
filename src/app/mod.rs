// Application layer - Use case interactors

pub mod container;
pub mod plan_interactor;
pub mod session;

// Re-export interactors
pub use container::{AppContainer, DefaultAppContainer};
pub use plan_interactor::PlanInteractor;
pub use session::{JobSession, PipelinePorts};
