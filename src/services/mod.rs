pub mod contact;
pub mod portfolio;

pub use contact::{ContactMessage, ContactService};
pub use portfolio::{CreatePortfolioItem, PortfolioService, UpdatePortfolioItem, UploadPayload};
