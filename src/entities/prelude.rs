pub use super::portfolio_items::Entity as PortfolioItems;
pub use super::users::Entity as Users;
