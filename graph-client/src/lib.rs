pub mod api;
pub mod token_store;


pub use api::GraphApiClient;
pub use token_store::FileTokenStore;
