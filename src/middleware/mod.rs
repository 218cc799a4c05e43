pub mod auth;

pub use auth::{AuthLayerState, AuthUser, OptionalAuthUser};
