pub mod tokens;

pub use tokens::control_token;
