pub mod errors;
pub mod db;
pub mod user;
pub mod user_credentials;
pub mod role;
pub mod user_role;
pub mod car;

#[cfg(test)]
mod tests;
