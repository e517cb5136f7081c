pub mod errors;
pub mod db;
pub mod agency;
pub mod agency_point;
pub mod user;
pub mod user_credentials;
pub mod travel;
pub mod client;
pub mod reservation;

#[cfg(test)]
mod tests;
