pub mod downloads;
pub mod dropbox;
pub mod health;
pub mod recipients;
pub mod stream;
pub mod transfers;
