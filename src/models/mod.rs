pub mod contract_signatures;
pub mod contracts;
pub mod users;
