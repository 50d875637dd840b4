//! Identity token handling. Issuance of credentials is external; this module
//! only validates the tokens requests carry.

pub mod jwt;
