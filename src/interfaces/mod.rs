//! Interface layer - outer boundaries

pub mod http;
