//! Domain types, value objects and the ports the application layer talks to.

pub mod cart;
pub mod checkout;
pub mod money;
pub mod order;
pub mod payment;
pub mod ports;
pub mod pricing;
