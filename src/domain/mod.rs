//! Domain model: order status lifecycle, orders, users and the ports the
//! application layer depends on.

pub mod order;
pub mod ports;
pub mod status;
pub mod user;
