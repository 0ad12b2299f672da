pub mod controller;
pub mod events;
pub mod monitor;

#[cfg(test)]
pub(crate) mod mocks;
