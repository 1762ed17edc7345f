pub mod clock;
pub mod gpio;
pub mod register;

#[cfg(any(test, feature = "sim"))]
pub mod sim;
