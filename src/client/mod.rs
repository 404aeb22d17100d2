//! Subscriber client
//!
//! Connects to a weather server and reads reports. Rendering is left to the
//! caller.

pub mod subscriber;

pub use subscriber::WeatherSubscriber;
