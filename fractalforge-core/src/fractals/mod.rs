//! Built-in escape-time evaluators.
//!
//! The render engine never knows which formula it runs; each of these is
//! just one concrete [`FractalEvaluator`](crate::FractalEvaluator) wired up
//! through the [`registry`](crate::registry).

pub mod burning_ship;
pub mod julia;
pub mod mandelbrot;
pub mod multibrot;
pub mod tricorn;

pub use burning_ship::BurningShip;
pub use julia::Julia;
pub use mandelbrot::Mandelbrot;
pub use multibrot::Multibrot;
pub use tricorn::Tricorn;
