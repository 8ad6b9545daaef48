//! Mapping from lid motion to audio parameters
//!
//! The curves are fixed: each engine has one mapper built from a few
//! scalar [`Mapper`] curves.

mod creak;
mod fade;
mod linear;
mod logarithmic;
mod mapper;
mod params;
mod theremin;

pub use creak::CreakMapper;
pub use fade::{FadeMapper, FULL_VOLUME_MAX, SILENT_FROM};
pub use linear::LinearMapper;
pub use logarithmic::LogarithmicMapper;
pub use mapper::{Mapper, ParameterMapper};
pub use params::{
    AudioParameters, CreakParameters, Parameter, ThereminParameters, MAX_FREQUENCY, MAX_RATE,
    MIN_FREQUENCY, MIN_RATE,
};
pub use theremin::{ThereminMapper, DEFAULT_MAX_HZ, DEFAULT_MIN_HZ};
