//! Scattering pipeline: species catalogs, occupancy tracking, placement validation and the
//! runner that ties them to a host scene.
pub mod events;
pub mod host;
pub mod occupancy;
pub mod plan;
pub mod runner;
pub mod selection;
pub mod species;
pub mod terrain;
pub mod validator;
