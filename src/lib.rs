#![doc = include_str!("../README.md")]
#![cfg_attr(docrs, feature(doc_cfg))]

extern crate gnss_rs as gnss;

// private modules
mod bias;
mod cfg;
mod corrections;
mod ellipsoid;
mod geodetic;
mod position;
mod progress;
mod report;
mod solutions;
mod solver;

// pub export
pub use solver::Error;


// prelude
pub mod prelude {
    pub use crate::bias::{
        AtmosphericCorrection, AtmosphericModel, IonosphereModel, TroposphereModel,
    };
    pub use crate::cfg::{Config, ConversionOpts, RefinementOpts};
    pub use crate::ellipsoid::{Ellipsoid, SystemConstants, WGS84};
    pub use crate::geodetic::{decimal_degrees_to_dms, Converter, ErrorEllipsoid};
    pub use crate::position::{EcefPosition, GeodeticPosition};
    pub use crate::progress::{CancellationToken, ProgressEvent, ProgressSink, Quiet};
    pub use crate::report::Report;
    pub use crate::solutions::{
        ConvergenceStats, IterationSample, PositionEstimate, QualityMetrics,
    };
    pub use crate::solver::Solver;
    // re-export
    pub use gnss::prelude::Constellation;
    pub use hifitime::Epoch;
    pub use nalgebra::{Matrix3, Vector3};
}
