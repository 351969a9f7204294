// Lightningbeam Region Library
// Boolean operations on filled areas bounded by line, quadratic and cubic segments

pub mod tolerance;
pub mod config;
pub mod segment;
pub mod curve_intersection;
pub mod split;
pub mod component;
pub mod builder;
pub mod intersection_table;
pub mod classification;
pub mod cache;
pub mod loop_breaker;
pub mod solid;
pub mod region;
pub mod winding;

pub use builder::ComponentBuilder;
pub use cache::CacheStats;
pub use classification::{classify, Classification};
pub use component::{Component, ComponentId};
pub use config::RegionConfig;
pub use loop_breaker::break_loop;
pub use region::Region;
pub use segment::{BezierSegment, Segment};
pub use solid::Solid;
pub use split::{Split, SplitId};
pub use winding::WindingRule;
