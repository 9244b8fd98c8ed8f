pub mod clock;
pub mod data;

pub use clock::{FixedClock, SystemClock, WallClock};
pub use data::{
    ClockTime, Connectivity, IndicatorKind, IndicatorState, Measurement, MeasurementKind, Price,
    PriceKind, PriceLevel, RawEvent,
};
