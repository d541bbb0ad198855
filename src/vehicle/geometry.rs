//! Fixed footprints of the car, in car-local coordinates.
//!
//! The local frame has its origin at the centre of the car, x pointing forwards
//! and y pointing to the car's right. One unit is one millimetre of the real car.

/// A closed ring of local-space points.
pub type LocalRing = &'static [(f64, f64)];

/// The outline of the car body.
pub const BODY: LocalRing = &[
    (-80.0, 45.0),
    (-80.0, 65.0),
    (-120.0, 0.0),
    (-80.0, -65.0),
    (-80.0, -45.0),
    (80.0, -45.0),
    (80.0, -65.0),
    (120.0, 0.0),
    (80.0, 65.0),
    (80.0, 45.0),
    (-80.0, 45.0),
];

/// The wheels: rear right, rear left, front left, front right.
pub const WHEELS: [LocalRing; 4] = [
    &[(-8.0, 50.0), (-8.0, 75.0), (-72.0, 75.0), (-72.0, 50.0), (-8.0, 50.0)],
    &[(-8.0, -50.0), (-8.0, -75.0), (-72.0, -75.0), (-72.0, -50.0), (-8.0, -50.0)],
    &[(8.0, -50.0), (8.0, -75.0), (72.0, -75.0), (72.0, -50.0), (8.0, -50.0)],
    &[(8.0, 50.0), (8.0, 75.0), (72.0, 75.0), (72.0, 50.0), (8.0, 50.0)],
];

/// The line tracking sensors, left to right in the driving direction.
pub const SENSORS: [LocalRing; 3] = [
    &[(95.0, -15.0), (100.0, -15.0), (100.0, -10.0), (95.0, -10.0), (95.0, -15.0)],
    &[(95.0, -2.5), (100.0, -2.5), (100.0, 2.5), (95.0, 2.5), (95.0, -2.5)],
    &[(95.0, 10.0), (100.0, 10.0), (100.0, 15.0), (95.0, 15.0), (95.0, 10.0)],
];

/// The area of a single sensor footprint at unit scale.
pub const SENSOR_AREA: f64 = 25.0;
