/// Scalar type for height-field calculations (f64 for precision)
pub type Scalar = f64;

/// Horizontal node coordinate
pub type Position = u32;
