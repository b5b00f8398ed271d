pub mod estimate;
pub mod lenient;
pub mod preference;
pub mod trip;
