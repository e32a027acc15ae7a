//! Default values for command options and serde attributes.

/// Macro to generate default functions for serde attributes
macro_rules! default_fn {
    ($name:ident, $type:ty, $value:expr) => {
        pub fn $name() -> $type {
            $value
        }
    };
}

default_fn!(default_true, bool, true);
default_fn!(default_training_fraction, f64, 0.8);
default_fn!(default_random_seed, u64, 42);
default_fn!(default_max_history, usize, 5);
